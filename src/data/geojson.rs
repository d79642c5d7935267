//! Minimal GeoJSON reading for track assets.

use crate::animation::path::PathTrack;
use crate::core::geo::LatLng;
use crate::prelude::HashMap;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// GeoJSON geometry types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: [f64; 2],
    },
    LineString {
        coordinates: Vec<[f64; 2]>,
    },
    Polygon {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPoint {
        coordinates: Vec<[f64; 2]>,
    },
    MultiLineString {
        coordinates: Vec<Vec<[f64; 2]>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<[f64; 2]>>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonGeometry>,
    },
}

impl GeoJsonGeometry {
    /// Vertices of the first line found in this geometry, in order.
    /// A multi-line is joined end to end.
    pub fn line_vertices(&self) -> Option<Vec<LatLng>> {
        match self {
            GeoJsonGeometry::LineString { coordinates } => {
                Some(coordinates.iter().copied().map(LatLng::from_lng_lat).collect())
            }
            GeoJsonGeometry::MultiLineString { coordinates } => Some(
                coordinates
                    .iter()
                    .flatten()
                    .copied()
                    .map(LatLng::from_lng_lat)
                    .collect(),
            ),
            GeoJsonGeometry::GeometryCollection { geometries } => {
                geometries.iter().find_map(|g| g.line_vertices())
            }
            _ => None,
        }
    }
}

/// GeoJSON feature with geometry and properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoJsonFeature {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: Option<HashMap<String, serde_json::Value>>,
}

/// Root GeoJSON object
#[derive(Debug, Clone, PartialEq)]
pub enum GeoJson {
    Feature(GeoJsonFeature),
    FeatureCollection(Vec<GeoJsonFeature>),
    Geometry(GeoJsonGeometry),
}

#[derive(Deserialize)]
struct FeatureCollection {
    features: Vec<GeoJsonFeature>,
}

impl GeoJson {
    pub fn from_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .map(str::to_string);

        match kind.as_deref() {
            Some("Feature") => Ok(GeoJson::Feature(serde_json::from_value(value)?)),
            Some("FeatureCollection") => {
                let collection: FeatureCollection = serde_json::from_value(value)?;
                Ok(GeoJson::FeatureCollection(collection.features))
            }
            _ => Ok(GeoJson::Geometry(serde_json::from_value(value)?)),
        }
    }

    /// Vertices of the first line geometry in the document
    pub fn first_line(&self) -> Option<Vec<LatLng>> {
        match self {
            GeoJson::Feature(feature) => feature.geometry.as_ref()?.line_vertices(),
            GeoJson::FeatureCollection(features) => features
                .iter()
                .filter_map(|f| f.geometry.as_ref())
                .find_map(|g| g.line_vertices()),
            GeoJson::Geometry(geometry) => geometry.line_vertices(),
        }
    }
}

/// Parses a GeoJSON document into a named track
pub fn parse_track(name: &str, json: &str) -> Result<PathTrack> {
    let document = GeoJson::from_str(json)?;
    let vertices = document.first_line().ok_or_else(|| {
        Error::InvalidTrack(format!("track '{}' contains no line geometry", name))
    })?;
    PathTrack::new(name, vertices)
}
