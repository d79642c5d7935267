//! Named geographic tracks followed by path animations.

use crate::core::geo::LatLng;
use crate::{Error, Result};
use geo::{HaversineDistance, HaversineIntermediate};

/// Ordered, immutable sequence of vertices describing a route
#[derive(Debug, Clone, PartialEq)]
pub struct PathTrack {
    name: String,
    vertices: Vec<LatLng>,
    /// Great-circle distance from the first vertex to each vertex, in metres
    cumulative: Vec<f64>,
}

impl PathTrack {
    pub fn new(name: impl Into<String>, vertices: Vec<LatLng>) -> Result<Self> {
        let name = name.into();
        if vertices.len() < 2 {
            return Err(Error::InvalidTrack(format!(
                "track '{}' needs at least two vertices, got {}",
                name,
                vertices.len()
            )));
        }
        if let Some(bad) = vertices.iter().find(|v| !v.is_valid()) {
            return Err(Error::InvalidTrack(format!(
                "track '{}' has an invalid vertex {:?}",
                name, bad
            )));
        }

        let mut cumulative = Vec::with_capacity(vertices.len());
        let mut travelled = 0.0;
        cumulative.push(travelled);
        for pair in vertices.windows(2) {
            travelled += pair[0].to_point().haversine_distance(&pair[1].to_point());
            cumulative.push(travelled);
        }

        Ok(Self {
            name,
            vertices,
            cumulative,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[LatLng] {
        &self.vertices
    }

    pub fn first(&self) -> LatLng {
        self.vertices[0]
    }

    pub fn last(&self) -> LatLng {
        self.vertices[self.vertices.len() - 1]
    }

    /// Total great-circle length in metres
    pub fn length(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Point `distance` metres along the track. Distances outside the track
    /// snap to its endpoints.
    pub fn point_at_distance(&self, distance: f64) -> LatLng {
        if !(distance > 0.0) {
            return self.first();
        }
        if distance >= self.length() {
            return self.last();
        }

        // first vertex strictly beyond `distance`; always >= 1 here
        let end = self.cumulative.partition_point(|d| *d <= distance);
        let start = end - 1;
        let segment = self.cumulative[end] - self.cumulative[start];
        if segment <= 0.0 {
            return self.vertices[start];
        }

        let fraction = (distance - self.cumulative[start]) / segment;
        self.vertices[start]
            .to_point()
            .haversine_intermediate(&self.vertices[end].to_point(), fraction)
            .into()
    }

    /// Point at `fraction` of the track's length
    pub fn distance_along(&self, fraction: f64) -> LatLng {
        self.point_at_distance(self.length() * fraction)
    }
}

/// Initial great-circle bearing from `from` to `to`, in degrees within [-180, 180]
pub fn bearing_between(from: &LatLng, to: &LatLng) -> f64 {
    from.bearing_to(to)
}

/// Normalizes an angle into (-180, 180]
pub fn normalize_angle(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}
