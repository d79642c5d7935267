use crate::core::geo::LatLng;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

/// Venue record as found in the reference dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub name: String,
    /// Slugs of the sports held at the venue
    #[serde(default)]
    pub sports: Vec<String>,
    #[serde(default)]
    pub location: Option<VenueLocation>,
}

/// Coordinates that are missing or not numbers read as `None`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VenueLocation {
    #[serde(default, deserialize_with = "lenient_degrees")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_degrees")]
    pub latitude: Option<f64>,
}

fn lenient_degrees<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_f64))
}

impl Venue {
    /// Ground coordinate, when the record has a complete and valid location
    pub fn coordinate(&self) -> Option<LatLng> {
        let location = self.location?;
        let coordinate = LatLng::new(location.latitude?, location.longitude?);
        coordinate.is_valid().then_some(coordinate)
    }
}

/// Reads venues from either an object keyed by slug or an array of records,
/// in source order. Keyed records without a slug take their key. Records
/// that cannot be read are logged and skipped.
pub fn load_venues(json: &str) -> Result<Vec<Venue>> {
    let records: Vec<(Option<String>, Value)> = match serde_json::from_str(json)? {
        Value::Object(map) => map.into_iter().map(|(key, record)| (Some(key), record)).collect(),
        Value::Array(list) => list.into_iter().map(|record| (None, record)).collect(),
        _ => {
            return Err(Error::Serialization(serde::de::Error::custom(
                "venue dataset must be an object or an array",
            )))
        }
    };

    let mut venues = Vec::with_capacity(records.len());
    for (index, (key, record)) in records.into_iter().enumerate() {
        match serde_json::from_value::<Venue>(record) {
            Ok(mut venue) => {
                if let (true, Some(key)) = (venue.slug.is_empty(), key) {
                    venue.slug = key;
                }
                venues.push(venue);
            }
            Err(err) => {
                log::warn!(
                    "skipping venue record {}: {}",
                    key.unwrap_or_else(|| format!("#{}", index)),
                    err
                );
            }
        }
    }
    Ok(venues)
}

pub fn load_venues_file(path: impl AsRef<Path>) -> Result<Vec<Venue>> {
    let json = std::fs::read_to_string(path)?;
    load_venues(&json)
}
