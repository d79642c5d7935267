use crate::core::bounds::Edge;
use crate::core::geo::LatLng;
use crate::data::venue::Venue;
use crate::prelude::HashMap;
use serde::{Deserialize, Serialize};

/// Where a marker is drawn relative to its true coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// At the venue itself
    Exact,
    /// Clamped onto a padded-viewport edge
    Edge(Edge),
}

/// One venue marker and its current declutter state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerRecord {
    pub id: String,
    pub name: String,
    pub sports: Vec<String>,
    /// True ground coordinate of the venue
    pub coordinate: LatLng,
    /// Where the marker is currently drawn
    pub position: LatLng,
    pub visible: bool,
    /// Screen angle of the arrow in degrees counter-clockwise from east; 0 when not clamped
    pub direction_hint: f64,
    pub placement: Placement,
    /// Frozen while a marker-triggered flight is in progress
    pub pinned: bool,
}

impl MarkerRecord {
    pub fn new(id: impl Into<String>, coordinate: LatLng) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            sports: Vec::new(),
            coordinate,
            position: coordinate,
            visible: true,
            direction_hint: 0.0,
            placement: Placement::Exact,
            pinned: false,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_sports(mut self, sports: Vec<String>) -> Self {
        self.sports = sports;
        self
    }

    /// Link target opened after flying to this marker
    pub fn route(&self) -> String {
        format!("/venue/{}", self.id)
    }

    pub(crate) fn to_update(&self, fade_ms: u64) -> MarkerUpdate {
        MarkerUpdate {
            id: self.id.clone(),
            position: self.position,
            visible: self.visible,
            direction_hint: self.direction_hint,
            placement: self.placement,
            fade_ms,
        }
    }
}

/// Change pushed to the canvas for one marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerUpdate {
    pub id: String,
    pub position: LatLng,
    pub visible: bool,
    pub direction_hint: f64,
    pub placement: Placement,
    /// Opacity transition length
    pub fade_ms: u64,
}

/// Insertion-ordered set of markers with lookup by id
#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    markers: Vec<MarkerRecord>,
    index: HashMap<String, usize>,
}

impl MarkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one marker per venue. Venues without a usable location are skipped.
    pub fn from_venues<'a>(venues: impl IntoIterator<Item = &'a Venue>) -> Self {
        let mut registry = Self::new();
        for venue in venues {
            match venue.coordinate() {
                Some(coordinate) => {
                    let record = MarkerRecord::new(venue.slug.clone(), coordinate)
                        .with_name(venue.name.clone())
                        .with_sports(venue.sports.clone());
                    registry.insert(record);
                }
                None => log::debug!("skipping venue '{}' without a valid location", venue.slug),
            }
        }
        registry
    }

    /// Adds a marker, replacing any marker with the same id
    pub fn insert(&mut self, record: MarkerRecord) {
        match self.index.get(&record.id) {
            Some(&slot) => self.markers[slot] = record,
            None => {
                self.index.insert(record.id.clone(), self.markers.len());
                self.markers.push(record);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&MarkerRecord> {
        self.index.get(id).map(|&slot| &self.markers[slot])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut MarkerRecord> {
        match self.index.get(id) {
            Some(&slot) => Some(&mut self.markers[slot]),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkerRecord> {
        self.markers.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut MarkerRecord> {
        self.markers.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
