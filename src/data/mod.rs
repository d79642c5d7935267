pub mod geojson;
pub mod source;
pub mod venue;

pub use geojson::{parse_track, GeoJson, GeoJsonFeature, GeoJsonGeometry};
#[cfg(feature = "http")]
pub use source::HttpTrackSource;
pub use source::{FileTrackSource, StaticTrackSource, TrackSource};
pub use venue::{load_venues, load_venues_file, Venue, VenueLocation};
