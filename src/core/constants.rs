//! Engine-wide constants observed on the venue map and intro.
//! Keeping them in a single place makes it easier to tweak magic numbers;
//! most of them seed the defaults in [`crate::core::config`].

/// Degrees per radian as used by the ground-position correction (≈ 180/π).
pub const DEGREES_PER_RADIAN: f64 = 57.29;

/// Approximate metres per degree of longitude near 40-50°N.
pub const METRES_PER_DEGREE_LNG: f64 = 70_000.0;

/// Approximate metres per degree of latitude.
pub const METRES_PER_DEGREE_LAT: f64 = 110_000.0;

/// Blend toward the previous ground position when smoothing free-camera moves.
pub const GROUND_SMOOTHING: f64 = 0.97;

/// Blend factor between the previous frame and the new path sample.
pub const PATH_SMOOTHING: f64 = 0.15;

/// Bearing rotation over a whole path animation, in degrees.
pub const PATH_ROTATION_RATE: f64 = 250.0;

/// Markers are edge-clamped at or below this zoom and hidden above it.
pub const DECLUTTER_ZOOM_THRESHOLD: f64 = 11.0;

/// Zoom domain mapped onto the pitch range.
pub const PITCH_ZOOM_DOMAIN: (f64, f64) = (10.0, 16.0);

/// Pitch range, in degrees.
pub const PITCH_RANGE: (f64, f64) = (0.0, 60.0);

/// Half-size of the pan box kept around a focal region, in degrees.
pub const LOCK_RADIUS_DEGREES: f64 = 1.0;

/// Camera pose used when landing on a venue.
pub const VENUE_ZOOM: f64 = 15.5;
pub const VENUE_PITCH: f64 = 55.0;

/// Zoom used for countries on the globe.
pub const COUNTRY_ZOOM: f64 = 3.5;

/// Nominal duration of one rendering frame, in milliseconds.
pub const FRAME_INTERVAL_MS: u64 = 16;
