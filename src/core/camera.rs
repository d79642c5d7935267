//! Camera state types and the oblique-view ground correction.

use crate::animation::interpolation::lerp;
use crate::core::constants::{
    DEGREES_PER_RADIAN, GROUND_SMOOTHING, METRES_PER_DEGREE_LAT, METRES_PER_DEGREE_LNG,
};
use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// Highest pitch the ground correction accepts; at 90° the camera looks at the horizon.
const MAX_CORRECTED_PITCH: f64 = 89.5;

/// Center/zoom representation of the camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub center: LatLng,
    pub zoom: f64,
    pub pitch: f64,
    pub bearing: f64,
    /// Set when the camera was last placed as a free camera
    pub altitude: Option<f64>,
}

impl CameraState {
    pub fn new(center: LatLng, zoom: f64, pitch: f64, bearing: f64) -> Self {
        Self {
            center,
            zoom,
            pitch,
            bearing,
            altitude: None,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }
}

impl Default for CameraState {
    fn default() -> Self {
        Self::new(LatLng::default(), 0.0, 0.0, 0.0)
    }
}

/// Free camera: a ground position plus altitude, pitch and bearing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FreeCamera {
    pub position: LatLng,
    pub altitude: f64,
    pub pitch: f64,
    pub bearing: f64,
}

/// Elevation, bearing and pitch of one end of a fixed transition.
///
/// `elevation` is a zoom level or an altitude in metres depending on the
/// transition's framing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub elevation: f64,
    pub bearing: f64,
    pub pitch: f64,
}

impl CameraPose {
    pub fn new(elevation: f64, bearing: f64, pitch: f64) -> Self {
        Self {
            elevation,
            bearing,
            pitch,
        }
    }
}

/// Ground position a camera must sit on so that `target` stays framed when
/// looking down at `pitch` degrees along `bearing` from `altitude` metres.
///
/// Uses fixed metres-per-degree factors, so it is only accurate around
/// mid-latitudes (roughly 40-50°). It is not a geodesic projection.
pub fn compute_ground_position(pitch: f64, bearing: f64, target: LatLng, altitude: f64) -> LatLng {
    let pitch = pitch.clamp(0.0, MAX_CORRECTED_PITCH);
    let bearing_rad = bearing / DEGREES_PER_RADIAN;
    let pitch_rad = (90.0 - pitch) / DEGREES_PER_RADIAN;

    let ground_offset = altitude / pitch_rad.tan();
    let lng_diff = ground_offset * (-bearing_rad).sin() / METRES_PER_DEGREE_LNG;
    let lat_diff = ground_offset * (-bearing_rad).cos() / METRES_PER_DEGREE_LAT;

    LatLng::new(target.lat - lat_diff, target.lng + lng_diff)
}

/// Remembers the last corrected ground position of one animation run so that
/// consecutive frames can be smoothed against it.
#[derive(Debug, Clone, Default)]
pub struct GroundTracker {
    previous: Option<LatLng>,
    smoothing: f64,
}

impl GroundTracker {
    pub fn new() -> Self {
        Self::with_smoothing(GROUND_SMOOTHING)
    }

    pub fn with_smoothing(smoothing: f64) -> Self {
        Self {
            previous: None,
            smoothing: smoothing.clamp(0.0, 1.0),
        }
    }

    /// Corrected ground position; with `smooth` it is pulled toward the
    /// previous result by the smoothing factor.
    pub fn locate(
        &mut self,
        pitch: f64,
        bearing: f64,
        target: LatLng,
        altitude: f64,
        smooth: bool,
    ) -> LatLng {
        let mut position = compute_ground_position(pitch, bearing, target, altitude);

        if smooth {
            if let Some(previous) = self.previous {
                position.lng = lerp(position.lng, previous.lng, self.smoothing);
                position.lat = lerp(position.lat, previous.lat, self.smoothing);
            }
        }

        self.previous = Some(position);
        position
    }

    pub fn previous(&self) -> Option<LatLng> {
        self.previous
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}
