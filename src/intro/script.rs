//! Intro locations and the stage list the sequencer plays.

use crate::animation::animator::PathCamera;
use crate::core::camera::{CameraPose, CameraState};
use crate::core::geo::LatLng;

/// Named camera pose the intro visits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntroLocation {
    pub name: &'static str,
    pub center: LatLng,
    pub zoom: f64,
    pub bearing: f64,
    pub pitch: f64,
}

impl IntroLocation {
    const fn new(name: &'static str, lng: f64, lat: f64, zoom: f64, bearing: f64, pitch: f64) -> Self {
        Self {
            name,
            center: LatLng::new(lat, lng),
            zoom,
            bearing,
            pitch,
        }
    }

    pub fn camera(&self) -> CameraState {
        CameraState::new(self.center, self.zoom, self.pitch, self.bearing)
    }

    /// Pose with the zoom as elevation
    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.zoom, self.bearing, self.pitch)
    }
}

pub const START: IntroLocation = IntroLocation::new("", 5.0, 43.0, 2.0, 440.0, 0.0);
pub const OLYMPIA: IntroLocation = IntroLocation::new("Olympia", 21.62536, 37.64471, 7.0, 340.0, 50.0);
pub const MARSEILLE: IntroLocation =
    IntroLocation::new("Marseille", 5.36455, 43.29527, 7.0, 340.0, 50.0);
pub const BASTIA: IntroLocation = IntroLocation::new("Bastia", 9.450881, 42.697285, 7.0, 320.0, 30.0);
pub const PERPIGNAN: IntroLocation =
    IntroLocation::new("Perpignan", 2.90064, 42.68751, 7.0, 340.0, 50.0);
pub const GUIANA: IntroLocation =
    IntroLocation::new("French Guiana", -52.326, 4.9372, 5.0, 320.0, 30.0);
pub const CALEDONIA: IntroLocation =
    IntroLocation::new("New Caledonia", 166.457993, -22.275801, 5.0, 340.0, 30.0);
pub const REUNION: IntroLocation =
    IntroLocation::new("La Réunion", 55.448101, -20.878901, 5.0, 340.0, 30.0);
pub const POLYNESIA: IntroLocation =
    IntroLocation::new("French Polynesia", -149.569595, -17.535, 5.0, 340.0, 30.0);
pub const GUADELOUPE: IntroLocation =
    IntroLocation::new("Guadeloupe", -61.580002, 16.27, 5.0, 340.0, 30.0);
pub const MARTINIQUE: IntroLocation =
    IntroLocation::new("Martinique", -61.083302, 14.6, 5.0, 340.0, 30.0);
pub const NICE: IntroLocation = IntroLocation::new("Nice", 7.26189, 43.71021, 7.0, 340.0, 50.0);
pub const PARIS: IntroLocation = IntroLocation::new("Paris", 2.294694, 48.858093, 15.5, 0.0, 55.0);

/// Fixed view used while following a track
pub const PATH_ZOOM: f64 = 7.0;
pub const PATH_PITCH: f64 = 50.0;

pub const OVERSEAS: [IntroLocation; 6] = [GUIANA, CALEDONIA, REUNION, POLYNESIA, GUADELOUPE, MARTINIQUE];

/// One step of the intro
#[derive(Debug, Clone, PartialEq)]
pub enum IntroStage {
    /// Place the camera instantly
    Jump(IntroLocation),
    /// Centered transition from the current camera to the location
    FlyTo {
        location: IntroLocation,
        duration_ms: f64,
    },
    /// Free-camera transition looking at the location; elevations are altitudes
    Orbit {
        location: IntroLocation,
        from: CameraPose,
        to: CameraPose,
        duration_ms: f64,
    },
    FollowPath {
        track: String,
        duration_ms: f64,
        zoom: f64,
        pitch: f64,
        /// Defaults to the camera's bearing when the stage starts
        start_bearing: Option<f64>,
        /// Defaults to the configured rotation rate
        rotation_rate: Option<f64>,
        camera: PathCamera,
    },
    /// Shown without blocking; hidden after `display_ms`
    Caption { text: String, display_ms: f64 },
    Pause { duration_ms: f64 },
}

impl IntroStage {
    pub fn fly_to(location: IntroLocation, duration_ms: f64) -> Self {
        IntroStage::FlyTo {
            location,
            duration_ms,
        }
    }

    pub fn follow(track: impl Into<String>, duration_ms: f64) -> Self {
        IntroStage::FollowPath {
            track: track.into(),
            duration_ms,
            zoom: PATH_ZOOM,
            pitch: PATH_PITCH,
            start_bearing: None,
            rotation_rate: None,
            camera: PathCamera::Centered,
        }
    }

    /// Overrides the rotation rate of a path stage; other stages are unchanged
    pub fn with_rotation_rate(mut self, rate: f64) -> Self {
        if let IntroStage::FollowPath { rotation_rate, .. } = &mut self {
            *rotation_rate = Some(rate);
        }
        self
    }

    pub fn caption(text: impl Into<String>, display_ms: f64) -> Self {
        IntroStage::Caption {
            text: text.into(),
            display_ms,
        }
    }

    /// Short label for logs
    pub fn label(&self) -> String {
        match self {
            IntroStage::Jump(location) => format!("jump to '{}'", location.name),
            IntroStage::FlyTo { location, .. } => format!("fly to '{}'", location.name),
            IntroStage::Orbit { location, .. } => format!("orbit '{}'", location.name),
            IntroStage::FollowPath { track, .. } => format!("follow '{}'", track),
            IntroStage::Caption { text, .. } => format!("caption '{}'", text),
            IntroStage::Pause { duration_ms } => format!("pause {} ms", duration_ms),
        }
    }
}

/// Ordered stages plus the region the map settles on afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct IntroScript {
    pub stages: Vec<IntroStage>,
    pub destination: IntroLocation,
}

impl IntroScript {
    pub fn new(destination: IntroLocation) -> Self {
        Self {
            stages: Vec::new(),
            destination,
        }
    }

    pub fn stage(mut self, stage: IntroStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Track names in first-use order, without duplicates
    pub fn required_tracks(&self) -> Vec<String> {
        let mut tracks: Vec<String> = Vec::new();
        for stage in &self.stages {
            if let IntroStage::FollowPath { track, .. } = stage {
                if !tracks.contains(track) {
                    tracks.push(track.clone());
                }
            }
        }
        tracks
    }

    /// The torch relay: from Olympia across the Mediterranean, around the
    /// overseas territories and up to Paris
    pub fn olympic_torch_relay() -> Self {
        let mut script = Self::new(PARIS)
            .stage(IntroStage::Jump(START))
            .stage(IntroStage::caption("Olympia", 3_000.0))
            .stage(IntroStage::fly_to(OLYMPIA, 4_000.0))
            .stage(IntroStage::Orbit {
                location: OLYMPIA,
                from: CameraPose::new(40_000.0, OLYMPIA.bearing, OLYMPIA.pitch),
                to: CameraPose::new(15_000.0, OLYMPIA.bearing - 60.0, OLYMPIA.pitch),
                duration_ms: 3_000.0,
            })
            .stage(IntroStage::follow("greek-line", 8_000.0).with_rotation_rate(100.0))
            .stage(IntroStage::caption("Marseille", 3_000.0))
            .stage(IntroStage::fly_to(MARSEILLE, 3_000.0))
            .stage(IntroStage::follow("french-line-1", 12_000.0))
            .stage(IntroStage::caption("Bastia", 2_500.0))
            .stage(IntroStage::fly_to(BASTIA, 3_000.0))
            .stage(IntroStage::Pause {
                duration_ms: 1_000.0,
            })
            .stage(IntroStage::caption("Perpignan", 2_500.0))
            .stage(IntroStage::fly_to(PERPIGNAN, 3_000.0))
            .stage(IntroStage::follow("french-line-2", 10_000.0));

        for territory in OVERSEAS {
            script = script
                .stage(IntroStage::caption(territory.name, 2_000.0))
                .stage(IntroStage::fly_to(territory, 2_500.0));
        }

        script
            .stage(IntroStage::caption("Nice", 2_500.0))
            .stage(IntroStage::fly_to(NICE, 3_000.0))
            .stage(IntroStage::follow("french-line-3", 10_000.0))
            .stage(IntroStage::caption("Paris", 3_000.0))
            .stage(IntroStage::fly_to(PARIS, 5_000.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locations_are_lng_lat_ordered() {
        assert_eq!(OLYMPIA.center, LatLng::new(37.64471, 21.62536));
        assert_eq!(PARIS.camera().zoom, 15.5);
        assert!(OVERSEAS.iter().all(|l| l.center.is_valid()));
    }

    #[test]
    fn test_default_script_tracks() {
        let script = IntroScript::olympic_torch_relay();
        assert_eq!(
            script.required_tracks(),
            vec!["greek-line", "french-line-1", "french-line-2", "french-line-3"]
        );
        assert_eq!(script.stages[0], IntroStage::Jump(START));
        assert_eq!(script.destination, PARIS);
    }

    #[test]
    fn test_greek_line_turns_slower() {
        let script = IntroScript::olympic_torch_relay();
        let greek = script
            .stages
            .iter()
            .find(|stage| matches!(stage, IntroStage::FollowPath { track, .. } if track == "greek-line"));
        assert!(matches!(
            greek,
            Some(IntroStage::FollowPath { rotation_rate: Some(rate), zoom, .. }) if *rate == 100.0 && *zoom == PATH_ZOOM
        ));

        let caption = IntroStage::caption("Nice", 1.0).with_rotation_rate(100.0);
        assert_eq!(caption, IntroStage::caption("Nice", 1.0));
    }
}
