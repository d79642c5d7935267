//! Configuration system for camera choreography and marker decluttering
//!
//! This module provides a preset layer ([`MotionProfile`]) on top of plain,
//! serde-loadable configuration sections. Values that differed between
//! historical variants of the map (rotation rate, padding, asymmetric edges)
//! live here instead of being forked into separate code paths.

use crate::core::bounds::ViewportPadding;
use crate::core::constants::*;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum MotionProfile {
    Standard,
    /// Short camera moves and no scripted rotation
    Reduced,
    Custom(EngineConfig),
}

impl MotionProfile {
    pub fn resolve(&self) -> EngineConfig {
        match self {
            Self::Standard => EngineConfig::default(),
            Self::Reduced => EngineConfig {
                animation: AnimationConfig {
                    rotation_rate: 0.0,
                    duration_scale: 0.25,
                    ..AnimationConfig::default()
                },
                navigation: NavigationConfig {
                    long_flight_ms: 1_000,
                    short_flight_ms: 500,
                    ease_ms: 250,
                    settle_delay_ms: 300,
                    ..NavigationConfig::default()
                },
                declutter: DeclutterConfig {
                    fade_ms: 0,
                    ..DeclutterConfig::default()
                },
                ..EngineConfig::default()
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self::Standard
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub animation: AnimationConfig,
    pub declutter: DeclutterConfig,
    pub constraints: ConstraintConfig,
    pub navigation: NavigationConfig,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        self.animation.validate()?;
        self.declutter.validate()?;
        self.constraints.validate()?;
        self.navigation.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Degrees the bearing turns over one full path animation
    pub rotation_rate: f64,
    /// Blend between the previous frame and the new path sample
    pub path_smoothing: f64,
    /// Blend toward the previous free-camera ground position
    pub ground_smoothing: f64,
    /// Multiplies every scripted duration
    pub duration_scale: f64,
    /// A frame that takes longer than this ends the animation at its final state
    pub frame_stall_timeout_ms: u64,
    /// Extra wall-clock time granted past an animation's duration
    pub wall_clock_grace_ms: u64,
}

impl AnimationConfig {
    pub fn frame_stall_timeout(&self) -> Duration {
        Duration::from_millis(self.frame_stall_timeout_ms)
    }

    pub fn wall_clock_grace(&self) -> Duration {
        Duration::from_millis(self.wall_clock_grace_ms)
    }

    pub fn scaled(&self, duration_ms: f64) -> f64 {
        duration_ms * self.duration_scale
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.path_smoothing) || !(0.0..=1.0).contains(&self.ground_smoothing)
        {
            return Err(Error::InvalidConfig(
                "smoothing factors must lie in [0, 1]".to_string(),
            ));
        }
        if !(self.duration_scale > 0.0 && self.duration_scale.is_finite()) {
            return Err(Error::InvalidConfig(
                "duration_scale must be positive and finite".to_string(),
            ));
        }
        if self.frame_stall_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "frame_stall_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            rotation_rate: PATH_ROTATION_RATE,
            path_smoothing: PATH_SMOOTHING,
            ground_smoothing: GROUND_SMOOTHING,
            duration_scale: 1.0,
            frame_stall_timeout_ms: 1_000,
            wall_clock_grace_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeclutterConfig {
    /// Markers are edge-clamped at or below this zoom and hidden above it
    pub zoom_threshold: f64,
    pub padding: ViewportPadding,
    /// Triple the direction bearing for markers across the equator from the
    /// view center. Dataset tuning for the southern overseas territories.
    pub hemisphere_correction: bool,
    pub fade_ms: u64,
}

impl DeclutterConfig {
    fn validate(&self) -> Result<()> {
        if !self.padding.is_valid() {
            return Err(Error::InvalidConfig(format!(
                "invalid viewport padding {:?}",
                self.padding
            )));
        }
        Ok(())
    }
}

impl Default for DeclutterConfig {
    fn default() -> Self {
        Self {
            zoom_threshold: DECLUTTER_ZOOM_THRESHOLD,
            padding: ViewportPadding::default(),
            hemisphere_correction: true,
            fade_ms: 300,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub lock_radius: f64,
    /// Zoom domain mapped linearly onto `pitch_range`
    pub pitch_zoom_domain: (f64, f64),
    pub pitch_range: (f64, f64),
}

impl ConstraintConfig {
    fn validate(&self) -> Result<()> {
        let (z0, z1) = self.pitch_zoom_domain;
        let (p0, p1) = self.pitch_range;
        if !(z1 > z0) || !(p1 >= p0) {
            return Err(Error::InvalidConfig(
                "pitch mapping needs an increasing zoom domain and pitch range".to_string(),
            ));
        }
        if self.min_zoom > self.max_zoom || !(self.lock_radius > 0.0) {
            return Err(Error::InvalidConfig(
                "lock needs min_zoom <= max_zoom and a positive radius".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            min_zoom: PITCH_ZOOM_DOMAIN.0,
            max_zoom: PITCH_ZOOM_DOMAIN.1,
            lock_radius: LOCK_RADIUS_DEGREES,
            pitch_zoom_domain: PITCH_ZOOM_DOMAIN,
            pitch_range: PITCH_RANGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub venue_zoom: f64,
    pub venue_pitch: f64,
    /// Beyond this many degrees the flight unlocks bounds first
    pub far_distance: f64,
    /// Beyond this many degrees a short flight is used instead of an ease
    pub near_distance: f64,
    pub long_flight_ms: u64,
    pub short_flight_ms: u64,
    pub ease_ms: u64,
    /// Delay between the camera settling and markers being re-evaluated
    pub settle_delay_ms: u64,
    /// Upper bound on waiting for a move-end event
    pub move_end_timeout_ms: u64,
    /// Hide markers while a marker-triggered flight is in progress
    pub hide_markers_in_flight: bool,
    pub country_zoom: f64,
    pub country_flight_ms: u64,
}

impl NavigationConfig {
    pub fn move_end_timeout(&self, flight_ms: u64) -> Duration {
        Duration::from_millis(flight_ms.saturating_add(self.move_end_timeout_ms))
    }

    fn validate(&self) -> Result<()> {
        if self.near_distance > self.far_distance {
            return Err(Error::InvalidConfig(
                "near_distance must not exceed far_distance".to_string(),
            ));
        }
        let durations = [
            ("long_flight_ms", self.long_flight_ms),
            ("short_flight_ms", self.short_flight_ms),
            ("ease_ms", self.ease_ms),
            ("country_flight_ms", self.country_flight_ms),
            ("move_end_timeout_ms", self.move_end_timeout_ms),
        ];
        if let Some((name, _)) = durations.iter().find(|(_, ms)| *ms == 0) {
            return Err(Error::InvalidConfig(format!("{} must be positive", name)));
        }
        Ok(())
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            venue_zoom: VENUE_ZOOM,
            venue_pitch: VENUE_PITCH,
            far_distance: 1.0,
            near_distance: 0.02,
            long_flight_ms: 4_000,
            short_flight_ms: 1_500,
            ease_ms: 500,
            settle_delay_ms: 1_500,
            move_end_timeout_ms: 2_000,
            hide_markers_in_flight: true,
            country_zoom: COUNTRY_ZOOM,
            country_flight_ms: 1_500,
        }
    }
}
