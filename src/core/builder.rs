//! Engine builder for fluent configuration
//!
//! This module provides an EngineBuilder that wires a canvas, a frame clock,
//! the venue markers and a motion profile into a [`MapEngine`].

use crate::{
    animation::{
        animator::CameraAnimator,
        clock::{FrameClock, TokioFrameClock},
    },
    canvas::CanvasHandle,
    core::config::{EngineConfig, MotionProfile},
    data::venue::Venue,
    engine::MapEngine,
    layers::{
        declutter::DeclutterEngine,
        marker::{MarkerRecord, MarkerRegistry},
    },
    traits::{LogNavigator, Navigator},
    Result,
};
use std::sync::Arc;

/// Builder for creating and configuring MapEngine instances
pub struct EngineBuilder {
    canvas: CanvasHandle,
    /// Motion preset; resolved into the engine configuration on build
    profile: MotionProfile,
    /// Frame source for scripted animations
    clock: Option<Arc<dyn FrameClock>>,
    navigator: Option<Arc<dyn Navigator>>,
    markers: MarkerRegistry,
}

impl EngineBuilder {
    /// Create a new EngineBuilder with the standard motion profile
    pub fn new(canvas: CanvasHandle) -> Self {
        Self {
            canvas,
            profile: MotionProfile::default(),
            clock: None,
            navigator: None,
            markers: MarkerRegistry::new(),
        }
    }

    /// Set the motion profile
    pub fn with_profile(mut self, profile: MotionProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Set a complete custom configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.profile = MotionProfile::Custom(config);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn FrameClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Add a marker for every venue with a usable location
    pub fn with_venues(mut self, venues: &[Venue]) -> Self {
        for record in MarkerRegistry::from_venues(venues).iter() {
            self.markers.insert(record.clone());
        }
        self
    }

    pub fn with_marker(mut self, marker: MarkerRecord) -> Self {
        self.markers.insert(marker);
        self
    }

    /// Validate the configuration and build the engine
    pub fn build(self) -> Result<MapEngine> {
        let config = self.profile.resolve();
        config.validate()?;

        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(TokioFrameClock::new()));
        let navigator = self.navigator.unwrap_or_else(|| Arc::new(LogNavigator));

        log::debug!(
            "building engine with {} markers ({:?})",
            self.markers.len(),
            self.profile
        );

        let animator = Arc::new(CameraAnimator::new(
            self.canvas.clone(),
            clock,
            config.animation.clone(),
        ));
        let declutter = DeclutterEngine::new(self.markers, config.declutter.clone());

        MapEngine::from_parts(self.canvas, animator, declutter, config, navigator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::HeadlessCanvas;
    use crate::core::config::AnimationConfig;
    use crate::core::geo::LatLng;
    use crate::data::venue::load_venues;
    use crate::Error;

    #[test]
    fn test_builder_registers_located_venues() {
        let venues = load_venues(
            r#"{
                "stade-de-france": { "name": "Stade de France", "sports": ["Athletics"], "location": { "longitude": 2.3601, "latitude": 48.9244 } },
                "unknown": { "name": "Unknown", "sports": [] }
            }"#,
        )
        .unwrap();

        let engine = EngineBuilder::new(CanvasHandle::new(HeadlessCanvas::default()))
            .with_venues(&venues)
            .with_marker(MarkerRecord::new("extra", LatLng::new(43.3, 5.4)))
            .build()
            .unwrap();

        let markers = engine.markers().unwrap();
        assert_eq!(markers.len(), 2);
        assert!(engine.marker("stade-de-france").unwrap().is_some());
        assert!(engine.marker("unknown").unwrap().is_none());
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = EngineConfig {
            animation: AnimationConfig {
                duration_scale: -1.0,
                ..AnimationConfig::default()
            },
            ..EngineConfig::default()
        };
        let result = EngineBuilder::new(CanvasHandle::new(HeadlessCanvas::default()))
            .with_config(config)
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_reduced_profile_applies() {
        let engine = EngineBuilder::new(CanvasHandle::new(HeadlessCanvas::default()))
            .with_profile(MotionProfile::Reduced)
            .build()
            .unwrap();
        assert_eq!(engine.config().animation.rotation_rate, 0.0);
    }
}
