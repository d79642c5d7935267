//! Prelude module for common torchmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use torchmap::prelude::*;`

pub use crate::core::{
    bounds::{Edge, PaddedViewport, ViewportPadding},
    builder::EngineBuilder,
    camera::{CameraPose, CameraState, FreeCamera},
    config::{
        AnimationConfig, ConstraintConfig, DeclutterConfig, EngineConfig, MotionProfile,
        NavigationConfig,
    },
    geo::{LatLng, LatLngBounds, Point},
    viewport::ViewportConstraints,
};

pub use crate::animation::{
    animator::{
        AnimationOutcome, AnimationPlan, CameraAnimator, Framing, PathCamera, PathPlan,
        SessionGuard, SessionPolicy, TransitionPlan,
    },
    cancel::CancellationToken,
    clock::{FrameClock, SteppedClock, TokioFrameClock},
    path::PathTrack,
};

pub use crate::canvas::{
    CanvasHandle, FlyOptions, HeadlessCanvas, LineGradient, LineStyle, MapCanvas, MoveKind,
};

pub use crate::data::{
    geojson::{parse_track, GeoJson},
    source::{FileTrackSource, StaticTrackSource, TrackSource},
    venue::{load_venues, load_venues_file, Venue},
};

#[cfg(feature = "http")]
pub use crate::data::source::HttpTrackSource;

pub use crate::engine::{FlightOutcome, FlightTier, MapEngine};

pub use crate::input::{
    events::{EventKind, MapEvent},
    wait::{EventWaiter, WaitOutcome},
};

pub use crate::intro::{
    CaptionScheduler, CaptionSink, IntroLocation, IntroOutcome, IntroScript, IntroSequencer,
    IntroStage, LogCaptionSink,
};

pub use crate::layers::{
    declutter::DeclutterEngine,
    marker::{MarkerRecord, MarkerRegistry, MarkerUpdate, Placement},
};

pub use crate::runtime::{spawn, AsyncHandle, TaskHandle};

pub use crate::traits::{LogNavigator, Navigator};

pub use crate::{Error as MapError, Result};

pub use std::{sync::Arc, time::Duration};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet, FxHasher};
