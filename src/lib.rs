//! # Torchmap
//!
//! Camera choreography and marker decluttering for an interactive Olympic
//! venue map.
//!
//! The engine drives any canvas implementing [`canvas::MapCanvas`]: it plays
//! a scripted torch-relay intro, keeps off-screen venue markers pinned to the
//! viewport edges, and flies to venues when their markers are clicked.

pub mod animation;
pub mod canvas;
pub mod core;
pub mod data;
pub mod engine;
pub mod input;
pub mod intro;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod traits;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    builder::EngineBuilder,
    camera::{CameraPose, CameraState},
    config::{EngineConfig, MotionProfile},
    geo::{LatLng, LatLngBounds, Point},
    viewport::ViewportConstraints,
};

pub use animation::{
    animator::{AnimationPlan, CameraAnimator, SessionPolicy},
    cancel::CancellationToken,
    path::PathTrack,
};

pub use canvas::{CanvasHandle, HeadlessCanvas, MapCanvas};

pub use engine::{FlightOutcome, FlightTier, MapEngine};

pub use input::events::{EventKind, MapEvent};

pub use intro::{IntroOutcome, IntroScript, IntroSequencer};

pub use layers::{declutter::DeclutterEngine, marker::MarkerRecord};

pub use traits::Navigator;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "http")]
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to load asset '{name}': {reason}")]
    AssetLoad { name: String, reason: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Camera is busy with another animation")]
    Busy,

    #[error("Canvas error: {0}")]
    Canvas(String),

    #[error("Invalid track: {0}")]
    InvalidTrack(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown marker: {0}")]
    UnknownMarker(String),
}

/// Error type alias for convenience
pub type MapError = Error;
