//! The map canvas capability set the engine drives, and a shared handle to it.

pub mod headless;

use crate::animation::path::PathTrack;
use crate::core::camera::{CameraState, FreeCamera};
use crate::core::geo::{LatLngBounds, Point};
use crate::input::events::{EventKind, EventSender, ListenerId};
use crate::layers::marker::MarkerUpdate;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

pub use headless::HeadlessCanvas;

/// How a canvas-native camera move travels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MoveKind {
    /// Zooms out and back in along the way
    Fly { curve: f64 },
    /// Short, direct move for small adjustments
    Ease,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlyOptions {
    pub duration_ms: u64,
    pub kind: MoveKind,
    /// Run even when the user prefers reduced motion
    pub essential: bool,
}

impl FlyOptions {
    pub fn fly(duration_ms: u64, curve: f64) -> Self {
        Self {
            duration_ms,
            kind: MoveKind::Fly { curve },
            essential: true,
        }
    }

    pub fn ease(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            kind: MoveKind::Ease,
            essential: false,
        }
    }
}

/// Paint of a drawable track line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    pub opacity: f64,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: "red".to_string(),
            width: 4.0,
            opacity: 1.0,
        }
    }
}

/// Step gradient along a line: `revealed` up to `progress`, `hidden` after it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineGradient {
    pub progress: f64,
    pub revealed: String,
    pub hidden: String,
}

impl LineGradient {
    pub fn cutoff(progress: f64, style: &LineStyle) -> Self {
        Self {
            progress: progress.clamp(0.0, 1.0),
            revealed: style.color.clone(),
            hidden: "rgba(0, 0, 0, 0)".to_string(),
        }
    }
}

/// Everything the engine needs from the hosting map canvas
pub trait MapCanvas: Send {
    fn camera(&self) -> CameraState;

    /// Moves the camera instantly
    fn jump_to(&mut self, camera: &CameraState);

    fn set_pitch(&mut self, pitch: f64);

    fn set_free_camera(&mut self, camera: &FreeCamera);

    /// Starts a canvas-native animated move; completion is signalled by a
    /// [`crate::input::events::MapEvent::MoveEnd`] event
    fn fly_to(&mut self, camera: &CameraState, options: &FlyOptions);

    /// Bounds currently visible
    fn bounds(&self) -> LatLngBounds;

    fn set_zoom_range(&mut self, min: Option<f64>, max: Option<f64>);

    fn set_max_bounds(&mut self, bounds: Option<LatLngBounds>);

    fn set_rotation_enabled(&mut self, enabled: bool);

    fn add_source(&mut self, id: &str, track: &PathTrack) -> Result<()>;

    fn remove_source(&mut self, id: &str);

    fn add_line_layer(&mut self, id: &str, source_id: &str, style: &LineStyle) -> Result<()>;

    fn remove_layer(&mut self, id: &str);

    fn set_line_gradient(&mut self, layer_id: &str, gradient: &LineGradient);

    fn update_marker(&mut self, update: &MarkerUpdate);

    /// Ids of rendered features under a screen point
    fn features_at(&self, position: Point) -> Vec<String>;

    fn subscribe(&mut self, kind: EventKind, sender: EventSender) -> ListenerId;

    fn unsubscribe(&mut self, listener: ListenerId);
}

/// Cheaply clonable, shared access to one canvas
#[derive(Clone)]
pub struct CanvasHandle {
    inner: Arc<Mutex<Box<dyn MapCanvas>>>,
}

impl CanvasHandle {
    pub fn new(canvas: impl MapCanvas + 'static) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(canvas))),
        }
    }

    /// Runs `f` with exclusive access to the canvas. Never hold this across an await.
    pub fn with<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn MapCanvas) -> R,
    {
        let mut canvas = self
            .inner
            .lock()
            .map_err(|_| Error::Canvas("canvas lock poisoned".to_string()))?;
        Ok(f(canvas.as_mut()))
    }

    pub fn camera(&self) -> Result<CameraState> {
        self.with(|canvas| canvas.camera())
    }

    pub fn bounds(&self) -> Result<LatLngBounds> {
        self.with(|canvas| canvas.bounds())
    }
}

impl std::fmt::Debug for CanvasHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasHandle").finish_non_exhaustive()
    }
}
