//! In-memory [`MapCanvas`] with no rendering.
//!
//! Records everything the engine does to it so the app can log a run and tests
//! can assert on it. Clones share the same state.

use super::{FlyOptions, LineGradient, LineStyle, MapCanvas};
use crate::animation::path::PathTrack;
use crate::core::camera::{CameraState, FreeCamera};
use crate::core::geo::{LatLng, LatLngBounds, Point};
use crate::input::events::{EventKind, EventSender, ListenerId, MapEvent};
use crate::layers::marker::MarkerUpdate;
use crate::prelude::HashMap;
use crate::{Error, Result};
use std::sync::{Arc, Mutex, MutexGuard};

/// Degrees of longitude visible at zoom 0 on a ~1000 px wide canvas
const LNG_EXTENT_AT_ZOOM_ZERO: f64 = 360.0;
const LAT_EXTENT_AT_ZOOM_ZERO: f64 = 180.0;

#[derive(Debug, Clone, PartialEq)]
pub struct LineLayer {
    pub id: String,
    pub source_id: String,
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlyRequest {
    pub target: CameraState,
    pub options: FlyOptions,
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessState {
    pub camera: CameraState,
    /// Fixed visible bounds; derived from center and zoom when unset
    pub bounds_override: Option<LatLngBounds>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub max_bounds: Option<LatLngBounds>,
    pub rotation_enabled: bool,
    pub sources: HashMap<String, PathTrack>,
    pub layers: Vec<LineLayer>,
    pub gradients: HashMap<String, LineGradient>,
    pub markers: HashMap<String, MarkerUpdate>,
    /// Every camera applied through `jump_to` or `set_free_camera`
    pub frames: Vec<CameraState>,
    pub free_cameras: Vec<FreeCamera>,
    pub fly_requests: Vec<FlyRequest>,
    /// Clickable features as (id, center, radius in px)
    pub features: Vec<(String, Point, f64)>,
    /// When false, `fly_to` never reports move-end, like a host that drops the event
    pub emit_move_end: bool,
    listeners: Vec<(ListenerId, EventKind, EventSender)>,
    next_listener: u64,
}

impl HeadlessState {
    fn derived_bounds(&self) -> LatLngBounds {
        let scale = 2_f64.powf(self.camera.zoom);
        let half_lng = LNG_EXTENT_AT_ZOOM_ZERO / scale / 2.0;
        let half_lat = LAT_EXTENT_AT_ZOOM_ZERO / scale / 2.0;
        let center = self.camera.center;
        LatLngBounds::from_coords(
            center.lat - half_lat,
            center.lng - half_lng,
            center.lat + half_lat,
            center.lng + half_lng,
        )
    }

    fn constrain(&self, mut camera: CameraState) -> CameraState {
        if let Some(min) = self.min_zoom {
            camera.zoom = camera.zoom.max(min);
        }
        if let Some(max) = self.max_zoom {
            camera.zoom = camera.zoom.min(max);
        }
        if let Some(bounds) = self.max_bounds {
            camera.center = LatLng::new(
                camera.center.lat.clamp(bounds.south(), bounds.north()),
                camera.center.lng.clamp(bounds.west(), bounds.east()),
            );
        }
        camera
    }

    fn emit(&mut self, event: MapEvent) {
        let kind = event.kind();
        // drop listeners whose receiver went away
        self.listeners.retain(|(_, listener_kind, sender)| {
            if *listener_kind != kind {
                return !sender.is_closed();
            }
            sender.unbounded_send(event.clone()).is_ok()
        });
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[derive(Debug, Clone)]
pub struct HeadlessCanvas {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessCanvas {
    pub fn new(camera: CameraState) -> Self {
        let state = HeadlessState {
            camera,
            rotation_enabled: true,
            emit_move_end: true,
            ..HeadlessState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn with_bounds(self, bounds: LatLngBounds) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.bounds_override = Some(bounds);
        }
        self
    }

    pub fn without_move_end(self) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.emit_move_end = false;
        }
        self
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Copy of the recorded state
    pub fn snapshot(&self) -> HeadlessState {
        self.lock().clone()
    }

    pub fn add_feature(&self, id: impl Into<String>, center: Point, radius: f64) {
        self.lock().features.push((id.into(), center, radius));
    }

    /// Simulates a user zoom gesture step
    pub fn simulate_zoom(&self, zoom: f64) {
        let mut state = self.lock();
        let mut camera = state.camera;
        camera.zoom = zoom;
        state.camera = state.constrain(camera);
        let zoom = state.camera.zoom;
        state.emit(MapEvent::Zoom { zoom });
    }

    /// Simulates the end of a user gesture
    pub fn simulate_move_end(&self) {
        let mut state = self.lock();
        let center = state.camera.center;
        let zoom = state.camera.zoom;
        state.emit(MapEvent::ZoomEnd { zoom });
        state.emit(MapEvent::MoveEnd { center, zoom });
    }

    pub fn simulate_click(&self, position: Point) {
        self.lock().emit(MapEvent::Click { position });
    }
}

impl Default for HeadlessCanvas {
    fn default() -> Self {
        Self::new(CameraState::default())
    }
}

impl MapCanvas for HeadlessCanvas {
    fn camera(&self) -> CameraState {
        self.lock().camera
    }

    fn jump_to(&mut self, camera: &CameraState) {
        let mut state = self.lock();
        let camera = state.constrain(*camera);
        state.camera = camera;
        state.frames.push(camera);
    }

    fn set_pitch(&mut self, pitch: f64) {
        self.lock().camera.pitch = pitch;
    }

    fn set_free_camera(&mut self, camera: &FreeCamera) {
        let mut state = self.lock();
        state.camera = CameraState::new(
            camera.position,
            state.camera.zoom,
            camera.pitch,
            camera.bearing,
        )
        .with_altitude(camera.altitude);
        let applied = state.camera;
        state.frames.push(applied);
        state.free_cameras.push(*camera);
    }

    fn fly_to(&mut self, camera: &CameraState, options: &FlyOptions) {
        let mut state = self.lock();
        state.fly_requests.push(FlyRequest {
            target: *camera,
            options: *options,
        });

        let start = state.camera.center;
        state.emit(MapEvent::MoveStart { center: start });

        let camera = state.constrain(*camera);
        state.camera = camera;
        state.emit(MapEvent::Zoom { zoom: camera.zoom });

        if state.emit_move_end {
            state.emit(MapEvent::ZoomEnd { zoom: camera.zoom });
            state.emit(MapEvent::MoveEnd {
                center: camera.center,
                zoom: camera.zoom,
            });
        }
    }

    fn bounds(&self) -> LatLngBounds {
        let state = self.lock();
        state
            .bounds_override
            .unwrap_or_else(|| state.derived_bounds())
    }

    fn set_zoom_range(&mut self, min: Option<f64>, max: Option<f64>) {
        let mut state = self.lock();
        state.min_zoom = min;
        state.max_zoom = max;
    }

    fn set_max_bounds(&mut self, bounds: Option<LatLngBounds>) {
        self.lock().max_bounds = bounds;
    }

    fn set_rotation_enabled(&mut self, enabled: bool) {
        self.lock().rotation_enabled = enabled;
    }

    fn add_source(&mut self, id: &str, track: &PathTrack) -> Result<()> {
        let mut state = self.lock();
        if state.sources.contains_key(id) {
            return Err(Error::Canvas(format!("source '{}' already exists", id)));
        }
        state.sources.insert(id.to_string(), track.clone());
        Ok(())
    }

    fn remove_source(&mut self, id: &str) {
        self.lock().sources.remove(id);
    }

    fn add_line_layer(&mut self, id: &str, source_id: &str, style: &LineStyle) -> Result<()> {
        let mut state = self.lock();
        if !state.sources.contains_key(source_id) {
            return Err(Error::Canvas(format!(
                "layer '{}' references missing source '{}'",
                id, source_id
            )));
        }
        if state.layers.iter().any(|layer| layer.id == id) {
            return Err(Error::Canvas(format!("layer '{}' already exists", id)));
        }
        state.layers.push(LineLayer {
            id: id.to_string(),
            source_id: source_id.to_string(),
            style: style.clone(),
        });
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) {
        let mut state = self.lock();
        state.layers.retain(|layer| layer.id != id);
        state.gradients.remove(id);
    }

    fn set_line_gradient(&mut self, layer_id: &str, gradient: &LineGradient) {
        self.lock()
            .gradients
            .insert(layer_id.to_string(), gradient.clone());
    }

    fn update_marker(&mut self, update: &MarkerUpdate) {
        self.lock().markers.insert(update.id.clone(), update.clone());
    }

    fn features_at(&self, position: Point) -> Vec<String> {
        self.lock()
            .features
            .iter()
            .filter(|(_, center, radius)| center.distance_to(&position) <= *radius)
            .map(|(id, _, _)| id.clone())
            .collect()
    }

    fn subscribe(&mut self, kind: EventKind, sender: EventSender) -> ListenerId {
        let mut state = self.lock();
        state.next_listener += 1;
        let id = ListenerId(state.next_listener);
        state.listeners.push((id, kind, sender));
        id
    }

    fn unsubscribe(&mut self, listener: ListenerId) {
        self.lock().listeners.retain(|(id, _, _)| *id != listener);
    }
}
