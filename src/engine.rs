//! The map engine: marker decluttering, venue navigation and the intro,
//! wired to one canvas.

use crate::animation::animator::{CameraAnimator, SessionGuard, SessionPolicy};
use crate::animation::cancel::CancellationToken;
use crate::canvas::{CanvasHandle, FlyOptions};
use crate::core::camera::CameraState;
use crate::core::config::EngineConfig;
use crate::core::geo::{LatLng, Point};
use crate::core::viewport::ViewportConstraints;
use crate::data::source::TrackSource;
use crate::input::events::{EventKind, MapEvent};
use crate::input::wait::{EventWaiter, WaitOutcome};
use crate::intro::captions::CaptionSink;
use crate::intro::script::IntroScript;
use crate::intro::sequencer::{IntroOutcome, IntroSequencer};
use crate::layers::declutter::DeclutterEngine;
use crate::layers::marker::{MarkerRecord, MarkerUpdate};
use crate::runtime::{self, AsyncHandle, TaskHandle};
use crate::traits::Navigator;
use crate::{Error, Result};
use futures::channel::mpsc::unbounded;
use futures::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// How a camera flight requested through the engine ended
#[derive(Debug, Clone, PartialEq)]
pub enum FlightOutcome {
    /// The camera reached the target; carries the route navigated to, if any
    Arrived(Option<String>),
    /// The camera was already close enough to the target
    Skipped,
    /// Stopped by the caller or by a newer flight
    Cancelled,
}

/// Distance tier of a venue flight, chosen per axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightTier {
    /// Unlocks the viewport and flies with a wide zoom-out arc
    Far,
    Near,
    /// Small adjustment, eased
    Local,
}

pub struct MapEngine {
    canvas: CanvasHandle,
    animator: Arc<CameraAnimator>,
    declutter: Mutex<DeclutterEngine>,
    constraints: ViewportConstraints,
    config: EngineConfig,
    navigator: Arc<dyn Navigator>,
    last_zoom: Mutex<f64>,
}

impl MapEngine {
    pub(crate) fn from_parts(
        canvas: CanvasHandle,
        animator: Arc<CameraAnimator>,
        declutter: DeclutterEngine,
        config: EngineConfig,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let zoom = canvas.camera()?.zoom;
        let engine = Self {
            canvas,
            animator,
            declutter: Mutex::new(declutter),
            constraints: ViewportConstraints::new(config.constraints.clone()),
            config,
            navigator,
            last_zoom: Mutex::new(zoom),
        };
        engine.place_markers()?;
        Ok(engine)
    }

    /// Initial placement for the camera at build time; every marker is pushed
    fn place_markers(&self) -> Result<()> {
        let (bounds, camera) = self.canvas.with(|c| (c.bounds(), c.camera()))?;
        let updates = {
            let mut declutter = self.declutter()?;
            let viewport = declutter.padded(&bounds).with_center(camera.center);
            declutter.place_all(&viewport, camera.zoom)
        };
        self.push_updates(&updates)
    }

    pub fn canvas(&self) -> &CanvasHandle {
        &self.canvas
    }

    pub fn animator(&self) -> &Arc<CameraAnimator> {
        &self.animator
    }

    pub fn constraints(&self) -> &ViewportConstraints {
        &self.constraints
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn declutter(&self) -> Result<MutexGuard<'_, DeclutterEngine>> {
        self.declutter
            .lock()
            .map_err(|_| Error::Canvas("marker state lock poisoned".to_string()))
    }

    fn push_updates(&self, updates: &[MarkerUpdate]) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }
        log::trace!("pushing {} marker updates", updates.len());
        self.canvas.with(|c| {
            for update in updates {
                c.update_marker(update);
            }
        })
    }

    /// Current state of every marker
    pub fn markers(&self) -> Result<Vec<MarkerRecord>> {
        Ok(self.declutter()?.snapshot())
    }

    pub fn marker(&self, id: &str) -> Result<Option<MarkerRecord>> {
        Ok(self.declutter()?.get(id).cloned())
    }

    /// Re-places markers for the current camera; returns how many changed
    pub fn evaluate_markers(&self) -> Result<usize> {
        let previous = self.last_zoom()?;
        self.evaluate_from(previous)
    }

    fn last_zoom(&self) -> Result<f64> {
        self.last_zoom
            .lock()
            .map(|zoom| *zoom)
            .map_err(|_| Error::Canvas("zoom state lock poisoned".to_string()))
    }

    fn evaluate_from(&self, previous_zoom: f64) -> Result<usize> {
        let (bounds, camera) = self.canvas.with(|c| (c.bounds(), c.camera()))?;
        let updates = {
            let mut declutter = self.declutter()?;
            let viewport = declutter.padded(&bounds).with_center(camera.center);
            declutter.evaluate(&viewport, camera.zoom, previous_zoom)
        };
        if let Ok(mut zoom) = self.last_zoom.lock() {
            *zoom = camera.zoom;
        }
        self.push_updates(&updates)?;
        Ok(updates.len())
    }

    pub fn pin_marker(&self, id: &str) -> Result<()> {
        self.declutter()?.pin(id)
    }

    pub fn unpin_marker(&self, id: &str) -> Result<()> {
        self.declutter()?.unpin(id)
    }

    /// Hides and freezes every marker, e.g. while another section is shown
    pub fn suspend_markers(&self) -> Result<()> {
        let updates = self.declutter()?.suspend();
        self.push_updates(&updates)
    }

    /// Shows markers again and re-places them for the current camera
    pub fn resume_markers(&self) -> Result<()> {
        let updates = self.declutter()?.resume();
        self.push_updates(&updates)?;
        self.evaluate_markers()?;
        Ok(())
    }

    /// Reacts to one canvas event. Clicks go through [`MapEngine::handle_click`].
    pub fn handle_event(&self, event: &MapEvent) -> Result<()> {
        match event {
            MapEvent::Zoom { zoom } => {
                // scripted moves own the pitch while they run
                if !self.animator.is_busy() {
                    self.constraints.apply_zoom(&self.canvas, *zoom)?;
                }
            }
            MapEvent::ZoomEnd { .. } | MapEvent::MoveEnd { .. } => {
                self.evaluate_markers()?;
            }
            MapEvent::MoveStart { .. } | MapEvent::Click { .. } => {}
        }
        Ok(())
    }

    /// Flies to the first marker under `position`, if any
    pub async fn handle_click(
        &self,
        position: Point,
        cancel: &CancellationToken,
    ) -> Result<Option<FlightOutcome>> {
        let hits = self.canvas.with(|c| c.features_at(position))?;
        let marker = {
            let declutter = self.declutter()?;
            hits.into_iter()
                .find(|id| declutter.registry().contains(id))
        };
        match marker {
            Some(id) => {
                log::debug!("click at {:?} hit marker '{}'", position, id);
                self.fly_to_venue(&id, cancel).await.map(Some)
            }
            None => Ok(None),
        }
    }

    /// Dispatches canvas events until `cancel` fires.
    ///
    /// Clicks run on their own task so zoom and move events keep flowing while
    /// a venue flight is in progress.
    pub async fn pump_events(self: Arc<Self>, cancel: CancellationToken) -> Result<()> {
        let (sender, mut receiver) = unbounded();
        let kinds = [
            EventKind::Zoom,
            EventKind::ZoomEnd,
            EventKind::MoveEnd,
            EventKind::Click,
        ];
        let listeners = self.canvas.with(|c| {
            kinds
                .iter()
                .map(|kind| c.subscribe(*kind, sender.clone()))
                .collect::<Vec<_>>()
        })?;
        drop(sender);
        log::debug!("event pump started with {} listeners", listeners.len());

        let mut flights: Vec<TaskHandle> = Vec::new();
        loop {
            let event = tokio::select! {
                event = receiver.next() => event,
                _ = cancel.cancelled() => break,
            };
            let Some(event) = event else {
                log::debug!("canvas closed the event stream");
                break;
            };

            if let MapEvent::Click { position } = event {
                flights.retain(|flight| !flight.is_finished());
                let engine = self.clone();
                let cancel = cancel.clone();
                flights.push(runtime::spawn(async move {
                    if let Err(e) = engine.handle_click(position, &cancel).await {
                        log::warn!("click handling failed: {}", e);
                    }
                }));
                continue;
            }

            if let Err(e) = self.handle_event(&event) {
                log::warn!("failed to handle {:?}: {}", event.kind(), e);
            }
        }

        let removed = self.canvas.with(|c| {
            for listener in listeners {
                c.unsubscribe(listener);
            }
        });
        log::debug!("event pump stopped");
        removed
    }

    /// Picks the flight tier from the larger per-axis distance in degrees
    pub fn flight_tier(&self, from: &LatLng, to: &LatLng) -> FlightTier {
        let navigation = &self.config.navigation;
        let dlng = (to.lng - from.lng).abs();
        let dlat = (to.lat - from.lat).abs();
        if dlng > navigation.far_distance || dlat > navigation.far_distance {
            FlightTier::Far
        } else if dlng > navigation.near_distance || dlat > navigation.near_distance {
            FlightTier::Near
        } else {
            FlightTier::Local
        }
    }

    fn flight_options(&self, tier: FlightTier) -> FlyOptions {
        let navigation = &self.config.navigation;
        match tier {
            FlightTier::Far => FlyOptions::fly(navigation.long_flight_ms, 2.0),
            FlightTier::Near => FlyOptions::fly(navigation.short_flight_ms, 1.0),
            FlightTier::Local => FlyOptions::ease(navigation.ease_ms),
        }
    }

    /// Flies to a venue marker, then navigates to its route.
    ///
    /// Markers are frozen for the flight and re-placed once the camera has
    /// settled. A newer flight supersedes this one.
    pub async fn fly_to_venue(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<FlightOutcome> {
        let marker = self
            .marker(id)?
            .ok_or_else(|| Error::UnknownMarker(id.to_string()))?;
        let navigation = self.config.navigation.clone();

        let session = self.animator.begin_session(SessionPolicy::Supersede)?;
        let hidden = self.declutter()?.pin_all(navigation.hide_markers_in_flight);
        self.push_updates(&hidden)?;

        let current = self.canvas.camera()?;
        let tier = self.flight_tier(&current.center, &marker.coordinate);
        let options = self.flight_options(tier);
        let target = CameraState::new(
            marker.coordinate,
            navigation.venue_zoom,
            navigation.venue_pitch,
            0.0,
        );
        log::info!(
            "flying to venue '{}' ({:?}, {} ms)",
            marker.id,
            tier,
            options.duration_ms
        );

        if tier == FlightTier::Far {
            self.constraints.unlock(&self.canvas)?;
        }

        let outcome = self
            .fly_and_wait(&session, &target, &options, cancel)
            .await?;
        if outcome == WaitOutcome::Cancelled {
            return self.abandon_flight(&session);
        }

        if tier == FlightTier::Far {
            self.constraints
                .lock_around(&self.canvas, marker.coordinate, None)?;
        }

        let settle = Duration::from_millis(navigation.settle_delay_ms);
        if !self.sleep_in_session(&session, settle, cancel).await {
            return self.abandon_flight(&session);
        }

        self.declutter()?.unpin_all();
        let zoom = self.canvas.camera()?.zoom;
        self.evaluate_from(zoom)?;

        let route = marker.route();
        self.navigator.navigate_to(&route);
        Ok(FlightOutcome::Arrived(Some(route)))
    }

    /// Flies the globe to a country unless the camera is already there
    pub async fn fly_to_country(
        &self,
        coordinate: LatLng,
        cancel: &CancellationToken,
    ) -> Result<FlightOutcome> {
        let navigation = self.config.navigation.clone();
        let current = self.canvas.camera()?;
        let close = (coordinate.lng - current.center.lng).abs() < 1.0
            && (coordinate.lat - current.center.lat).abs() < 1.0
            && (navigation.country_zoom - current.zoom).abs() < 0.5;
        if close {
            log::debug!("already showing {:?}, skipping flight", coordinate);
            return Ok(FlightOutcome::Skipped);
        }

        let session = self.animator.begin_session(SessionPolicy::Supersede)?;
        let target = CameraState::new(
            coordinate,
            navigation.country_zoom,
            current.pitch,
            current.bearing,
        );
        let options = FlyOptions::fly(navigation.country_flight_ms, 1.0);
        match self.fly_and_wait(&session, &target, &options, cancel).await? {
            WaitOutcome::Cancelled => Ok(FlightOutcome::Cancelled),
            _ => Ok(FlightOutcome::Arrived(None)),
        }
    }

    /// Starts a canvas flight and waits, bounded, for it to report move-end
    async fn fly_and_wait(
        &self,
        session: &SessionGuard,
        target: &CameraState,
        options: &FlyOptions,
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome> {
        // subscribe first; the canvas may finish synchronously
        let waiter = EventWaiter::subscribe(&self.canvas, EventKind::MoveEnd)?;
        self.canvas.with(|c| c.fly_to(target, options))?;

        let timeout = self.config.navigation.move_end_timeout(options.duration_ms);
        let outcome = tokio::select! {
            outcome = waiter.wait(timeout, cancel) => outcome,
            _ = session.token().cancelled() => WaitOutcome::Cancelled,
        };
        match &outcome {
            WaitOutcome::TimedOut => {
                log::warn!("move-end not reported within {:?}, continuing", timeout)
            }
            WaitOutcome::Closed => log::warn!("canvas dropped the move-end listener"),
            _ => {}
        }
        Ok(outcome)
    }

    async fn sleep_in_session(
        &self,
        session: &SessionGuard,
        duration: Duration,
        cancel: &CancellationToken,
    ) -> bool {
        tokio::select! {
            finished = runtime::sleep_or_cancel(duration, cancel) => finished,
            _ = session.token().cancelled() => false,
        }
    }

    /// Releases markers unless a newer flight owns them now
    fn abandon_flight(&self, session: &SessionGuard) -> Result<FlightOutcome> {
        if session.is_superseded() {
            log::debug!("venue flight superseded");
        } else {
            log::info!("venue flight cancelled");
            self.declutter()?.unpin_all();
            self.evaluate_markers()?;
        }
        Ok(FlightOutcome::Cancelled)
    }

    pub fn intro_sequencer(
        &self,
        source: Arc<dyn TrackSource>,
        captions: Arc<dyn CaptionSink>,
    ) -> IntroSequencer {
        IntroSequencer::new(
            self.animator.clone(),
            self.constraints.clone(),
            source,
            captions,
        )
    }

    /// Plays the intro with markers hidden, then brings them back
    pub async fn play_intro(
        &self,
        script: &IntroScript,
        source: Arc<dyn TrackSource>,
        captions: Arc<dyn CaptionSink>,
        cancel: &CancellationToken,
    ) -> Result<IntroOutcome> {
        self.suspend_markers()?;
        let result = self
            .intro_sequencer(source, captions)
            .play(script, cancel)
            .await;
        self.resume_markers()?;
        result
    }
}

impl std::fmt::Debug for MapEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapEngine")
            .field("config", &self.config)
            .field("constraints", &self.constraints)
            .finish_non_exhaustive()
    }
}
