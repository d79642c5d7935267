//! Frame-driven camera animations.
//!
//! A [`CameraAnimator`] runs one [`AnimationPlan`] at a time against a canvas.
//! Every frame is pulled from a [`FrameClock`]; the loop checks cancellation
//! before touching the camera, and gives up waiting on frames that never come.

use crate::animation::cancel::CancellationToken;
use crate::animation::clock::FrameClock;
use crate::animation::interpolation::{cubic_out, smootherstep, Interpolatable};
use crate::animation::path::PathTrack;
use crate::canvas::{CanvasHandle, LineGradient, LineStyle};
use crate::core::camera::{CameraPose, CameraState, FreeCamera, GroundTracker};
use crate::core::config::AnimationConfig;
use crate::core::geo::LatLng;
use crate::runtime;
use crate::{Error, Result};
use instant::Instant;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How a fixed transition places the camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Framing {
    /// Camera centered on the target; pose elevation is a zoom level
    Centered,
    /// Free camera looking at the target; pose elevation is an altitude in metres
    LookAt,
}

/// Interpolation between two camera poses around a fixed target
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionPlan {
    pub target: LatLng,
    pub from: CameraPose,
    pub to: CameraPose,
    pub duration_ms: f64,
    pub framing: Framing,
}

/// How a path animation places the camera on each sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCamera {
    Centered,
    /// Free camera at `altitude` metres, set back so the sample stays framed
    Free { altitude: f64 },
}

/// Camera following a track, revealing the drawn line as it goes
#[derive(Debug, Clone)]
pub struct PathPlan {
    pub track: Arc<PathTrack>,
    /// Line layer whose gradient shows progress
    pub layer_id: Option<String>,
    pub style: LineStyle,
    pub duration_ms: f64,
    pub zoom: f64,
    pub pitch: f64,
    pub start_bearing: f64,
    /// Degrees the bearing turns over the whole animation
    pub rotation_rate: f64,
    pub camera: PathCamera,
}

impl PathPlan {
    pub fn new(track: Arc<PathTrack>, duration_ms: f64) -> Self {
        Self {
            track,
            layer_id: None,
            style: LineStyle::default(),
            duration_ms,
            zoom: 7.0,
            pitch: 50.0,
            start_bearing: 0.0,
            rotation_rate: crate::core::constants::PATH_ROTATION_RATE,
            camera: PathCamera::Centered,
        }
    }

    pub fn with_layer(mut self, layer_id: impl Into<String>) -> Self {
        self.layer_id = Some(layer_id.into());
        self
    }

    pub fn with_view(mut self, zoom: f64, pitch: f64, start_bearing: f64) -> Self {
        self.zoom = zoom;
        self.pitch = pitch;
        self.start_bearing = start_bearing;
        self
    }

    pub fn with_rotation_rate(mut self, rotation_rate: f64) -> Self {
        self.rotation_rate = rotation_rate;
        self
    }

    pub fn with_camera(mut self, camera: PathCamera) -> Self {
        self.camera = camera;
        self
    }

    /// Raw camera target at `phase`, before smoothing
    pub fn target_at(&self, phase: f64) -> (LatLng, f64) {
        let phase = phase.clamp(0.0, 1.0);
        (
            self.track.distance_along(phase),
            self.start_bearing - phase * self.rotation_rate,
        )
    }
}

#[derive(Debug, Clone)]
pub enum AnimationPlan {
    Transition(TransitionPlan),
    Path(PathPlan),
}

impl AnimationPlan {
    pub fn duration_ms(&self) -> f64 {
        match self {
            AnimationPlan::Transition(plan) => plan.duration_ms,
            AnimationPlan::Path(plan) => plan.duration_ms,
        }
    }
}

/// What to do when a session is requested while another one is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPolicy {
    /// Fail with [`Error::Busy`]
    Reject,
    /// Cancel the running session and take over
    Supersede,
}

#[derive(Debug)]
struct ActiveSession {
    id: u64,
    token: CancellationToken,
}

/// Exclusive right to drive the camera. Released on drop.
#[derive(Debug)]
pub struct SessionGuard {
    id: u64,
    token: CancellationToken,
    active: Arc<Mutex<Option<ActiveSession>>>,
}

impl SessionGuard {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Cancelled when a later session supersedes this one
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_superseded(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Ok(mut active) = self.active.lock() {
            if active.as_ref().map(|a| a.id) == Some(self.id) {
                *active = None;
                log::debug!("camera session {} released", self.id);
            }
        }
    }
}

/// Result of an animation that ran to its end
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationOutcome {
    /// Camera as left by the last frame
    pub camera: CameraState,
    pub frames: u32,
    /// Always 1.0; the phase is clamped on completion
    pub phase: f64,
    /// True when the animation was cut short because frames stopped arriving
    pub stalled: bool,
}

/// Drives the canvas camera frame by frame
pub struct CameraAnimator {
    canvas: CanvasHandle,
    clock: Arc<dyn FrameClock>,
    config: AnimationConfig,
    active: Arc<Mutex<Option<ActiveSession>>>,
    next_id: AtomicU64,
}

enum Frame {
    At(f64),
    Stalled,
}

impl CameraAnimator {
    pub fn new(canvas: CanvasHandle, clock: Arc<dyn FrameClock>, config: AnimationConfig) -> Self {
        Self {
            canvas,
            clock,
            config,
            active: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn canvas(&self) -> &CanvasHandle {
        &self.canvas
    }

    /// Claims the camera for a sequence of animations
    pub fn begin_session(&self, policy: SessionPolicy) -> Result<SessionGuard> {
        let mut active = self
            .active
            .lock()
            .map_err(|_| Error::Canvas("session lock poisoned".to_string()))?;

        if let Some(current) = active.as_ref() {
            match policy {
                SessionPolicy::Reject => return Err(Error::Busy),
                SessionPolicy::Supersede => {
                    log::debug!("superseding camera session {}", current.id);
                    current.token.cancel();
                }
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        *active = Some(ActiveSession {
            id,
            token: token.clone(),
        });
        log::debug!("camera session {} started", id);

        Ok(SessionGuard {
            id,
            token,
            active: self.active.clone(),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.active
            .lock()
            .map(|active| active.is_some())
            .unwrap_or(false)
    }

    /// Cancels whatever session currently drives the camera
    pub fn cancel_active(&self) {
        if let Ok(active) = self.active.lock() {
            if let Some(current) = active.as_ref() {
                current.token.cancel();
            }
        }
    }

    /// Runs one plan in its own session
    pub async fn animate(
        &self,
        plan: AnimationPlan,
        policy: SessionPolicy,
        cancel: &CancellationToken,
    ) -> Result<AnimationOutcome> {
        let session = self.begin_session(policy)?;
        self.animate_in(&session, plan, cancel).await
    }

    /// Runs one plan inside an already claimed session
    pub async fn animate_in(
        &self,
        session: &SessionGuard,
        plan: AnimationPlan,
        cancel: &CancellationToken,
    ) -> Result<AnimationOutcome> {
        let duration = self.config.scaled(plan.duration_ms());
        if !duration.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "animation duration must be finite, got {}",
                duration
            )));
        }
        log::debug!(
            "session {}: animating {} over {:.0} ms",
            session.id,
            match &plan {
                AnimationPlan::Transition(_) => "transition".to_string(),
                AnimationPlan::Path(p) => format!("path '{}'", p.track.name()),
            },
            duration
        );

        match plan {
            AnimationPlan::Transition(plan) => {
                self.run_transition(session, &plan, duration, cancel).await
            }
            AnimationPlan::Path(plan) => self.run_path(session, &plan, duration, cancel).await,
        }
    }

    fn check_cancelled(session: &SessionGuard, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() || session.token.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    async fn next_frame(&self) -> Frame {
        match tokio::time::timeout(self.config.frame_stall_timeout(), self.clock.next_frame()).await
        {
            Ok(now) => Frame::At(now),
            Err(_) => Frame::Stalled,
        }
    }

    /// Latest moment this animation may still be waiting on frames
    fn deadline(&self, duration_ms: f64) -> Duration {
        runtime::millis(duration_ms).saturating_add(self.config.wall_clock_grace())
    }

    async fn run_transition(
        &self,
        session: &SessionGuard,
        plan: &TransitionPlan,
        duration: f64,
        cancel: &CancellationToken,
    ) -> Result<AnimationOutcome> {
        let started = Instant::now();
        let deadline = self.deadline(duration);
        let mut tracker = GroundTracker::with_smoothing(self.config.ground_smoothing);
        let mut start_time: Option<f64> = None;
        let mut frames = 0;
        let mut stalled = false;

        loop {
            let now = match self.next_frame().await {
                Frame::At(now) if started.elapsed() <= deadline => Some(now),
                _ => None,
            };
            Self::check_cancelled(session, cancel)?;

            let phase = match now {
                Some(now) => {
                    let start = *start_time.get_or_insert(now);
                    if duration > 0.0 {
                        ((now - start) / duration).min(1.0)
                    } else {
                        1.0
                    }
                }
                None => {
                    log::warn!(
                        "session {}: frames stopped arriving, jumping to the end of the transition",
                        session.id
                    );
                    stalled = true;
                    1.0
                }
            };

            let pose = plan.from.lerp(&plan.to, cubic_out(phase));
            self.apply_pose(plan, &pose, &mut tracker)?;
            frames += 1;
            log::trace!(
                "transition phase {:.3}: elevation {:.2} bearing {:.2} pitch {:.2}",
                phase,
                pose.elevation,
                pose.bearing,
                pose.pitch
            );

            if phase == 1.0 {
                return Ok(AnimationOutcome {
                    camera: self.canvas.camera()?,
                    frames,
                    phase,
                    stalled,
                });
            }
        }
    }

    fn apply_pose(
        &self,
        plan: &TransitionPlan,
        pose: &CameraPose,
        tracker: &mut GroundTracker,
    ) -> Result<()> {
        match plan.framing {
            Framing::Centered => {
                let camera = CameraState::new(plan.target, pose.elevation, pose.pitch, pose.bearing);
                self.canvas.with(|c| c.jump_to(&camera))
            }
            Framing::LookAt => {
                let position =
                    tracker.locate(pose.pitch, pose.bearing, plan.target, pose.elevation, false);
                let camera = FreeCamera {
                    position,
                    altitude: pose.elevation,
                    pitch: pose.pitch,
                    bearing: pose.bearing,
                };
                self.canvas.with(|c| c.set_free_camera(&camera))
            }
        }
    }

    async fn run_path(
        &self,
        session: &SessionGuard,
        plan: &PathPlan,
        duration: f64,
        cancel: &CancellationToken,
    ) -> Result<AnimationOutcome> {
        let started = Instant::now();
        let deadline = self.deadline(duration);
        let blend = self.config.path_smoothing;
        let mut tracker = GroundTracker::with_smoothing(self.config.ground_smoothing);
        let mut start_time: Option<f64> = None;
        let mut previous: Option<LatLng> = None;
        let mut bearing = plan.start_bearing;
        let mut frames = 0;

        loop {
            let now = match self.next_frame().await {
                Frame::At(now) if started.elapsed() <= deadline => Some(now),
                _ => None,
            };
            Self::check_cancelled(session, cancel)?;

            let now = match now {
                Some(now) => now,
                None => {
                    log::warn!(
                        "session {}: frames stopped arriving, finishing path '{}'",
                        session.id,
                        plan.track.name()
                    );
                    let (position, final_bearing) = plan.target_at(1.0);
                    self.apply_path_camera(plan, position, final_bearing, &mut tracker)?;
                    self.reveal(plan, 1.0)?;
                    return self.finish(frames + 1, true);
                }
            };

            let start = *start_time.get_or_insert(now);
            let phase = if duration > 0.0 {
                (now - start) / duration
            } else {
                f64::INFINITY
            };

            if phase > 1.0 {
                if frames == 0 {
                    let (position, final_bearing) = plan.target_at(1.0);
                    self.apply_path_camera(plan, position, final_bearing, &mut tracker)?;
                }
                self.reveal(plan, 1.0)?;
                return self.finish(frames.max(1), false);
            }

            let (sample, target_bearing) = plan.target_at(phase);
            bearing = smootherstep(bearing, target_bearing, blend);
            let position = match previous {
                Some(prev) => LatLng::new(
                    smootherstep(prev.lat, sample.lat, blend),
                    smootherstep(prev.lng, sample.lng, blend),
                ),
                None => sample,
            };
            previous = Some(position);

            self.reveal(plan, phase)?;
            self.apply_path_camera(plan, position, bearing, &mut tracker)?;
            frames += 1;
            log::trace!(
                "path '{}' phase {:.3}: {:?} bearing {:.2}",
                plan.track.name(),
                phase,
                position,
                bearing
            );
        }
    }

    fn reveal(&self, plan: &PathPlan, progress: f64) -> Result<()> {
        if let Some(layer) = &plan.layer_id {
            let gradient = LineGradient::cutoff(progress, &plan.style);
            self.canvas.with(|c| c.set_line_gradient(layer, &gradient))?;
        }
        Ok(())
    }

    fn apply_path_camera(
        &self,
        plan: &PathPlan,
        position: LatLng,
        bearing: f64,
        tracker: &mut GroundTracker,
    ) -> Result<()> {
        match plan.camera {
            PathCamera::Centered => {
                let camera = CameraState::new(position, plan.zoom, plan.pitch, bearing);
                self.canvas.with(|c| c.jump_to(&camera))
            }
            PathCamera::Free { altitude } => {
                let ground = tracker.locate(plan.pitch, bearing, position, altitude, true);
                let camera = FreeCamera {
                    position: ground,
                    altitude,
                    pitch: plan.pitch,
                    bearing,
                };
                self.canvas.with(|c| c.set_free_camera(&camera))
            }
        }
    }

    fn finish(&self, frames: u32, stalled: bool) -> Result<AnimationOutcome> {
        Ok(AnimationOutcome {
            camera: self.canvas.camera()?,
            frames,
            phase: 1.0,
            stalled,
        })
    }
}

impl std::fmt::Debug for CameraAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraAnimator")
            .field("config", &self.config)
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}
