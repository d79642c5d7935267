//! Plays an [`IntroScript`] against the canvas.

use crate::animation::animator::{
    AnimationPlan, CameraAnimator, Framing, PathPlan, SessionGuard, SessionPolicy,
    TransitionPlan,
};
use crate::animation::cancel::CancellationToken;
use crate::animation::path::PathTrack;
use crate::canvas::{CanvasHandle, LineGradient, LineStyle};
use crate::core::camera::CameraPose;
use crate::core::viewport::ViewportConstraints;
use crate::data::source::TrackSource;
use crate::intro::captions::{CaptionScheduler, CaptionSink};
use crate::intro::script::{IntroScript, IntroStage};
use crate::prelude::HashMap;
use crate::runtime;
use crate::{Error, Result};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroOutcome {
    /// Every stage ran and the map was settled on the destination
    Completed,
    /// Stopped early; no camera changes after the cancellation was seen
    Cancelled,
}

pub fn source_id(track: &str) -> String {
    format!("{}-source", track)
}

pub fn layer_id(track: &str) -> String {
    format!("{}-layer", track)
}

type StageHook = Box<dyn Fn(usize, &IntroStage) + Send + Sync>;

/// Line layers and sources created for one intro run, removed on teardown
struct TemporaryLayers {
    canvas: CanvasHandle,
    sources: Vec<String>,
    layers: Vec<String>,
}

impl TemporaryLayers {
    fn new(canvas: CanvasHandle) -> Self {
        Self {
            canvas,
            sources: Vec::new(),
            layers: Vec::new(),
        }
    }

    fn register(&mut self, track: &PathTrack, style: &LineStyle) -> Result<()> {
        let source = source_id(track.name());
        let layer = layer_id(track.name());

        self.canvas.with(|c| c.add_source(&source, track))??;
        self.sources.push(source.clone());

        self.canvas
            .with(|c| c.add_line_layer(&layer, &source, style))??;
        self.layers.push(layer.clone());

        // nothing drawn until the path animation reveals it
        let hidden = LineGradient::cutoff(0.0, style);
        self.canvas.with(|c| c.set_line_gradient(&layer, &hidden))?;
        Ok(())
    }

    fn teardown(&mut self) {
        if self.layers.is_empty() && self.sources.is_empty() {
            return;
        }
        let layers: Vec<String> = self.layers.drain(..).collect();
        let sources: Vec<String> = self.sources.drain(..).collect();
        log::debug!(
            "removing {} intro layers and {} sources",
            layers.len(),
            sources.len()
        );
        let removed = self.canvas.with(|c| {
            for layer in &layers {
                c.remove_layer(layer);
            }
            for source in &sources {
                c.remove_source(source);
            }
        });
        if let Err(e) = removed {
            log::warn!("failed to remove intro layers: {}", e);
        }
    }
}

impl Drop for TemporaryLayers {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Scripted, cancellable camera choreography
pub struct IntroSequencer {
    animator: Arc<CameraAnimator>,
    constraints: ViewportConstraints,
    source: Arc<dyn TrackSource>,
    captions: Arc<dyn CaptionSink>,
    style: LineStyle,
    on_stage_finished: Option<StageHook>,
}

impl IntroSequencer {
    pub fn new(
        animator: Arc<CameraAnimator>,
        constraints: ViewportConstraints,
        source: Arc<dyn TrackSource>,
        captions: Arc<dyn CaptionSink>,
    ) -> Self {
        Self {
            animator,
            constraints,
            source,
            captions,
            style: LineStyle::default(),
            on_stage_finished: None,
        }
    }

    pub fn with_line_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    /// Called with the stage index after each stage completes
    pub fn on_stage_finished<F>(mut self, hook: F) -> Self
    where
        F: Fn(usize, &IntroStage) + Send + Sync + 'static,
    {
        self.on_stage_finished = Some(Box::new(hook));
        self
    }

    pub async fn play(
        &self,
        script: &IntroScript,
        cancel: &CancellationToken,
    ) -> Result<IntroOutcome> {
        if cancel.is_cancelled() {
            return Ok(IntroOutcome::Cancelled);
        }

        let session = self.animator.begin_session(SessionPolicy::Supersede)?;
        let canvas = self.animator.canvas().clone();
        log::info!("intro starting with {} stages", script.stages.len());

        // everything is fetched before anything is drawn
        let mut tracks: HashMap<String, Arc<PathTrack>> = HashMap::default();
        for name in script.required_tracks() {
            if cancel.is_cancelled() {
                return Ok(IntroOutcome::Cancelled);
            }
            let track = self.source.fetch(&name).await.map_err(|e| match e {
                Error::AssetLoad { .. } => e,
                other => Error::AssetLoad {
                    name: name.clone(),
                    reason: other.to_string(),
                },
            })?;
            log::info!("loaded track '{}' ({} vertices)", name, track.vertices().len());
            tracks.insert(name, Arc::new(track));
        }

        self.constraints.unlock(&canvas)?;

        let mut layers = TemporaryLayers::new(canvas.clone());
        for track in tracks.values() {
            layers.register(track, &self.style)?;
        }

        let mut captions = CaptionScheduler::new(self.captions.clone());
        let result = self
            .run_stages(&session, script, &tracks, &mut captions, cancel)
            .await;

        captions.clear();
        layers.teardown();

        match result {
            Ok(()) => {
                self.constraints
                    .settle(&canvas, script.destination.center)?;
                log::info!("intro finished at '{}'", script.destination.name);
                Ok(IntroOutcome::Completed)
            }
            Err(Error::Cancelled) => {
                log::info!("intro cancelled");
                Ok(IntroOutcome::Cancelled)
            }
            Err(e) => Err(e),
        }
    }

    async fn run_stages(
        &self,
        session: &SessionGuard,
        script: &IntroScript,
        tracks: &HashMap<String, Arc<PathTrack>>,
        captions: &mut CaptionScheduler,
        cancel: &CancellationToken,
    ) -> Result<()> {
        let canvas = self.animator.canvas();
        let config = self.animator.config();

        for (index, stage) in script.stages.iter().enumerate() {
            if cancel.is_cancelled() || session.is_superseded() {
                return Err(Error::Cancelled);
            }
            log::debug!("intro stage {}: {}", index, stage.label());

            match stage {
                IntroStage::Jump(location) => {
                    let camera = location.camera();
                    canvas.with(|c| c.jump_to(&camera))?;
                }
                IntroStage::FlyTo {
                    location,
                    duration_ms,
                } => {
                    let current = canvas.camera()?;
                    let plan = TransitionPlan {
                        target: location.center,
                        from: CameraPose::new(current.zoom, current.bearing, current.pitch),
                        to: location.pose(),
                        duration_ms: *duration_ms,
                        framing: Framing::Centered,
                    };
                    self.animator
                        .animate_in(session, AnimationPlan::Transition(plan), cancel)
                        .await?;
                }
                IntroStage::Orbit {
                    location,
                    from,
                    to,
                    duration_ms,
                } => {
                    let plan = TransitionPlan {
                        target: location.center,
                        from: *from,
                        to: *to,
                        duration_ms: *duration_ms,
                        framing: Framing::LookAt,
                    };
                    self.animator
                        .animate_in(session, AnimationPlan::Transition(plan), cancel)
                        .await?;
                }
                IntroStage::FollowPath {
                    track,
                    duration_ms,
                    zoom,
                    pitch,
                    start_bearing,
                    rotation_rate,
                    camera,
                } => {
                    let path = tracks.get(track).cloned().ok_or_else(|| Error::AssetLoad {
                        name: track.clone(),
                        reason: "track was not loaded".to_string(),
                    })?;
                    let start_bearing = match start_bearing {
                        Some(bearing) => *bearing,
                        None => canvas.camera()?.bearing,
                    };
                    let mut plan = PathPlan::new(path, *duration_ms)
                        .with_layer(layer_id(track))
                        .with_view(*zoom, *pitch, start_bearing)
                        .with_rotation_rate(rotation_rate.unwrap_or(config.rotation_rate))
                        .with_camera(*camera);
                    plan.style = self.style.clone();
                    self.animator
                        .animate_in(session, AnimationPlan::Path(plan), cancel)
                        .await?;
                }
                IntroStage::Caption { text, display_ms } => {
                    captions.display(text, runtime::millis(config.scaled(*display_ms)));
                }
                IntroStage::Pause { duration_ms } => {
                    let pause = tokio::time::sleep(runtime::millis(config.scaled(*duration_ms)));
                    tokio::select! {
                        _ = pause => {}
                        _ = cancel.cancelled() => return Err(Error::Cancelled),
                        _ = session.token().cancelled() => return Err(Error::Cancelled),
                    }
                }
            }

            if let Some(hook) = &self.on_stage_finished {
                hook(index, stage);
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for IntroSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntroSequencer")
            .field("constraints", &self.constraints)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}
