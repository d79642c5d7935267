use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use torchmap::{
    animation::clock::TokioFrameClock,
    canvas::{CanvasHandle, HeadlessCanvas},
    data::{
        source::{FileTrackSource, TrackSource},
        venue::load_venues_file,
    },
    intro::LogCaptionSink,
    layers::marker::Placement,
    CancellationToken, EngineBuilder, EngineConfig, IntroOutcome, IntroScript, MotionProfile,
};

/// Plays the torch-relay intro against a headless canvas and logs the camera choreography
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Engine configuration as JSON; overrides --reduced-motion
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Venue dataset (object keyed by slug, or an array of records)
    #[arg(long, value_name = "FILE")]
    venues: Option<PathBuf>,

    /// Directory holding <track>.geojson files
    #[arg(long, value_name = "DIR", default_value = "tracks")]
    tracks: PathBuf,

    /// Base URL to fetch <track>.geojson from instead of --tracks
    #[arg(long, value_name = "URL", conflicts_with = "tracks")]
    track_url: Option<String>,

    /// Use the reduced-motion profile
    #[arg(long)]
    reduced_motion: bool,
}

impl Args {
    fn profile(&self) -> anyhow::Result<MotionProfile> {
        match &self.config {
            Some(path) => {
                let config = EngineConfig::from_json_file(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                Ok(MotionProfile::Custom(config))
            }
            None if self.reduced_motion => Ok(MotionProfile::Reduced),
            None => Ok(MotionProfile::Standard),
        }
    }

    fn track_source(&self) -> anyhow::Result<Arc<dyn TrackSource>> {
        if let Some(url) = &self.track_url {
            let source = torchmap::data::source::HttpTrackSource::new(url.clone())?;
            return Ok(Arc::new(source));
        }
        Ok(Arc::new(FileTrackSource::new(self.tracks.clone())))
    }
}

/// Plays the torch-relay intro against a headless canvas and logs the result
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let venues = match &args.venues {
        Some(path) => load_venues_file(path)
            .with_context(|| format!("reading venues {}", path.display()))?,
        None => Vec::new(),
    };

    let headless = HeadlessCanvas::default();
    let engine = Arc::new(
        EngineBuilder::new(CanvasHandle::new(headless.clone()))
            .with_profile(args.profile()?)
            .with_clock(Arc::new(TokioFrameClock::new()))
            .with_venues(&venues)
            .build()?,
    );
    log::info!("loaded {} venues", venues.len());

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("interrupted, skipping intro");
            interrupt.cancel();
        }
    });

    let pump_cancel = CancellationToken::new();
    let pump = tokio::spawn(engine.clone().pump_events(pump_cancel.clone()));

    let outcome = engine
        .play_intro(
            &IntroScript::olympic_torch_relay(),
            args.track_source()?,
            Arc::new(LogCaptionSink),
            &cancel,
        )
        .await?;

    match outcome {
        IntroOutcome::Completed => log::info!("intro completed"),
        IntroOutcome::Cancelled => log::info!("intro cancelled"),
    }

    let markers = engine.markers()?;
    let visible = markers.iter().filter(|m| m.visible).count();
    let on_edges = markers
        .iter()
        .filter(|m| m.visible && matches!(m.placement, Placement::Edge(_)))
        .count();
    let state = headless.snapshot();
    log::info!(
        "{} frames rendered, camera at {:?}; {} of {} markers visible ({} on viewport edges)",
        state.frames.len(),
        state.camera.center,
        visible,
        markers.len(),
        on_edges
    );

    pump_cancel.cancel();
    pump.await??;
    Ok(())
}
