use std::sync::{Arc, Mutex};
use std::time::Duration;
use torchmap::animation::animator::CameraAnimator;
use torchmap::animation::clock::{SteppedClock, TokioFrameClock};
use torchmap::canvas::{CanvasHandle, HeadlessCanvas};
use torchmap::core::config::AnimationConfig;
use torchmap::data::source::{FileTrackSource, StaticTrackSource};
use torchmap::intro::script::{IntroStage, MARSEILLE, OLYMPIA, PARIS, START};
use torchmap::intro::{CaptionSink, IntroOutcome, IntroScript, IntroSequencer, LogCaptionSink};
use torchmap::{CancellationToken, Error, LatLng, LatLngBounds, PathTrack, ViewportConstraints};

#[derive(Default)]
struct RecordingCaptions(Mutex<Vec<String>>);

impl CaptionSink for RecordingCaptions {
    fn show(&self, text: &str) {
        self.0.lock().unwrap().push(format!("show {}", text));
    }

    fn hide(&self) {
        self.0.lock().unwrap().push("hide".to_string());
    }
}

fn track(name: &str, from: LatLng, to: LatLng) -> PathTrack {
    PathTrack::new(name, vec![from, to]).unwrap()
}

fn relay_tracks() -> StaticTrackSource {
    let nice = LatLng::new(43.71021, 7.26189);
    StaticTrackSource::new()
        .with_track(track("greek-line", OLYMPIA.center, MARSEILLE.center))
        .with_track(track("french-line-1", MARSEILLE.center, LatLng::new(42.697285, 9.450881)))
        .with_track(track("french-line-2", LatLng::new(42.68751, 2.90064), nice))
        .with_track(track("french-line-3", nice, PARIS.center))
}

fn stepped_sequencer(headless: &HeadlessCanvas, source: StaticTrackSource) -> IntroSequencer {
    let animator = Arc::new(CameraAnimator::new(
        CanvasHandle::new(headless.clone()),
        Arc::new(SteppedClock::new(16.0)),
        AnimationConfig::default(),
    ));
    IntroSequencer::new(
        animator,
        ViewportConstraints::default(),
        Arc::new(source),
        Arc::new(LogCaptionSink),
    )
}

fn short_script() -> IntroScript {
    IntroScript::new(PARIS)
        .stage(IntroStage::Jump(START))
        .stage(IntroStage::fly_to(OLYMPIA, 500.0))
        .stage(IntroStage::follow("greek-line", 2_000.0))
        .stage(IntroStage::fly_to(MARSEILLE, 500.0))
}

#[tokio::test]
async fn test_cancel_after_first_stage_leaves_no_layers() {
    let headless = HeadlessCanvas::default();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let finished = Arc::new(Mutex::new(Vec::new()));
    let seen = finished.clone();

    let sequencer = stepped_sequencer(&headless, relay_tracks()).on_stage_finished(move |index, _| {
        seen.lock().unwrap().push(index);
        if index == 0 {
            trigger.cancel();
        }
    });

    let outcome = sequencer.play(&short_script(), &cancel).await.unwrap();
    assert_eq!(outcome, IntroOutcome::Cancelled);
    assert_eq!(*finished.lock().unwrap(), vec![0]);

    let state = headless.snapshot();
    assert!(state.layers.is_empty());
    assert!(state.sources.is_empty());
    assert!(state.gradients.is_empty());
    // only the jump was applied
    assert_eq!(state.frames.len(), 1);
    assert_eq!(state.camera.center, START.center);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_path_tears_down() {
    let headless = HeadlessCanvas::default();
    let animator = Arc::new(CameraAnimator::new(
        CanvasHandle::new(headless.clone()),
        Arc::new(TokioFrameClock::new()),
        AnimationConfig::default(),
    ));
    let captions = Arc::new(RecordingCaptions::default());
    let sequencer = IntroSequencer::new(
        animator.clone(),
        ViewportConstraints::default(),
        Arc::new(relay_tracks()),
        captions.clone(),
    );

    let script = IntroScript::new(PARIS)
        .stage(IntroStage::Jump(OLYMPIA))
        .stage(IntroStage::caption("Olympia", 60_000.0))
        .stage(IntroStage::follow("greek-line", 8_000.0))
        .stage(IntroStage::fly_to(MARSEILLE, 3_000.0));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2_000)).await;
        trigger.cancel();
    });

    let outcome = sequencer.play(&script, &cancel).await.unwrap();
    assert_eq!(outcome, IntroOutcome::Cancelled);

    let frames_at_cancel = headless.snapshot().frames.len();
    tokio::time::sleep(Duration::from_millis(500)).await;
    let state = headless.snapshot();
    assert_eq!(state.frames.len(), frames_at_cancel);
    assert!(state.layers.is_empty());
    assert!(state.sources.is_empty());
    assert!(!animator.is_busy());
    assert_eq!(
        *captions.0.lock().unwrap(),
        vec!["show Olympia".to_string(), "hide".to_string()]
    );
}

#[tokio::test]
async fn test_missing_asset_aborts_without_drawing() {
    let headless = HeadlessCanvas::default();
    let animator = Arc::new(CameraAnimator::new(
        CanvasHandle::new(headless.clone()),
        Arc::new(SteppedClock::new(16.0)),
        AnimationConfig::default(),
    ));
    let sequencer = IntroSequencer::new(
        animator,
        ViewportConstraints::default(),
        Arc::new(FileTrackSource::new("/nonexistent/torchmap-tracks")),
        Arc::new(LogCaptionSink),
    );

    let result = sequencer
        .play(&short_script(), &CancellationToken::new())
        .await;
    assert!(matches!(result, Err(Error::AssetLoad { ref name, .. }) if name == "greek-line"));

    let state = headless.snapshot();
    assert!(state.layers.is_empty());
    assert!(state.sources.is_empty());
    assert!(state.frames.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_torch_relay_completes_and_settles_on_paris() {
    let headless = HeadlessCanvas::default();
    let sequencer = stepped_sequencer(&headless, relay_tracks());

    let outcome = sequencer
        .play(&IntroScript::olympic_torch_relay(), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome, IntroOutcome::Completed);

    let state = headless.snapshot();
    assert_eq!(state.camera.center, PARIS.center);
    assert_eq!(state.camera.zoom, 15.5);
    assert_eq!(state.camera.pitch, 55.0);
    assert_eq!(state.max_bounds, Some(LatLngBounds::around(PARIS.center, 1.0)));
    assert_eq!(state.min_zoom, Some(10.0));
    assert!(!state.rotation_enabled);
    assert!(state.layers.is_empty());
    assert!(state.sources.is_empty());
    assert!(!state.free_cameras.is_empty());
}

#[tokio::test]
async fn test_already_cancelled_run_does_nothing() {
    let headless = HeadlessCanvas::default();
    let sequencer = stepped_sequencer(&headless, relay_tracks());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = sequencer.play(&short_script(), &cancel).await.unwrap();
    assert_eq!(outcome, IntroOutcome::Cancelled);

    let state = headless.snapshot();
    assert!(state.frames.is_empty());
    assert!(state.layers.is_empty());
    assert!(state.max_bounds.is_none());
}
