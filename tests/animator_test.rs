use std::sync::Arc;
use torchmap::animation::animator::{
    AnimationPlan, CameraAnimator, Framing, PathCamera, PathPlan, SessionPolicy, TransitionPlan,
};
use torchmap::animation::clock::{StalledClock, SteppedClock};
use torchmap::canvas::{CanvasHandle, HeadlessCanvas};
use torchmap::core::config::AnimationConfig;
use torchmap::{CameraPose, CancellationToken, Error, LatLng, PathTrack};

fn animator(headless: &HeadlessCanvas, config: AnimationConfig) -> CameraAnimator {
    CameraAnimator::new(
        CanvasHandle::new(headless.clone()),
        Arc::new(SteppedClock::new(16.0)),
        config,
    )
}

fn relay_track() -> Arc<PathTrack> {
    Arc::new(
        PathTrack::new(
            "greek-line",
            vec![
                LatLng::new(37.64471, 21.62536),
                LatLng::new(38.5, 15.0),
                LatLng::new(43.29527, 5.36455),
            ],
        )
        .unwrap(),
    )
}

#[tokio::test]
async fn test_smoothed_bearing_never_outruns_target() {
    let headless = HeadlessCanvas::default();
    let animator = animator(&headless, AnimationConfig::default());

    let duration = 1_000.0;
    let rotation = 250.0;
    let plan = PathPlan::new(relay_track(), duration)
        .with_view(7.0, 50.0, 340.0)
        .with_rotation_rate(rotation);
    animator
        .animate(
            AnimationPlan::Path(plan),
            SessionPolicy::Reject,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let frames = headless.snapshot().frames;
    assert!(frames.len() > 10);

    // the unsmoothed target turns by a constant amount every 16 ms frame
    let target_delta = rotation * 16.0 / duration;
    for pair in frames.windows(2) {
        let delta = (pair[1].bearing - pair[0].bearing).abs();
        assert!(
            delta <= target_delta + 1e-9,
            "bearing moved {} with target delta {}",
            delta,
            target_delta
        );
    }

    // bearing only ever turns toward the target, never past it
    let mut target = 340.0;
    for frame in &frames[1..] {
        target -= target_delta;
        assert!(frame.bearing >= target - 1e-9);
    }
}

#[tokio::test]
async fn test_smoothed_position_stays_between_samples() {
    let headless = HeadlessCanvas::default();
    let animator = animator(&headless, AnimationConfig::default());

    let track = relay_track();
    let plan = PathPlan::new(track.clone(), 500.0).with_rotation_rate(0.0);
    animator
        .animate(
            AnimationPlan::Path(plan),
            SessionPolicy::Reject,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let frames = headless.snapshot().frames;
    assert_eq!(frames[0].center, track.first());
    for pair in frames.windows(2) {
        // the track heads west, the smoothed camera never doubles back
        assert!(pair[1].center.lng <= pair[0].center.lng + 1e-12);
    }
}

#[tokio::test]
async fn test_animation_resolves_once_with_clamped_phase() {
    let headless = HeadlessCanvas::default();
    let animator = animator(&headless, AnimationConfig::default());

    let transition = AnimationPlan::Transition(TransitionPlan {
        target: LatLng::new(43.29527, 5.36455),
        from: CameraPose::new(7.0, 340.0, 50.0),
        to: CameraPose::new(9.0, 300.0, 30.0),
        duration_ms: 750.0,
        framing: Framing::Centered,
    });
    let outcome = animator
        .animate(transition, SessionPolicy::Reject, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome.phase, 1.0);
    assert_eq!(outcome.camera.zoom, 9.0);
    assert_eq!(outcome.camera.bearing, 300.0);
    assert_eq!(headless.snapshot().frames.len() as u32, outcome.frames);

    let path = AnimationPlan::Path(PathPlan::new(relay_track(), 750.0).with_layer("greek-line-layer"));
    let outcome = animator
        .animate(path, SessionPolicy::Reject, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome.phase, 1.0);
    assert!(!outcome.stalled);
    assert!(!animator.is_busy());
}

#[tokio::test(start_paused = true)]
async fn test_stalled_frames_finish_at_final_state() {
    let headless = HeadlessCanvas::default();
    let animator = CameraAnimator::new(
        CanvasHandle::new(headless.clone()),
        Arc::new(StalledClock),
        AnimationConfig {
            frame_stall_timeout_ms: 50,
            ..AnimationConfig::default()
        },
    );

    let transition = AnimationPlan::Transition(TransitionPlan {
        target: LatLng::new(48.858093, 2.294694),
        from: CameraPose::new(7.0, 340.0, 50.0),
        to: CameraPose::new(15.5, 0.0, 55.0),
        duration_ms: 5_000.0,
        framing: Framing::Centered,
    });
    let outcome = animator
        .animate(transition, SessionPolicy::Reject, &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.stalled);
    assert_eq!(outcome.camera.zoom, 15.5);
    assert_eq!(outcome.camera.pitch, 55.0);

    let track = relay_track();
    let path = AnimationPlan::Path(
        PathPlan::new(track.clone(), 5_000.0).with_camera(PathCamera::Centered),
    );
    let outcome = animator
        .animate(path, SessionPolicy::Reject, &CancellationToken::new())
        .await
        .unwrap();
    assert!(outcome.stalled);
    assert_eq!(outcome.camera.center, track.last());
}

#[tokio::test]
async fn test_cancelled_token_stops_before_any_frame() {
    let headless = HeadlessCanvas::default();
    let animator = animator(&headless, AnimationConfig::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let plan = AnimationPlan::Path(PathPlan::new(relay_track(), 1_000.0));
    let result = animator.animate(plan, SessionPolicy::Reject, &cancel).await;

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(headless.snapshot().frames.is_empty());
    assert!(!animator.is_busy());
}

#[tokio::test]
async fn test_second_session_rejected_or_superseding() {
    let headless = HeadlessCanvas::default();
    let animator = animator(&headless, AnimationConfig::default());

    let running = animator.begin_session(SessionPolicy::Reject).unwrap();
    let plan = || AnimationPlan::Path(PathPlan::new(relay_track(), 100.0));

    let rejected = animator
        .animate(plan(), SessionPolicy::Reject, &CancellationToken::new())
        .await;
    assert!(matches!(rejected, Err(Error::Busy)));
    assert!(headless.snapshot().frames.is_empty());

    let taken_over = animator
        .animate(plan(), SessionPolicy::Supersede, &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(taken_over.phase, 1.0);
    assert!(running.is_superseded());
}
