pub mod animator;
pub mod cancel;
pub mod clock;
pub mod interpolation;
pub mod path;

// Re-export commonly used types and functions for convenience
pub use animator::{
    AnimationOutcome, AnimationPlan, CameraAnimator, Framing, PathCamera, PathPlan,
    SessionGuard, SessionPolicy, TransitionPlan,
};
pub use cancel::CancellationToken;
pub use clock::{FrameClock, StalledClock, SteppedClock, TokioFrameClock};
pub use interpolation::{cubic_out, lerp, smootherstep, Interpolatable};
pub use path::{bearing_between, normalize_angle, PathTrack};
