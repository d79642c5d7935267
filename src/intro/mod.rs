//! The opening torch-relay camera sequence.

pub mod captions;
pub mod script;
pub mod sequencer;

pub use captions::{CaptionScheduler, CaptionSink, LogCaptionSink};
pub use script::{IntroLocation, IntroScript, IntroStage};
pub use sequencer::{IntroOutcome, IntroSequencer};
