pub mod events;
pub mod wait;

// Re-export the essential types
pub use events::{EventKind, EventReceiver, EventSender, ListenerId, MapEvent};
pub use wait::{EventWaiter, WaitOutcome};
