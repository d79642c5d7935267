//! Timeout-guarded waits on canvas events.

use crate::animation::cancel::CancellationToken;
use crate::canvas::CanvasHandle;
use crate::input::events::{EventKind, EventReceiver, ListenerId, MapEvent};
use crate::Result;
use futures::channel::mpsc::unbounded;
use futures::StreamExt;
use std::time::Duration;

/// How a wait for a canvas event ended
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome {
    Event(MapEvent),
    TimedOut,
    Cancelled,
    /// The canvas dropped the listener
    Closed,
}

impl WaitOutcome {
    pub fn is_event(&self) -> bool {
        matches!(self, WaitOutcome::Event(_))
    }
}

/// One-shot listener for a single event kind.
///
/// Subscribe before starting the move that will produce the event; canvases
/// may emit it synchronously. The listener is removed when the waiter drops.
pub struct EventWaiter {
    canvas: CanvasHandle,
    listener: ListenerId,
    receiver: EventReceiver,
}

impl EventWaiter {
    pub fn subscribe(canvas: &CanvasHandle, kind: EventKind) -> Result<Self> {
        let (sender, receiver) = unbounded();
        let listener = canvas.with(|c| c.subscribe(kind, sender))?;
        Ok(Self {
            canvas: canvas.clone(),
            listener,
            receiver,
        })
    }

    /// Waits for the next event, giving up after `timeout` or on cancellation
    pub async fn wait(mut self, timeout: Duration, cancel: &CancellationToken) -> WaitOutcome {
        if cancel.is_cancelled() {
            return WaitOutcome::Cancelled;
        }

        tokio::select! {
            event = self.receiver.next() => match event {
                Some(event) => WaitOutcome::Event(event),
                None => WaitOutcome::Closed,
            },
            _ = tokio::time::sleep(timeout) => {
                log::debug!("no event within {:?}, continuing", timeout);
                WaitOutcome::TimedOut
            }
            _ = cancel.cancelled() => WaitOutcome::Cancelled,
        }
    }
}

impl Drop for EventWaiter {
    fn drop(&mut self) {
        let listener = self.listener;
        if self.canvas.with(|c| c.unsubscribe(listener)).is_err() {
            log::warn!("could not unsubscribe listener {:?}", listener);
        }
    }
}
