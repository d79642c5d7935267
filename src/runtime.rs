//! Runtime helpers for timers and detached tasks
//!
//! Everything the engine schedules outside of animation frames (caption
//! timers, the settle delay after a fly-to, the event pump) goes through here.

use crate::animation::cancel::CancellationToken;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Tokio-backed task handle; the task is aborted when the handle is dropped
#[derive(Debug)]
pub struct TaskHandle(JoinHandle<()>);

impl AsyncHandle for TaskHandle {
    fn is_finished(&self) -> bool {
        self.0.is_finished()
    }

    fn cancel(&self) {
        self.0.abort();
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Spawns a detached task on the current tokio runtime
pub fn spawn<F>(future: F) -> TaskHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    log::trace!("runtime::spawn");
    TaskHandle(tokio::spawn(future))
}

/// Converts scripted milliseconds to a `Duration`. Negative and NaN read as
/// zero, values too large to represent saturate.
pub fn millis(ms: f64) -> Duration {
    if !(ms > 0.0) {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(ms / 1000.0).unwrap_or(Duration::MAX)
}

pub async fn delay(duration: Duration) {
    tokio::time::sleep(duration).await;
}

/// Sleeps for `duration` unless cancelled first; returns false when cancelled
pub async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    if cancel.is_cancelled() {
        return false;
    }
    tokio::select! {
        _ = delay(duration) => true,
        _ = cancel.cancelled() => false,
    }
}
