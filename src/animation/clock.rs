//! Frame scheduling for camera animations.
//!
//! A [`FrameClock`] plays the role of the host's animation-frame callback:
//! each `next_frame` suspends until the next frame and yields its timestamp.

use crate::core::constants::FRAME_INTERVAL_MS;
use async_trait::async_trait;
use instant::Instant;
use std::sync::Mutex;
use std::time::Duration;

#[async_trait]
pub trait FrameClock: Send + Sync {
    /// Waits for the next rendering frame and returns its timestamp in milliseconds
    async fn next_frame(&self) -> f64;
}

/// Real-time frames paced by `tokio::time`
#[derive(Debug)]
pub struct TokioFrameClock {
    origin: Instant,
    interval: Duration,
}

impl TokioFrameClock {
    pub fn new() -> Self {
        Self::with_interval(Duration::from_millis(FRAME_INTERVAL_MS))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            origin: Instant::now(),
            interval,
        }
    }
}

impl Default for TokioFrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameClock for TokioFrameClock {
    async fn next_frame(&self) -> f64 {
        tokio::time::sleep(self.interval).await;
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Deterministic clock advancing a fixed step per frame without sleeping.
/// Animations driven by it finish as fast as the executor can poll them.
#[derive(Debug)]
pub struct SteppedClock {
    now: Mutex<f64>,
    step_ms: f64,
}

impl SteppedClock {
    pub fn new(step_ms: f64) -> Self {
        Self::starting_at(0.0, step_ms)
    }

    pub fn starting_at(now_ms: f64, step_ms: f64) -> Self {
        Self {
            now: Mutex::new(now_ms),
            step_ms,
        }
    }

    pub fn now(&self) -> f64 {
        self.now.lock().map(|now| *now).unwrap_or_default()
    }
}

#[async_trait]
impl FrameClock for SteppedClock {
    async fn next_frame(&self) -> f64 {
        tokio::task::yield_now().await;
        match self.now.lock() {
            Ok(mut now) => {
                *now += self.step_ms;
                *now
            }
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// A clock whose frames never arrive, like a hidden browser tab
#[derive(Debug, Default)]
pub struct StalledClock;

#[async_trait]
impl FrameClock for StalledClock {
    async fn next_frame(&self) -> f64 {
        futures::future::pending::<()>().await;
        0.0
    }
}
