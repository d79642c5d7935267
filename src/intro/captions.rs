//! Timed captions shown alongside the intro.

use crate::runtime::{self, AsyncHandle, TaskHandle};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Receives caption text to display over the map
pub trait CaptionSink: Send + Sync {
    fn show(&self, text: &str);
    fn hide(&self);
}

/// Writes captions to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCaptionSink;

impl CaptionSink for LogCaptionSink {
    fn show(&self, text: &str) {
        log::info!("caption: {}", text);
    }

    fn hide(&self) {
        log::debug!("caption hidden");
    }
}

/// Shows captions and hides them on their own timers.
///
/// A newer caption replaces the current one; the older timer then leaves it alone.
pub struct CaptionScheduler {
    sink: Arc<dyn CaptionSink>,
    generation: Arc<AtomicU64>,
    visible: Arc<AtomicBool>,
    timers: Vec<TaskHandle>,
}

impl CaptionScheduler {
    pub fn new(sink: Arc<dyn CaptionSink>) -> Self {
        Self {
            sink,
            generation: Arc::new(AtomicU64::new(0)),
            visible: Arc::new(AtomicBool::new(false)),
            timers: Vec::new(),
        }
    }

    pub fn display(&mut self, text: &str, duration: Duration) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.sink.show(text);
        self.visible.store(true, Ordering::SeqCst);

        self.timers.retain(|timer| !timer.is_finished());

        let sink = self.sink.clone();
        let current = self.generation.clone();
        let visible = self.visible.clone();
        self.timers.push(runtime::spawn(async move {
            runtime::delay(duration).await;
            if current.load(Ordering::SeqCst) == generation
                && visible.swap(false, Ordering::SeqCst)
            {
                sink.hide();
            }
        }));
    }

    pub fn pending(&self) -> usize {
        self.timers.iter().filter(|t| !t.is_finished()).count()
    }

    /// Aborts pending timers and hides whatever is on screen
    pub fn clear(&mut self) {
        for timer in self.timers.drain(..) {
            timer.cancel();
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        if self.visible.swap(false, Ordering::SeqCst) {
            self.sink.hide();
        }
    }
}

impl Drop for CaptionScheduler {
    fn drop(&mut self) {
        self.clear();
    }
}
