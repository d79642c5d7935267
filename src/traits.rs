//! Shared trait abstractions for the engine's outer collaborators

/// Route changes requested by the map, e.g. after flying to a clicked venue
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate_to(&self, path: &str) {
        self(path)
    }
}

/// Navigator that only logs the requested route
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate_to(&self, path: &str) {
        log::info!("navigate to {}", path);
    }
}
