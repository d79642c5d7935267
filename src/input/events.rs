use crate::core::geo::{LatLng, Point};
use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender};
use serde::{Deserialize, Serialize};

/// Events emitted by a map canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MapEvent {
    /// Zoom changed; fired continuously during gestures, including scroll-wheel zoom
    Zoom { zoom: f64 },
    /// A zoom gesture or animation ended
    ZoomEnd { zoom: f64 },
    /// Camera started moving
    MoveStart { center: LatLng },
    /// Camera settled after a move
    MoveEnd { center: LatLng, zoom: f64 },
    /// Pointer click on the canvas
    Click { position: Point },
}

impl MapEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            MapEvent::Zoom { .. } => EventKind::Zoom,
            MapEvent::ZoomEnd { .. } => EventKind::ZoomEnd,
            MapEvent::MoveStart { .. } => EventKind::MoveStart,
            MapEvent::MoveEnd { .. } => EventKind::MoveEnd,
            MapEvent::Click { .. } => EventKind::Click,
        }
    }
}

/// Discriminant used when subscribing to a subset of [`MapEvent`]s
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Zoom,
    ZoomEnd,
    MoveStart,
    MoveEnd,
    Click,
}

/// Handle returned by a subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

pub type EventSender = UnboundedSender<MapEvent>;
pub type EventReceiver = UnboundedReceiver<MapEvent>;
