//! Touch event model and dispatch
//!
//! Input sources deliver already-normalized touch points; nothing in this
//! crate reads raw platform event objects.

use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

/// Event type identifier
pub type EventType = u32;

/// Common event types
pub mod event_types {
    use super::EventType;

    pub const TOUCH_START: EventType = 1;
    pub const TOUCH_MOVE: EventType = 2;
    pub const TOUCH_END: EventType = 3;
    pub const TOUCH_CANCEL: EventType = 4;

    /// Contact released with residual velocity
    pub const MOMENTUM_START: EventType = 10;
    /// Residual velocity fell below the settle threshold
    pub const SETTLED: EventType = 11;
}

/// A 2D point in client coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Angle of the vector from `self` to `other`, in degrees
    pub fn angle_to(&self, other: Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }
}

/// One active contact
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Touch point list; most gestures use one or two contacts
pub type TouchList = SmallVec<[TouchPoint; 4]>;

/// Phase of a touch event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

impl TouchPhase {
    /// The state machine event this phase maps to
    pub fn event_type(&self) -> EventType {
        match self {
            TouchPhase::Start => event_types::TOUCH_START,
            TouchPhase::Move => event_types::TOUCH_MOVE,
            TouchPhase::End => event_types::TOUCH_END,
            TouchPhase::Cancel => event_types::TOUCH_CANCEL,
        }
    }
}

/// A touch event carrying every contact still down after the event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub phase: TouchPhase,
    pub touches: TouchList,
    /// Event time in milliseconds from the input source's clock
    pub timestamp_ms: f64,
}

impl TouchEvent {
    pub fn new(
        phase: TouchPhase,
        timestamp_ms: f64,
        touches: impl IntoIterator<Item = TouchPoint>,
    ) -> Self {
        Self {
            phase,
            touches: touches.into_iter().collect(),
            timestamp_ms,
        }
    }

    pub fn start(timestamp_ms: f64, touches: impl IntoIterator<Item = TouchPoint>) -> Self {
        Self::new(TouchPhase::Start, timestamp_ms, touches)
    }

    pub fn moved(timestamp_ms: f64, touches: impl IntoIterator<Item = TouchPoint>) -> Self {
        Self::new(TouchPhase::Move, timestamp_ms, touches)
    }

    /// All contacts lifted
    pub fn end(timestamp_ms: f64) -> Self {
        Self::new(TouchPhase::End, timestamp_ms, [])
    }

    pub fn cancel(timestamp_ms: f64) -> Self {
        Self::new(TouchPhase::Cancel, timestamp_ms, [])
    }

    pub fn event_type(&self) -> EventType {
        self.phase.event_type()
    }
}

new_key_type! {
    /// Handle returned by [`EventDispatcher::subscribe`]
    pub struct SubscriptionId;
}

/// Event handler function type
pub type EventHandler<E> = Box<dyn FnMut(&E) + Send>;

/// Dispatches events to explicitly registered subscribers
pub struct EventDispatcher<E> {
    handlers: SlotMap<SubscriptionId, EventHandler<E>>,
}

impl<E> EventDispatcher<E> {
    pub fn new() -> Self {
        Self {
            handlers: SlotMap::with_key(),
        }
    }

    /// Register a handler; it receives every event until unsubscribed
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&E) + Send + 'static,
    {
        self.handlers.insert(Box::new(handler))
    }

    /// Remove a handler. Returns false if the id was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.handlers.remove(id).is_some()
    }

    /// Dispatch an event to all registered handlers
    pub fn dispatch(&mut self, event: &E) {
        for (_, handler) in self.handlers.iter_mut() {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<E> Default for EventDispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventDispatcher<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}
