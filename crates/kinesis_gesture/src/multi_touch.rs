//! Multi-touch gesture tracking
//!
//! Derives center, spread, angle, scale, rotation and velocity from the set of
//! active contacts. The tracker owns a two-state machine:
//!
//! ```text
//! Idle --TOUCH_START (count in range)--> Active
//! Active --TOUCH_END | TOUCH_CANCEL--> Idle
//! ```
//!
//! Scale and rotation are measured against the distance and angle of the
//! first two contacts captured on entering Active. The anchor holds for the
//! whole gesture, even when contacts are added or lifted.

use kinesis_core::events::{
    event_types, EventDispatcher, EventType, Point, SubscriptionId, TouchEvent, TouchList,
    TouchPhase,
};
use kinesis_core::fsm::{StateMachine, StateTransitions};
use serde::{Deserialize, Serialize};

/// Contact count limits for an active gesture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiTouchOptions {
    pub min_touches: usize,
    pub max_touches: usize,
}

impl Default for MultiTouchOptions {
    fn default() -> Self {
        Self {
            min_touches: 1,
            max_touches: 10,
        }
    }
}

impl MultiTouchOptions {
    pub fn new(min_touches: usize, max_touches: usize) -> Self {
        Self {
            min_touches,
            max_touches,
        }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_touches && count <= self.max_touches
    }
}

/// Tracker phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GesturePhase {
    #[default]
    Idle,
    Active,
}

impl StateTransitions for GesturePhase {
    fn on_event(&self, event: EventType) -> Option<Self> {
        use event_types::*;
        match (self, event) {
            (GesturePhase::Idle, TOUCH_START) => Some(GesturePhase::Active),
            (GesturePhase::Active, TOUCH_END | TOUCH_CANCEL) => Some(GesturePhase::Idle),
            _ => None,
        }
    }
}

/// Per-millisecond rates of change between consecutive move frames
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TouchVelocity {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation: f64,
}

/// Continuous multi-touch state
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiTouchState {
    pub is_active: bool,
    pub touches: TouchList,
    pub center: Point,
    /// Distance between the first two contacts
    pub distance: f64,
    /// Angle from contact 0 to contact 1, in degrees
    pub angle: f64,
    pub scale: f64,
    /// Degrees relative to the anchor angle
    pub rotation: f64,
    pub velocity: TouchVelocity,
}

impl Default for MultiTouchState {
    fn default() -> Self {
        Self {
            is_active: false,
            touches: TouchList::new(),
            center: Point::ZERO,
            distance: 0.0,
            angle: 0.0,
            scale: 1.0,
            rotation: 0.0,
            velocity: TouchVelocity::default(),
        }
    }
}

/// What a single touch event did to the tracker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureUpdate {
    Started,
    Moved,
    Ended,
    /// The event was outside the accepted contact range or arrived while idle
    Ignored,
}

/// Delivered to tracker subscribers after every non-ignored event
#[derive(Clone, Debug, PartialEq)]
pub struct MultiTouchEvent {
    pub update: GestureUpdate,
    pub timestamp_ms: f64,
    pub state: MultiTouchState,
}

/// Mean position of all contacts
pub(crate) fn centroid(touches: &TouchList) -> Point {
    if touches.is_empty() {
        return Point::ZERO;
    }
    let n = touches.len() as f64;
    let (sx, sy) = touches
        .iter()
        .fold((0.0, 0.0), |(sx, sy), t| (sx + t.x, sy + t.y));
    Point::new(sx / n, sy / n)
}

/// Distance and angle between the first two contacts
pub(crate) fn spread(touches: &TouchList) -> Option<(f64, f64)> {
    match touches.as_slice() {
        [a, b, ..] => {
            let (a, b) = (a.position(), b.position());
            Some((a.distance_to(b), a.angle_to(b)))
        }
        _ => None,
    }
}

/// Tracks one multi-touch gesture at a time
pub struct TouchGestureTracker {
    options: MultiTouchOptions,
    machine: StateMachine<GesturePhase>,
    state: MultiTouchState,
    initial_distance: f64,
    initial_angle: f64,
    last_time_ms: f64,
    dispatcher: EventDispatcher<MultiTouchEvent>,
}

impl TouchGestureTracker {
    pub fn new(options: MultiTouchOptions) -> Self {
        Self {
            options,
            machine: StateMachine::new(GesturePhase::Idle),
            state: MultiTouchState::default(),
            initial_distance: 0.0,
            initial_angle: 0.0,
            last_time_ms: 0.0,
            dispatcher: EventDispatcher::new(),
        }
    }

    pub fn options(&self) -> &MultiTouchOptions {
        &self.options
    }

    pub fn state(&self) -> &MultiTouchState {
        &self.state
    }

    pub fn phase(&self) -> GesturePhase {
        self.machine.current()
    }

    pub fn is_active(&self) -> bool {
        self.machine.is_in(GesturePhase::Active)
    }

    pub fn initial_distance(&self) -> f64 {
        self.initial_distance
    }

    pub fn initial_angle(&self) -> f64 {
        self.initial_angle
    }

    /// Receive a [`MultiTouchEvent`] after each start, move and end
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&MultiTouchEvent) + Send + 'static,
    {
        self.dispatcher.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    /// Feed one touch event through the tracker
    pub fn handle(&mut self, event: &TouchEvent) -> GestureUpdate {
        let update = match event.phase {
            TouchPhase::Start => self.begin(event),
            TouchPhase::Move => self.update(event),
            TouchPhase::End | TouchPhase::Cancel => self.end(event),
        };

        if update != GestureUpdate::Ignored {
            self.dispatcher.dispatch(&MultiTouchEvent {
                update,
                timestamp_ms: event.timestamp_ms,
                state: self.state.clone(),
            });
        }
        update
    }

    /// Return to idle without notifying subscribers
    pub fn reset(&mut self) {
        self.machine.reset();
        self.state = MultiTouchState::default();
        self.initial_distance = 0.0;
        self.initial_angle = 0.0;
        self.last_time_ms = 0.0;
    }

    fn begin(&mut self, event: &TouchEvent) -> GestureUpdate {
        if !self.options.accepts(event.touches.len()) {
            tracing::trace!(count = event.touches.len(), "touch start outside contact range");
            return GestureUpdate::Ignored;
        }
        if self.machine.send(event.event_type()).is_none() {
            // Extra contacts join the running gesture on the next move
            return GestureUpdate::Ignored;
        }

        let (distance, angle) = spread(&event.touches).unwrap_or((0.0, 0.0));
        self.initial_distance = distance;
        self.initial_angle = angle;
        self.last_time_ms = event.timestamp_ms;

        self.state = MultiTouchState {
            is_active: true,
            touches: event.touches.clone(),
            center: centroid(&event.touches),
            distance,
            angle,
            ..Default::default()
        };
        tracing::debug!(
            touches = event.touches.len(),
            distance,
            angle,
            "multi-touch gesture anchored"
        );
        GestureUpdate::Started
    }

    fn update(&mut self, event: &TouchEvent) -> GestureUpdate {
        if !self.is_active() || !self.options.accepts(event.touches.len()) {
            return GestureUpdate::Ignored;
        }

        let center = centroid(&event.touches);
        let (distance, angle, scale, rotation) = match spread(&event.touches) {
            Some((distance, angle)) => {
                let scale = if self.initial_distance > 0.0 {
                    distance / self.initial_distance
                } else {
                    1.0
                };
                (distance, angle, scale, angle - self.initial_angle)
            }
            None => (0.0, 0.0, 1.0, 0.0),
        };

        let dt = event.timestamp_ms - self.last_time_ms;
        let velocity = if dt > 0.0 {
            TouchVelocity {
                x: (center.x - self.state.center.x) / dt,
                y: (center.y - self.state.center.y) / dt,
                scale: (scale - self.state.scale) / dt,
                rotation: (rotation - self.state.rotation) / dt,
            }
        } else {
            TouchVelocity::default()
        };

        self.state = MultiTouchState {
            is_active: true,
            touches: event.touches.clone(),
            center,
            distance,
            angle,
            scale,
            rotation,
            velocity,
        };
        self.last_time_ms = event.timestamp_ms;
        GestureUpdate::Moved
    }

    fn end(&mut self, event: &TouchEvent) -> GestureUpdate {
        if self.machine.send(event.event_type()).is_none() {
            return GestureUpdate::Ignored;
        }
        self.state.is_active = false;
        self.state.touches.clear();
        self.state.velocity = TouchVelocity::default();
        tracing::debug!(scale = self.state.scale, rotation = self.state.rotation, "multi-touch gesture ended");
        GestureUpdate::Ended
    }
}

impl Default for TouchGestureTracker {
    fn default() -> Self {
        Self::new(MultiTouchOptions::default())
    }
}

impl std::fmt::Debug for TouchGestureTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TouchGestureTracker")
            .field("options", &self.options)
            .field("phase", &self.machine.current())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
