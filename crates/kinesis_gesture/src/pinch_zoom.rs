//! Pinch-zoom controller
//!
//! Maps a two-finger gesture onto a clamped scale and rotation. When momentum
//! is enabled, releasing the gesture hands the last velocity to a decay loop
//! that runs one step per frame:
//!
//! ```text
//! Idle --TOUCH_END--> Released --MOMENTUM_START--> Decaying --SETTLED--> Settled
//!                        |                                                 ^
//!                        +------------------------SETTLED-----------------+
//! Released | Decaying | Settled --TOUCH_START--> Idle
//! ```

use crate::multi_touch::{GestureUpdate, MultiTouchOptions, TouchGestureTracker};
use kinesis_core::events::{
    event_types, EventDispatcher, EventType, Point, SubscriptionId, TouchEvent,
};
use kinesis_core::frame::{FrameDriven, FrameStatus};
use kinesis_core::fsm::{StateMachine, StateTransitions};
use serde::{Deserialize, Serialize};

/// Momentum stops once both velocity magnitudes fall below this
const SETTLE_THRESHOLD: f64 = 0.001;

/// Nominal frame length used to turn per-move deltas into velocities
const FRAME_MS: f64 = 16.0;

/// Upper bound on the decay factor so momentum always settles
const MAX_MOMENTUM_DECAY: f64 = 0.99;

/// Extra bounds applied after the option clamp
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchConstraints {
    pub min_scale: Option<f64>,
    pub max_scale: Option<f64>,
    pub min_rotation: Option<f64>,
    pub max_rotation: Option<f64>,
}

impl PinchConstraints {
    fn constrain(&self, scale: f64, rotation: f64) -> (f64, f64) {
        let mut scale = scale;
        let mut rotation = rotation;
        if let Some(min) = self.min_scale {
            scale = scale.max(min);
        }
        if let Some(max) = self.max_scale {
            scale = scale.min(max);
        }
        if let Some(min) = self.min_rotation {
            rotation = rotation.max(min);
        }
        if let Some(max) = self.max_rotation {
            rotation = rotation.min(max);
        }
        (scale, rotation)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchZoomOptions {
    pub initial_scale: f64,
    /// Degrees
    pub initial_rotation: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub momentum: bool,
    /// Velocity multiplier applied after every momentum step, see [`Self::decay`]
    pub momentum_decay: f64,
    pub constraints: Option<PinchConstraints>,
}

impl Default for PinchZoomOptions {
    fn default() -> Self {
        Self {
            initial_scale: 1.0,
            initial_rotation: 0.0,
            min_scale: 0.1,
            max_scale: 10.0,
            momentum: false,
            momentum_decay: 0.95,
            constraints: None,
        }
    }
}

impl PinchZoomOptions {
    pub fn with_scale_range(mut self, min_scale: f64, max_scale: f64) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    /// Enable momentum. `decay` is used through [`Self::decay`], so values
    /// outside `[0, 0.99]` are clamped and non-finite values stop momentum at once.
    pub fn with_momentum(mut self, decay: f64) -> Self {
        self.momentum = true;
        self.momentum_decay = decay;
        self
    }

    pub fn with_constraints(mut self, constraints: PinchConstraints) -> Self {
        self.constraints = Some(constraints);
        self
    }

    /// Effective per-frame decay factor
    pub fn decay(&self) -> f64 {
        if self.momentum_decay.is_finite() {
            self.momentum_decay.clamp(0.0, MAX_MOMENTUM_DECAY)
        } else {
            0.0
        }
    }

    /// Clamp into `[min_scale, max_scale]`; `min_scale` wins if the range is inverted
    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.min(self.max_scale).max(self.min_scale)
    }

    fn bound(&self, scale: f64, rotation: f64) -> (f64, f64) {
        let (scale, rotation) = match &self.constraints {
            Some(constraints) => constraints.constrain(scale, rotation),
            None => (scale, rotation),
        };
        (self.clamp_scale(scale), rotation)
    }
}

/// Per-frame scale and rotation velocity
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PinchVelocity {
    pub scale: f64,
    pub rotation: f64,
}

impl PinchVelocity {
    pub fn is_settled(&self) -> bool {
        self.scale.abs() < SETTLE_THRESHOLD && self.rotation.abs() < SETTLE_THRESHOLD
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PinchZoomState {
    pub is_active: bool,
    pub scale: f64,
    pub rotation: f64,
    pub center: Point,
    pub velocity: PinchVelocity,
    pub initial_scale: f64,
    pub initial_rotation: f64,
}

impl PinchZoomState {
    /// Resting state for `options`; the seeded scale and rotation are already bounded
    fn from_options(options: &PinchZoomOptions) -> Self {
        let (scale, rotation) = options.bound(options.initial_scale, options.initial_rotation);
        Self {
            is_active: false,
            scale,
            rotation,
            center: Point::ZERO,
            velocity: PinchVelocity::default(),
            initial_scale: scale,
            initial_rotation: rotation,
        }
    }
}

/// Momentum phase after release
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MomentumPhase {
    #[default]
    Idle,
    Released,
    Decaying,
    Settled,
}

impl StateTransitions for MomentumPhase {
    fn on_event(&self, event: EventType) -> Option<Self> {
        use event_types::*;
        use MomentumPhase::*;
        match (self, event) {
            (Idle | Settled, TOUCH_END) => Some(Released),
            (Released, MOMENTUM_START) => Some(Decaying),
            (Released | Decaying, SETTLED) => Some(Settled),
            (Released | Decaying | Settled, TOUCH_START) => Some(Idle),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinchEventKind {
    Start,
    Move,
    End,
    /// One decay step after release
    Momentum,
    Settled,
}

/// Delivered to pinch subscribers
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchEvent {
    pub kind: PinchEventKind,
    pub timestamp_ms: f64,
    pub state: PinchZoomState,
}

/// Element bounds in client coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// Gesture center as a transform origin in percent of the element's bounds.
/// Degenerate axes map to 50%.
pub fn transform_origin(center: Point, rect: Rect) -> Point {
    let axis = |value: f64, start: f64, length: f64| {
        if length > 0.0 {
            (value - start) / length * 100.0
        } else {
            50.0
        }
    };
    Point::new(
        axis(center.x, rect.left, rect.width),
        axis(center.y, rect.top, rect.height),
    )
}

/// Two-finger pinch and rotate with optional momentum
pub struct PinchZoomController {
    options: PinchZoomOptions,
    tracker: TouchGestureTracker,
    state: PinchZoomState,
    momentum: StateMachine<MomentumPhase>,
    dispatcher: EventDispatcher<PinchEvent>,
}

impl PinchZoomController {
    pub fn new(options: PinchZoomOptions) -> Self {
        Self {
            tracker: TouchGestureTracker::new(MultiTouchOptions::new(2, 2)),
            state: PinchZoomState::from_options(&options),
            momentum: StateMachine::new(MomentumPhase::Idle),
            dispatcher: EventDispatcher::new(),
            options,
        }
    }

    pub fn options(&self) -> &PinchZoomOptions {
        &self.options
    }

    pub fn state(&self) -> &PinchZoomState {
        &self.state
    }

    pub fn tracker(&self) -> &TouchGestureTracker {
        &self.tracker
    }

    pub fn momentum_phase(&self) -> MomentumPhase {
        self.momentum.current()
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&PinchEvent) + Send + 'static,
    {
        self.dispatcher.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    /// Feed one touch event; only exactly-two-contact gestures are tracked
    pub fn handle(&mut self, event: &TouchEvent) -> GestureUpdate {
        let update = self.tracker.handle(event);
        match update {
            GestureUpdate::Started => self.begin(event.timestamp_ms),
            GestureUpdate::Moved => self.update(event.timestamp_ms),
            GestureUpdate::Ended => self.release(event.timestamp_ms),
            GestureUpdate::Ignored => {}
        }
        update
    }

    /// Restore the initial scale and rotation and stop any momentum
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.momentum.reset();
        self.state.is_active = false;
        self.state = PinchZoomState {
            center: self.state.center,
            ..PinchZoomState::from_options(&self.options)
        };
    }

    /// Current center as a percentage origin inside `rect`
    pub fn transform_origin(&self, rect: Rect) -> Point {
        transform_origin(self.state.center, rect)
    }

    fn emit(&mut self, kind: PinchEventKind, timestamp_ms: f64) {
        self.dispatcher.dispatch(&PinchEvent {
            kind,
            timestamp_ms,
            state: self.state,
        });
    }

    fn begin(&mut self, timestamp_ms: f64) {
        if self.momentum.send(event_types::TOUCH_START).is_some() {
            tracing::debug!("pinch momentum interrupted by new gesture");
        }
        self.state = PinchZoomState {
            is_active: true,
            center: self.tracker.state().center,
            ..PinchZoomState::from_options(&self.options)
        };
        self.emit(PinchEventKind::Start, timestamp_ms);
    }

    fn update(&mut self, timestamp_ms: f64) {
        let touch = self.tracker.state();
        let raw_scale = self.options.clamp_scale(self.state.initial_scale * touch.scale);
        let raw_rotation = self.state.initial_rotation + touch.rotation;
        let (scale, rotation) = self.options.bound(raw_scale, raw_rotation);

        self.state.velocity = PinchVelocity {
            scale: (scale - self.state.scale) / FRAME_MS,
            rotation: (rotation - self.state.rotation) / FRAME_MS,
        };
        self.state.scale = scale;
        self.state.rotation = rotation;
        self.state.center = touch.center;
        self.emit(PinchEventKind::Move, timestamp_ms);
    }

    fn release(&mut self, timestamp_ms: f64) {
        self.state.is_active = false;
        if self.options.momentum && self.momentum.send(event_types::TOUCH_END).is_some() {
            tracing::debug!(
                scale_velocity = self.state.velocity.scale,
                rotation_velocity = self.state.velocity.rotation,
                "pinch released with momentum"
            );
            if self.state.velocity.is_settled() {
                self.momentum.send(event_types::SETTLED);
            }
        } else {
            self.state.velocity = PinchVelocity::default();
        }
        self.emit(PinchEventKind::End, timestamp_ms);
    }

    fn momentum_step(&mut self, now_ms: f64) -> FrameStatus {
        let velocity = self.state.velocity;
        let (scale, rotation) = self
            .options
            .bound(self.state.scale + velocity.scale, self.state.rotation + velocity.rotation);
        self.state.scale = scale;
        self.state.rotation = rotation;
        let decay = self.options.decay();
        self.state.velocity = PinchVelocity {
            scale: velocity.scale * decay,
            rotation: velocity.rotation * decay,
        };
        self.emit(PinchEventKind::Momentum, now_ms);

        if !self.state.velocity.is_settled() {
            return FrameStatus::Continue;
        }
        self.momentum.send(event_types::SETTLED);
        self.state.velocity = PinchVelocity::default();
        tracing::debug!(scale, rotation, "pinch momentum settled");
        self.emit(PinchEventKind::Settled, now_ms);
        FrameStatus::Done
    }
}

impl FrameDriven for PinchZoomController {
    fn on_frame(&mut self, now_ms: f64) -> FrameStatus {
        match self.momentum.current() {
            MomentumPhase::Released => {
                self.momentum.send(event_types::MOMENTUM_START);
                self.momentum_step(now_ms)
            }
            MomentumPhase::Decaying => self.momentum_step(now_ms),
            MomentumPhase::Idle | MomentumPhase::Settled => FrameStatus::Done,
        }
    }

    fn cancel(&mut self) {
        self.momentum.reset();
        self.state.velocity = PinchVelocity::default();
    }

    fn is_active(&self) -> bool {
        matches!(
            self.momentum.current(),
            MomentumPhase::Released | MomentumPhase::Decaying
        )
    }

    fn label(&self) -> &str {
        "pinch-zoom"
    }
}

impl Default for PinchZoomController {
    fn default() -> Self {
        Self::new(PinchZoomOptions::default())
    }
}

impl std::fmt::Debug for PinchZoomController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinchZoomController")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("momentum", &self.momentum.current())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinesis_core::events::TouchPoint;
    use std::sync::{Arc, Mutex};

    fn pair(bx: f64, by: f64) -> [TouchPoint; 2] {
        [TouchPoint::new(0, 0.0, 0.0), TouchPoint::new(1, bx, by)]
    }

    fn run_momentum(controller: &mut PinchZoomController, mut check: impl FnMut(&PinchZoomState)) -> usize {
        let mut frames = 0;
        let mut now = 100.0;
        while controller.on_frame(now) == FrameStatus::Continue {
            check(controller.state());
            frames += 1;
            now += FRAME_MS;
            assert!(frames < 10_000, "momentum never settled");
        }
        check(controller.state());
        frames
    }

    #[test]
    fn test_scale_clamped_on_move() {
        let options = PinchZoomOptions::default().with_scale_range(0.5, 3.0);
        let mut controller = PinchZoomController::new(options);

        controller.handle(&TouchEvent::start(0.0, pair(100.0, 0.0)));
        assert!(controller.state().is_active);
        assert_eq!(controller.state().scale, 1.0);

        controller.handle(&TouchEvent::moved(16.0, pair(1000.0, 0.0)));
        assert_eq!(controller.state().scale, 3.0);

        controller.handle(&TouchEvent::moved(32.0, pair(10.0, 0.0)));
        assert_eq!(controller.state().scale, 0.5);
    }

    #[test]
    fn test_out_of_range_initial_scale_is_clamped() {
        let options = PinchZoomOptions {
            initial_scale: 5.0,
            ..PinchZoomOptions::default().with_scale_range(0.5, 3.0)
        };
        let mut controller = PinchZoomController::new(options);
        assert_eq!(controller.state().scale, 3.0);

        controller.handle(&TouchEvent::start(0.0, pair(100.0, 0.0)));
        assert_eq!(controller.state().scale, 3.0);

        // Pinching in is relative to the visible scale
        controller.handle(&TouchEvent::moved(16.0, pair(50.0, 0.0)));
        assert_eq!(controller.state().scale, 1.5);

        controller.reset();
        assert_eq!(controller.state().scale, 3.0);
        assert_eq!(controller.state().initial_scale, 3.0);
    }

    #[test]
    fn test_unit_decay_still_settles() {
        let mut controller =
            PinchZoomController::new(PinchZoomOptions::default().with_momentum(1.0));
        assert_eq!(controller.options().decay(), MAX_MOMENTUM_DECAY);

        controller.handle(&TouchEvent::start(0.0, pair(100.0, 0.0)));
        controller.handle(&TouchEvent::moved(16.0, pair(300.0, 0.0)));
        controller.handle(&TouchEvent::end(32.0));

        run_momentum(&mut controller, |state| assert!(state.scale <= 10.0));
        assert_eq!(controller.momentum_phase(), MomentumPhase::Settled);
    }

    #[test]
    fn test_degenerate_decay_values() {
        let options = PinchZoomOptions::default().with_momentum(-0.5);
        assert_eq!(options.decay(), 0.0);
        let options = PinchZoomOptions::default().with_momentum(f64::NAN);
        assert_eq!(options.decay(), 0.0);
    }

    #[test]
    fn test_single_contact_is_not_a_pinch() {
        let mut controller = PinchZoomController::default();
        let update = controller.handle(&TouchEvent::start(0.0, [TouchPoint::new(0, 1.0, 1.0)]));
        assert_eq!(update, GestureUpdate::Ignored);
        assert!(!controller.state().is_active);
    }

    #[test]
    fn test_initial_values_seed_the_gesture() {
        let options = PinchZoomOptions {
            initial_scale: 2.0,
            initial_rotation: 10.0,
            ..Default::default()
        };
        let mut controller = PinchZoomController::new(options);
        controller.handle(&TouchEvent::start(0.0, pair(100.0, 0.0)));
        controller.handle(&TouchEvent::moved(16.0, pair(150.0, 0.0)));

        let state = controller.state();
        assert_eq!(state.scale, 3.0);
        assert_eq!(state.rotation, 10.0);
        assert_eq!(state.center, Point::new(75.0, 0.0));
        assert_eq!(state.velocity.scale, 1.0 / FRAME_MS);
    }

    #[test]
    fn test_rotation_constraints() {
        let constraints = PinchConstraints {
            max_rotation: Some(30.0),
            max_scale: Some(2.0),
            ..Default::default()
        };
        let mut controller =
            PinchZoomController::new(PinchZoomOptions::default().with_constraints(constraints));
        controller.handle(&TouchEvent::start(0.0, pair(100.0, 0.0)));
        controller.handle(&TouchEvent::moved(16.0, pair(0.0, 500.0)));

        assert_eq!(controller.state().rotation, 30.0);
        assert_eq!(controller.state().scale, 2.0);
    }

    #[test]
    fn test_momentum_stays_within_bounds() {
        let options = PinchZoomOptions::default()
            .with_scale_range(0.5, 3.0)
            .with_momentum(0.95);
        let mut controller = PinchZoomController::new(options);

        controller.handle(&TouchEvent::start(0.0, pair(100.0, 0.0)));
        controller.handle(&TouchEvent::moved(16.0, pair(290.0, 0.0)));
        controller.handle(&TouchEvent::end(32.0));
        assert_eq!(controller.momentum_phase(), MomentumPhase::Released);
        assert!(controller.is_active());

        let frames = run_momentum(&mut controller, |state| {
            assert!(state.scale >= 0.5 && state.scale <= 3.0);
        });
        assert!(frames > 50);
        assert_eq!(controller.state().scale, 3.0);
        assert_eq!(controller.momentum_phase(), MomentumPhase::Settled);
        assert!(!controller.is_active());
    }

    #[test]
    fn test_momentum_carries_and_decays() {
        let mut controller =
            PinchZoomController::new(PinchZoomOptions::default().with_momentum(0.95));
        controller.handle(&TouchEvent::start(0.0, pair(100.0, 0.0)));
        controller.handle(&TouchEvent::moved(16.0, pair(150.0, 0.0)));
        controller.handle(&TouchEvent::end(32.0));

        let release_velocity = 0.5 / FRAME_MS;
        let mut last = 1.5;
        run_momentum(&mut controller, |state| {
            assert!(state.scale >= last);
            last = state.scale;
        });

        // Geometric series bound: v / (1 - decay)
        let scale = controller.state().scale;
        assert!(scale > 1.5);
        assert!(scale < 1.5 + release_velocity / 0.05);
        assert_eq!(controller.state().velocity, PinchVelocity::default());
    }

    #[test]
    fn test_slow_release_settles_immediately() {
        let mut controller =
            PinchZoomController::new(PinchZoomOptions::default().with_momentum(0.95));
        controller.handle(&TouchEvent::start(0.0, pair(100.0, 0.0)));
        controller.handle(&TouchEvent::moved(16.0, pair(101.0, 0.0)));
        controller.handle(&TouchEvent::end(32.0));

        assert_eq!(controller.momentum_phase(), MomentumPhase::Settled);
        assert_eq!(controller.on_frame(48.0), FrameStatus::Done);
        assert_eq!(controller.state().scale, 1.01);
    }

    #[test]
    fn test_release_without_momentum_stops() {
        let mut controller = PinchZoomController::default();
        controller.handle(&TouchEvent::start(0.0, pair(100.0, 0.0)));
        controller.handle(&TouchEvent::moved(16.0, pair(200.0, 0.0)));
        controller.handle(&TouchEvent::end(32.0));

        assert_eq!(controller.momentum_phase(), MomentumPhase::Idle);
        assert_eq!(controller.state().velocity, PinchVelocity::default());
        assert_eq!(controller.on_frame(48.0), FrameStatus::Done);
        assert_eq!(controller.state().scale, 2.0);
    }

    #[test]
    fn test_new_gesture_interrupts_momentum() {
        let mut controller =
            PinchZoomController::new(PinchZoomOptions::default().with_momentum(0.95));
        controller.handle(&TouchEvent::start(0.0, pair(100.0, 0.0)));
        controller.handle(&TouchEvent::moved(16.0, pair(200.0, 0.0)));
        controller.handle(&TouchEvent::end(32.0));
        controller.on_frame(48.0);
        assert_eq!(controller.momentum_phase(), MomentumPhase::Decaying);

        controller.handle(&TouchEvent::start(64.0, pair(100.0, 0.0)));
        assert_eq!(controller.momentum_phase(), MomentumPhase::Idle);
        assert!(!controller.is_active());
        assert_eq!(controller.state().scale, 1.0);
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let options = PinchZoomOptions {
            initial_scale: 1.5,
            initial_rotation: 45.0,
            ..PinchZoomOptions::default().with_momentum(0.9)
        };
        let mut controller = PinchZoomController::new(options);
        controller.handle(&TouchEvent::start(0.0, pair(100.0, 0.0)));
        controller.handle(&TouchEvent::moved(16.0, pair(0.0, 300.0)));
        controller.handle(&TouchEvent::end(32.0));
        controller.reset();

        let state = controller.state();
        assert!(!state.is_active);
        assert_eq!(state.scale, 1.5);
        assert_eq!(state.rotation, 45.0);
        assert_eq!(controller.momentum_phase(), MomentumPhase::Idle);
        assert_eq!(controller.on_frame(48.0), FrameStatus::Done);
    }

    #[test]
    fn test_cancel_stops_momentum() {
        let mut controller =
            PinchZoomController::new(PinchZoomOptions::default().with_momentum(0.95));
        controller.handle(&TouchEvent::start(0.0, pair(100.0, 0.0)));
        controller.handle(&TouchEvent::moved(16.0, pair(200.0, 0.0)));
        controller.handle(&TouchEvent::end(32.0));
        controller.cancel();

        assert!(!controller.is_active());
        assert_eq!(controller.on_frame(48.0), FrameStatus::Done);
        assert_eq!(controller.state().scale, 2.0);
    }

    #[test]
    fn test_subscribers_see_lifecycle() {
        let mut controller =
            PinchZoomController::new(PinchZoomOptions::default().with_momentum(0.5));
        let kinds = Arc::new(Mutex::new(Vec::new()));
        let k = Arc::clone(&kinds);
        controller.subscribe(move |event| k.lock().unwrap().push(event.kind));

        controller.handle(&TouchEvent::start(0.0, pair(100.0, 0.0)));
        controller.handle(&TouchEvent::moved(16.0, pair(120.0, 0.0)));
        controller.handle(&TouchEvent::end(32.0));
        run_momentum(&mut controller, |_| {});

        let kinds = kinds.lock().unwrap();
        assert_eq!(
            &kinds[..3],
            &[PinchEventKind::Start, PinchEventKind::Move, PinchEventKind::End]
        );
        assert_eq!(kinds.last(), Some(&PinchEventKind::Settled));
        assert!(kinds[3..kinds.len() - 1]
            .iter()
            .all(|kind| *kind == PinchEventKind::Momentum));
    }

    #[test]
    fn test_transform_origin_percentages() {
        let rect = Rect::new(100.0, 0.0, 200.0, 100.0);
        assert_eq!(
            transform_origin(Point::new(150.0, 50.0), rect),
            Point::new(25.0, 50.0)
        );
        assert_eq!(
            transform_origin(Point::new(150.0, 50.0), Rect::new(0.0, 0.0, 0.0, 0.0)),
            Point::new(50.0, 50.0)
        );
    }

    #[test]
    fn test_options_from_json() {
        let options: PinchZoomOptions = serde_json::from_str(
            r#"{"max_scale": 4.0, "momentum": true, "constraints": {"min_rotation": -15.0}}"#,
        )
        .unwrap();
        assert_eq!(options.min_scale, 0.1);
        assert_eq!(options.max_scale, 4.0);
        assert!(options.momentum);
        assert_eq!(options.momentum_decay, 0.95);
        assert_eq!(options.constraints.unwrap().min_rotation, Some(-15.0));
    }
}
