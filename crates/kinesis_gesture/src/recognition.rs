//! Discrete gesture recognition
//!
//! Classifies a touch sequence into swipes, pans, long presses, double taps,
//! pinches and rotations. Time-based gestures are driven by [`GestureRecognizer::tick`]
//! rather than timers, so the recognizer runs on whatever clock feeds it.

use kinesis_core::events::{EventDispatcher, Point, SubscriptionId, TouchEvent, TouchPhase};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::multi_touch::spread;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerOptions {
    pub enable_swipe: bool,
    pub enable_pan: bool,
    pub enable_long_press: bool,
    pub enable_double_tap: bool,
    pub enable_pinch: bool,
    pub enable_rotate: bool,
    /// Pixels
    pub swipe_threshold: f64,
    /// Pixels
    pub pan_threshold: f64,
    pub long_press_ms: f64,
    pub double_tap_ms: f64,
    /// Minimum `|scale - 1|`
    pub pinch_threshold: f64,
    /// Degrees
    pub rotate_threshold: f64,
}

impl Default for RecognizerOptions {
    fn default() -> Self {
        Self {
            enable_swipe: true,
            enable_pan: true,
            enable_long_press: true,
            enable_double_tap: true,
            enable_pinch: true,
            enable_rotate: true,
            swipe_threshold: 50.0,
            pan_threshold: 10.0,
            long_press_ms: 500.0,
            double_tap_ms: 300.0,
            pinch_threshold: 0.1,
            rotate_threshold: 15.0,
        }
    }
}

impl RecognizerOptions {
    /// Only the given gestures enabled, default thresholds
    pub fn only(kinds: &[GestureKind]) -> Self {
        let mut options = Self {
            enable_swipe: false,
            enable_pan: false,
            enable_long_press: false,
            enable_double_tap: false,
            enable_pinch: false,
            enable_rotate: false,
            ..Default::default()
        };
        for kind in kinds {
            match kind {
                GestureKind::Swipe => options.enable_swipe = true,
                GestureKind::Pan => options.enable_pan = true,
                GestureKind::LongPress => options.enable_long_press = true,
                GestureKind::DoubleTap => options.enable_double_tap = true,
                GestureKind::Pinch => options.enable_pinch = true,
                GestureKind::Rotate => options.enable_rotate = true,
            }
        }
        options
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GestureKind {
    Swipe,
    Pan,
    LongPress,
    DoubleTap,
    Pinch,
    Rotate,
}

/// Dominant axis of a swipe; equal axes are diagonal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
    Diagonal,
}

impl SwipeDirection {
    fn from_delta(dx: f64, dy: f64) -> Self {
        let (ax, ay) = (dx.abs(), dy.abs());
        if ax > ay {
            if dx > 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            }
        } else if ay > ax {
            if dy > 0.0 {
                SwipeDirection::Down
            } else {
                SwipeDirection::Up
            }
        } else {
            SwipeDirection::Diagonal
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RecognizedGesture {
    Swipe {
        direction: SwipeDirection,
        distance: f64,
        /// Pixels per millisecond since the touch began
        velocity: f64,
    },
    Pan {
        offset: Point,
        distance: f64,
    },
    LongPress {
        duration_ms: f64,
    },
    DoubleTap {
        interval_ms: f64,
    },
    Pinch {
        scale: f64,
    },
    Rotate {
        /// Degrees
        rotation: f64,
    },
}

impl RecognizedGesture {
    pub fn kind(&self) -> GestureKind {
        match self {
            RecognizedGesture::Swipe { .. } => GestureKind::Swipe,
            RecognizedGesture::Pan { .. } => GestureKind::Pan,
            RecognizedGesture::LongPress { .. } => GestureKind::LongPress,
            RecognizedGesture::DoubleTap { .. } => GestureKind::DoubleTap,
            RecognizedGesture::Pinch { .. } => GestureKind::Pinch,
            RecognizedGesture::Rotate { .. } => GestureKind::Rotate,
        }
    }
}

/// Gestures produced by a single event
pub type Recognized = SmallVec<[RecognizedGesture; 2]>;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecognitionState {
    pub is_recognizing: bool,
    pub current: Option<RecognizedGesture>,
    pub start_time_ms: f64,
    pub start_position: Point,
    pub current_position: Point,
    pub velocity: Point,
    pub distance: f64,
    pub angle: f64,
    pub scale: f64,
    pub rotation: f64,
}

impl Default for RecognitionState {
    fn default() -> Self {
        Self {
            is_recognizing: false,
            current: None,
            start_time_ms: 0.0,
            start_position: Point::ZERO,
            current_position: Point::ZERO,
            velocity: Point::ZERO,
            distance: 0.0,
            angle: 0.0,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

pub struct GestureRecognizer {
    options: RecognizerOptions,
    state: RecognitionState,
    tracking: bool,
    long_press_deadline: Option<f64>,
    last_tap_ms: Option<f64>,
    swiped: bool,
    start_distance: f64,
    start_angle: f64,
    dispatcher: EventDispatcher<RecognizedGesture>,
}

impl GestureRecognizer {
    pub fn new(options: RecognizerOptions) -> Self {
        Self {
            options,
            state: RecognitionState::default(),
            tracking: false,
            long_press_deadline: None,
            last_tap_ms: None,
            swiped: false,
            start_distance: 0.0,
            start_angle: 0.0,
            dispatcher: EventDispatcher::new(),
        }
    }

    pub fn options(&self) -> &RecognizerOptions {
        &self.options
    }

    pub fn state(&self) -> &RecognitionState {
        &self.state
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&RecognizedGesture) + Send + 'static,
    {
        self.dispatcher.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.dispatcher.unsubscribe(id)
    }

    /// Classify one touch event
    pub fn handle(&mut self, event: &TouchEvent) -> Recognized {
        let mut out = Recognized::new();
        match event.phase {
            TouchPhase::Start => self.begin(event, &mut out),
            TouchPhase::Move => self.update(event, &mut out),
            TouchPhase::End | TouchPhase::Cancel => self.end(),
        }
        self.publish(&out);
        out
    }

    /// Fire time-based gestures that are due at `now_ms`
    pub fn tick(&mut self, now_ms: f64) -> Recognized {
        let mut out = Recognized::new();
        if let Some(deadline) = self.long_press_deadline {
            if self.tracking && now_ms >= deadline {
                self.long_press_deadline = None;
                out.push(RecognizedGesture::LongPress {
                    duration_ms: now_ms - self.state.start_time_ms,
                });
            }
        }
        self.publish(&out);
        out
    }

    pub fn reset(&mut self) {
        self.state = RecognitionState::default();
        self.tracking = false;
        self.long_press_deadline = None;
        self.last_tap_ms = None;
        self.swiped = false;
        self.start_distance = 0.0;
        self.start_angle = 0.0;
    }

    fn publish(&mut self, gestures: &Recognized) {
        for gesture in gestures {
            tracing::debug!(?gesture, "gesture recognized");
            self.state.current = Some(*gesture);
            self.state.is_recognizing = true;
            self.dispatcher.dispatch(gesture);
        }
    }

    fn begin(&mut self, event: &TouchEvent, out: &mut Recognized) {
        let ts = event.timestamp_ms;
        let point = event
            .touches
            .first()
            .map(|t| t.position())
            .unwrap_or(Point::ZERO);

        self.tracking = true;
        self.swiped = false;
        self.state.start_time_ms = ts;
        self.state.start_position = point;
        self.state.current_position = point;
        self.state.velocity = Point::ZERO;
        self.state.distance = 0.0;
        self.state.scale = 1.0;
        self.state.rotation = 0.0;
        let (distance, angle) = spread(&event.touches).unwrap_or((0.0, 0.0));
        self.start_distance = distance;
        self.start_angle = angle;

        self.long_press_deadline = self
            .options
            .enable_long_press
            .then(|| ts + self.options.long_press_ms);

        if self.options.enable_double_tap {
            match self.last_tap_ms {
                Some(last) if ts - last < self.options.double_tap_ms => {
                    out.push(RecognizedGesture::DoubleTap {
                        interval_ms: ts - last,
                    });
                    self.last_tap_ms = None;
                }
                _ => self.last_tap_ms = Some(ts),
            }
        }
    }

    fn update(&mut self, event: &TouchEvent, out: &mut Recognized) {
        if !self.tracking {
            return;
        }
        let Some(first) = event.touches.first() else {
            return;
        };

        let point = first.position();
        let start = self.state.start_position;
        let (dx, dy) = (point.x - start.x, point.y - start.y);
        let elapsed = event.timestamp_ms - self.state.start_time_ms;

        self.state.current_position = point;
        if elapsed > 0.0 {
            self.state.velocity = Point::new(dx / elapsed, dy / elapsed);
        }
        self.state.distance = start.distance_to(point);
        self.state.angle = start.angle_to(point);

        let distance = self.state.distance;
        if distance > self.options.pan_threshold {
            // Moving contacts are not held still
            self.long_press_deadline = None;
        }

        if self.options.enable_swipe && !self.swiped && distance > self.options.swipe_threshold {
            self.swiped = true;
            let velocity = self.state.velocity;
            out.push(RecognizedGesture::Swipe {
                direction: SwipeDirection::from_delta(dx, dy),
                distance,
                velocity: (velocity.x * velocity.x + velocity.y * velocity.y).sqrt(),
            });
        }

        if self.options.enable_pan && distance > self.options.pan_threshold {
            out.push(RecognizedGesture::Pan {
                offset: Point::new(dx, dy),
                distance,
            });
        }

        if let Some((spread_distance, spread_angle)) = spread(&event.touches) {
            self.update_pair(spread_distance, spread_angle, out);
        }
    }

    fn update_pair(&mut self, distance: f64, angle: f64, out: &mut Recognized) {
        // A second finger that lands mid-gesture anchors on its first move
        if self.start_distance == 0.0 {
            self.start_distance = distance;
            self.start_angle = angle;
            return;
        }

        let scale = distance / self.start_distance;
        let rotation = angle - self.start_angle;
        self.state.scale = scale;
        self.state.rotation = rotation;

        if self.options.enable_pinch && (scale - 1.0).abs() > self.options.pinch_threshold {
            out.push(RecognizedGesture::Pinch { scale });
        }
        if self.options.enable_rotate && rotation.abs() > self.options.rotate_threshold {
            out.push(RecognizedGesture::Rotate { rotation });
        }
    }

    fn end(&mut self) {
        self.tracking = false;
        self.state.is_recognizing = false;
        self.long_press_deadline = None;
        self.start_distance = 0.0;
        self.start_angle = 0.0;
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(RecognizerOptions::default())
    }
}

impl std::fmt::Debug for GestureRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureRecognizer")
            .field("options", &self.options)
            .field("state", &self.state)
            .field("tracking", &self.tracking)
            .finish_non_exhaustive()
    }
}
