//! Kinesis Gesture State
//!
//! Turns normalized touch events into continuous gesture state:
//!
//! - **Multi-touch tracking**: center, spread, angle, scale, rotation and velocity
//! - **Pinch-zoom**: clamped scale and rotation with optional decaying momentum
//! - **Recognition**: discrete swipe, pan, long press, double tap, pinch and rotate
//!
//! # Example
//!
//! ```rust
//! use kinesis_core::events::{TouchEvent, TouchPoint};
//! use kinesis_gesture::{MultiTouchOptions, TouchGestureTracker};
//!
//! let mut tracker = TouchGestureTracker::new(MultiTouchOptions::default());
//! tracker.handle(&TouchEvent::start(
//!     0.0,
//!     [TouchPoint::new(0, 0.0, 0.0), TouchPoint::new(1, 100.0, 0.0)],
//! ));
//! tracker.handle(&TouchEvent::moved(
//!     16.0,
//!     [TouchPoint::new(0, 0.0, 0.0), TouchPoint::new(1, 200.0, 0.0)],
//! ));
//!
//! assert_eq!(tracker.state().scale, 2.0);
//! ```

pub mod multi_touch;
pub mod pinch_zoom;
pub mod recognition;

pub use multi_touch::{
    GesturePhase, GestureUpdate, MultiTouchEvent, MultiTouchOptions, MultiTouchState,
    TouchGestureTracker, TouchVelocity,
};
pub use pinch_zoom::{
    transform_origin, MomentumPhase, PinchConstraints, PinchEvent, PinchEventKind,
    PinchVelocity, PinchZoomController, PinchZoomOptions, PinchZoomState, Rect,
};
pub use recognition::{
    GestureKind, GestureRecognizer, RecognitionState, Recognized, RecognizedGesture,
    RecognizerOptions, SwipeDirection,
};
