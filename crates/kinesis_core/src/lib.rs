//! Kinesis Core Runtime
//!
//! This crate provides the foundational primitives shared by the Kinesis
//! animation and gesture crates:
//!
//! - **Touch Events**: Normalized touch points and an explicit subscription dispatcher
//! - **State Machines**: Typed state machines for gesture and momentum phases
//! - **Frame Clocks**: The per-frame driving contract and cooperative cancellation
//! - **Debugging**: An explicitly constructed animation debugger context
//!
//! # Example
//!
//! ```rust
//! use kinesis_core::events::{EventDispatcher, TouchEvent, TouchPoint};
//! use std::sync::{Arc, Mutex};
//!
//! let mut dispatcher: EventDispatcher<TouchEvent> = EventDispatcher::new();
//! let seen = Arc::new(Mutex::new(0usize));
//! let seen_clone = seen.clone();
//!
//! let id = dispatcher.subscribe(move |event: &TouchEvent| {
//!     *seen_clone.lock().unwrap() += event.touches.len();
//! });
//!
//! dispatcher.dispatch(&TouchEvent::start(0.0, [TouchPoint::new(0, 10.0, 20.0)]));
//! dispatcher.unsubscribe(id);
//! dispatcher.dispatch(&TouchEvent::end(16.0));
//!
//! assert_eq!(*seen.lock().unwrap(), 1);
//! ```

pub mod debug;
pub mod events;
pub mod frame;
pub mod fsm;

pub use debug::{AnimationDebugger, DebugEventKind, DebugOptions, PerformanceMetrics};
pub use events::{EventDispatcher, EventType, Point, SubscriptionId, TouchEvent, TouchPhase, TouchPoint};
pub use frame::{FrameClock, FrameDriven, FrameStatus, ManualClock, SystemClock};
pub use fsm::{StateMachine, StateTransitions};
