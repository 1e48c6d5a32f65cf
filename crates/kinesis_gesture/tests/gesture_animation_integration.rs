//! Integration tests for gesture state feeding the animation scheduler
//!
//! These tests verify that:
//! - A released pinch hands its momentum to the scheduler and is dropped once settled
//! - Tracker state can seed a spring that snaps a gesture back into range

use kinesis_animation::{AnimationScheduler, SpringAnimation, SpringConfig};
use kinesis_core::debug::{AnimationDebugger, DebugEventKind};
use kinesis_core::events::{TouchEvent, TouchPoint};
use kinesis_core::frame::{FrameClock, ManualClock};
use kinesis_gesture::{
    GestureUpdate, MultiTouchOptions, PinchEventKind, PinchZoomController, PinchZoomOptions,
    TouchGestureTracker,
};
use std::sync::{Arc, Mutex};

const FRAME_MS: f64 = 1000.0 / 60.0;

fn pair(bx: f64) -> [TouchPoint; 2] {
    [TouchPoint::new(0, 0.0, 0.0), TouchPoint::new(1, bx, 0.0)]
}

#[test]
fn test_pinch_momentum_runs_under_scheduler() {
    let options = PinchZoomOptions::default()
        .with_scale_range(0.5, 3.0)
        .with_momentum(0.9);
    let mut pinch = PinchZoomController::new(options);

    let scales = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&scales);
    pinch.subscribe(move |event| {
        if event.kind == PinchEventKind::Momentum {
            s.lock().unwrap().push(event.state.scale);
        }
    });

    pinch.handle(&TouchEvent::start(0.0, pair(100.0)));
    pinch.handle(&TouchEvent::moved(16.0, pair(180.0)));
    pinch.handle(&TouchEvent::end(32.0));

    let mut scheduler = AnimationScheduler::new().with_debugger(AnimationDebugger::default());
    let mut clock = ManualClock::new(32.0);
    scheduler.add(pinch);

    while !scheduler.is_empty() {
        clock.advance(FRAME_MS);
        scheduler.tick_clock(&clock);
        assert!(clock.now_ms() < 10_000.0, "momentum never settled");
    }

    let scales = scales.lock().unwrap();
    assert!(!scales.is_empty());
    assert!(scales.windows(2).all(|w| w[1] >= w[0]));
    assert!(scales.iter().all(|scale| (0.5..=3.0).contains(scale)));
    assert!(scales[0] > 1.8);

    let debugger = scheduler.debugger().unwrap();
    assert_eq!(debugger.event_count("pinch-zoom", DebugEventKind::Complete), 1);
}

#[test]
fn test_released_overscale_springs_back() {
    let mut tracker = TouchGestureTracker::new(MultiTouchOptions::new(2, 2));
    tracker.handle(&TouchEvent::start(0.0, pair(100.0)));
    tracker.handle(&TouchEvent::moved(16.0, pair(250.0)));
    let released_scale = tracker.state().scale;
    assert_eq!(tracker.handle(&TouchEvent::end(32.0)), GestureUpdate::Ended);
    assert_eq!(released_scale, 2.5);

    let target = released_scale.clamp(1.0, 2.0);
    let latest = Arc::new(Mutex::new(released_scale));
    let l = Arc::clone(&latest);
    let mut snap = SpringAnimation::new(SpringConfig::stiff())
        .with_label("snap-back")
        .on_update(move |values| *l.lock().unwrap() = values["scale"]);
    let mut clock = ManualClock::new(32.0);
    snap.animate([("scale", released_scale)], [("scale", target)], clock.now_ms());

    let mut scheduler = AnimationScheduler::new();
    scheduler.add(snap);
    while scheduler.has_active_animations() {
        clock.advance(FRAME_MS);
        scheduler.tick_clock(&clock);
        assert!(clock.now_ms() < 5000.0, "spring never settled");
    }

    assert_eq!(*latest.lock().unwrap(), 2.0);
}
