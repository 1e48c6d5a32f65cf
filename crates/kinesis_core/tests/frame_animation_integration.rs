//! Integration tests for touch events + FSM + frame-driven animation
//!
//! These tests verify that:
//! - Touch events dispatched to subscribers can drive state machine transitions
//! - State transitions can retarget spring animations
//! - The scheduler and debugger observe the resulting animations frame by frame

use kinesis_animation::{AnimationScheduler, SpringAnimation, SpringConfig};
use kinesis_core::debug::{AnimationDebugger, DebugEventKind};
use kinesis_core::events::{event_types, EventDispatcher, EventType, TouchEvent, TouchPoint};
use kinesis_core::frame::{FrameClock, ManualClock};
use kinesis_core::fsm::{StateMachine, StateTransitions};
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Press {
    Released,
    Pressed,
}

impl StateTransitions for Press {
    fn on_event(&self, event: EventType) -> Option<Self> {
        match (self, event) {
            (Press::Released, event_types::TOUCH_START) => Some(Press::Pressed),
            (Press::Pressed, event_types::TOUCH_END | event_types::TOUCH_CANCEL) => {
                Some(Press::Released)
            }
            _ => None,
        }
    }
}

/// Touch events flow through the dispatcher into a state machine
#[test]
fn test_dispatched_touches_drive_state_machine() {
    let machine = Arc::new(Mutex::new(StateMachine::new(Press::Released)));
    let mut dispatcher: EventDispatcher<TouchEvent> = EventDispatcher::new();

    let m = Arc::clone(&machine);
    dispatcher.subscribe(move |event: &TouchEvent| {
        m.lock().unwrap().send(event.event_type());
    });

    dispatcher.dispatch(&TouchEvent::start(0.0, [TouchPoint::new(1, 5.0, 5.0)]));
    assert!(machine.lock().unwrap().is_in(Press::Pressed));

    // Moves are not transitions
    dispatcher.dispatch(&TouchEvent::moved(8.0, [TouchPoint::new(1, 6.0, 5.0)]));
    assert!(machine.lock().unwrap().is_in(Press::Pressed));

    dispatcher.dispatch(&TouchEvent::end(16.0));
    let machine = machine.lock().unwrap();
    assert!(machine.is_in(Press::Released));
    assert_eq!(machine.history().len(), 2);
}

/// A press retargets a spring that the scheduler then runs to rest
#[test]
fn test_state_change_drives_spring_through_scheduler() {
    let mut machine = StateMachine::new(Press::Released);
    let mut scheduler = AnimationScheduler::new().with_debugger(AnimationDebugger::default());
    let mut clock = ManualClock::new(0.0);

    let latest = Arc::new(Mutex::new(1.0));
    let l = Arc::clone(&latest);

    let pressed = machine.send(event_types::TOUCH_START);
    assert_eq!(pressed, Some(Press::Pressed));

    let target = match machine.current() {
        Press::Pressed => 0.95,
        Press::Released => 1.0,
    };
    let mut scale = SpringAnimation::new(SpringConfig::stiff())
        .with_label("press-scale")
        .on_update(move |values| *l.lock().unwrap() = values["scale"]);
    scale.animate([("scale", 1.0)], [("scale", target)], clock.now_ms());
    scheduler.add(scale);

    while scheduler.has_active_animations() {
        clock.advance(1000.0 / 60.0);
        scheduler.tick_clock(&clock);
        assert!(clock.now_ms() < 5000.0, "spring never settled");
    }
    assert!(scheduler.is_empty());
    assert_eq!(*latest.lock().unwrap(), 0.95);

    let debugger = scheduler.debugger().unwrap();
    assert_eq!(debugger.event_count("press-scale", DebugEventKind::Start), 1);
    assert_eq!(debugger.event_count("press-scale", DebugEventKind::Complete), 1);
    assert!(debugger.metrics().frame_count > 1);
}
