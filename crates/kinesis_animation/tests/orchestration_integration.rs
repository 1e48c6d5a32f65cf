//! Integration tests for orchestration driving per-element animations
//!
//! A stagger or timeline decides *when* things start; springs and keyframes
//! decide *how* they move. Both run under one scheduler and one clock.

use kinesis_animation::{
    AnimationScheduler, Easing, KeyframeAnimation, KeyframeConfig, KeyframeEasing,
    KeyframeOptions, SpringAnimation, SpringConfig, StaggerConfig, StaggerDirection,
    StaggerScheduler, TimelineConfig, TimelineScheduler, TimelineSegment,
};
use kinesis_core::frame::{FrameClock, FrameDriven, FrameStatus, ManualClock};
use std::sync::{Arc, Mutex};

const FRAME_MS: f64 = 1000.0 / 60.0;

#[test]
fn test_stagger_activates_springs_in_reverse_order() {
    let due = Arc::new(Mutex::new(Vec::new()));
    let d = Arc::clone(&due);
    let mut stagger = StaggerScheduler::new(
        5,
        StaggerConfig::new(0.1).with_direction(StaggerDirection::Reverse),
    )
    .on_activate(move |index, _| d.lock().unwrap().push(index));

    let finished = Arc::new(Mutex::new(Vec::new()));
    let mut scheduler = AnimationScheduler::new();
    let mut clock = ManualClock::new(0.0);

    stagger.start(clock.now_ms());
    loop {
        let status = stagger.on_frame(clock.now_ms());

        for index in due.lock().unwrap().drain(..) {
            let f = Arc::clone(&finished);
            let mut spring = SpringAnimation::new(SpringConfig::fast())
                .with_label(format!("item-{index}"))
                .on_complete(move || f.lock().unwrap().push(index));
            spring.animate([("y", 20.0)], [("y", 0.0)], clock.now_ms());
            scheduler.add(spring);
        }
        scheduler.tick(clock.now_ms());

        if status == FrameStatus::Done && scheduler.is_empty() {
            break;
        }
        clock.advance(FRAME_MS);
        assert!(clock.now_ms() < 10_000.0);
    }

    // Identical springs started in reverse order settle in reverse order
    assert_eq!(*finished.lock().unwrap(), vec![4, 3, 2, 1, 0]);
}

#[test]
fn test_timeline_segments_start_keyframes() {
    let config = TimelineConfig {
        duration: 600.0,
        segments: vec![
            TimelineSegment::at(0.0).with_label("fade"),
            TimelineSegment::at(300.0).with_label("slide"),
        ],
        ..Default::default()
    };

    let entered = Arc::new(Mutex::new(Vec::new()));
    let e = Arc::clone(&entered);
    let mut timeline = TimelineScheduler::new(config).on_segment(move |_, segment| {
        e.lock()
            .unwrap()
            .push(segment.label.clone().unwrap_or_default())
    });

    let mut scheduler = AnimationScheduler::new();
    let mut clock = ManualClock::new(0.0);
    let opacity = Arc::new(Mutex::new(Vec::new()));

    timeline.play(0.0);
    while timeline.is_active() || !scheduler.is_empty() {
        timeline.on_frame(clock.now_ms());

        for label in entered.lock().unwrap().drain(..) {
            let keyframes = KeyframeConfig::new().property(label.as_str(), [0.0, 1.0]);
            let options = KeyframeOptions {
                duration_ms: 200.0,
                easing: Some(KeyframeEasing::Uniform(Easing::EaseOut)),
            };
            let o = Arc::clone(&opacity);
            let mut animation = KeyframeAnimation::from_config(&keyframes, &options)
                .with_label(label)
                .on_complete(move || o.lock().unwrap().push(()));
            animation.start(clock.now_ms());
            scheduler.add(animation);
        }
        scheduler.tick(clock.now_ms());
        clock.advance(FRAME_MS);
        assert!(clock.now_ms() < 5000.0);
    }

    assert_eq!(opacity.lock().unwrap().len(), 2);
    assert_eq!(timeline.progress(), 1.0);
}
