//! Offline scene simulation
//!
//! Steps a scene on a fixed-rate manual clock and samples every animated
//! property once per frame. Orchestrating motions (stagger, sequence, pinch
//! replay) run as a per-frame driver in front of the scheduler; everything
//! they start is owned by the scheduler.

use indexmap::IndexMap;
use kinesis_animation::{
    AnimationId, AnimationScheduler, KeyframeAnimation, KeyframeConfig, KeyframeEasing,
    KeyframeOptions, KeyframeValues, PropertyValues, SequenceController, SequenceItem,
    SpringAnimation, SpringConfig, StaggerScheduler, TimelineScheduler,
};
use kinesis_core::debug::{AnimationDebugger, PerformanceMetrics};
use kinesis_core::frame::{FrameClock, FrameDriven, FrameStatus, ManualClock};
use kinesis_gesture::{PinchEventKind, PinchZoomController};
use serde::Serialize;
use std::sync::{Arc, Mutex};

use crate::config::{
    KeyframeScene, MotionConfig, PinchScene, Scene, SequenceScene, SpringScene, StaggerScene,
};
use crate::error::{CliError, Result};

#[derive(Clone, Copy, Debug)]
pub struct SimulationSettings {
    pub fps: u32,
    pub max_frames: usize,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            fps: 60,
            max_frames: 600,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct FrameSample {
    pub frame: usize,
    pub time_ms: f64,
    pub values: PropertyValues,
}

#[derive(Clone, Debug, Serialize)]
pub struct SimulationReport {
    pub scene: String,
    pub kind: &'static str,
    pub fps: u32,
    /// False when the frame limit was reached first
    pub settled: bool,
    pub metrics: PerformanceMetrics,
    pub frames: Vec<FrameSample>,
}

type SharedValues = Arc<Mutex<PropertyValues>>;

/// Runs once per frame before the scheduler ticks
type Driver = Box<dyn FnMut(f64, &mut AnimationScheduler) -> FrameStatus>;

fn store<'a>(values: &SharedValues, updates: impl IntoIterator<Item = (&'a str, f64)>) {
    if let Ok(mut values) = values.lock() {
        for (key, value) in updates {
            values.insert(key.to_string(), value);
        }
    }
}

fn store_keyframes(values: &SharedValues, updates: &KeyframeValues) {
    store(
        values,
        updates
            .iter()
            .filter_map(|(key, value)| value.as_number().map(|n| (key.as_str(), n))),
    );
}

fn snapshot(values: &SharedValues) -> PropertyValues {
    values.lock().map(|values| values.clone()).unwrap_or_default()
}

/// Simulate `scene` until it settles or the frame limit is reached
pub fn simulate(scene: &Scene, settings: SimulationSettings) -> Result<SimulationReport> {
    if settings.fps == 0 {
        return Err(CliError::InvalidValue {
            what: "frame rate",
            value: 0.0,
        });
    }
    scene.validate()?;

    let frame_ms = 1000.0 / settings.fps as f64;
    let values: SharedValues = Arc::new(Mutex::new(PropertyValues::new()));
    let mut scheduler = AnimationScheduler::new().with_debugger(AnimationDebugger::default());

    let mut driver = match &scene.motion {
        MotionConfig::Spring(spring) => start_spring(&scene.name, spring, &values, &mut scheduler),
        MotionConfig::Keyframes(keyframes) => {
            start_keyframes(&scene.name, keyframes, &values, &mut scheduler)
        }
        MotionConfig::Stagger(stagger) => start_stagger(&scene.name, stagger, &values),
        MotionConfig::Timeline(config) => {
            let progress = Arc::clone(&values);
            let segment = Arc::clone(&values);
            let mut timeline = TimelineScheduler::new(config.clone())
                .with_label(scene.name.as_str())
                .on_update(move |p| store(&progress, [("progress", p)]))
                .on_segment(move |index, _| store(&segment, [("segment", index as f64)]));
            store(&values, [("progress", 0.0)]);
            timeline.play(0.0);
            scheduler.add(timeline);
            None
        }
        MotionConfig::Sequence(sequence) => start_sequence(&scene.name, sequence, &values),
        MotionConfig::Pinch(pinch) => start_pinch(pinch, &values),
    };

    let mut clock = ManualClock::new(0.0);
    let mut frames = Vec::new();
    let mut settled = false;

    for frame in 0..=settings.max_frames {
        let now = clock.now_ms();
        let driver_status = match driver.as_mut() {
            Some(drive) => drive(now, &mut scheduler),
            None => FrameStatus::Done,
        };
        scheduler.tick(now);

        frames.push(FrameSample {
            frame,
            time_ms: now,
            values: snapshot(&values),
        });

        if driver_status.is_done() && scheduler.is_empty() {
            settled = true;
            break;
        }
        clock.set(frame_ms * (frame + 1) as f64);
    }

    let metrics = scheduler
        .debugger()
        .map(AnimationDebugger::metrics)
        .unwrap_or_default();
    tracing::info!(
        scene = %scene.name,
        frames = frames.len(),
        settled,
        "simulation finished"
    );

    Ok(SimulationReport {
        scene: scene.name.clone(),
        kind: scene.motion.kind(),
        fps: settings.fps,
        settled,
        metrics,
        frames,
    })
}

fn start_spring(
    name: &str,
    scene: &SpringScene,
    values: &SharedValues,
    scheduler: &mut AnimationScheduler,
) -> Option<Driver> {
    let initial = scene
        .to
        .keys()
        .map(|key| (key.as_str(), scene.from.get(key).copied().unwrap_or(0.0)));
    store(values, initial);

    let sink = Arc::clone(values);
    let mut spring = SpringAnimation::new(scene.spring_config())
        .with_label(name)
        .on_update(move |current| store(&sink, current.iter().map(|(k, v)| (k.as_str(), *v))));
    spring.animate(
        scene.from.iter().map(|(k, v)| (k.as_str(), *v)),
        scene.to.iter().map(|(k, v)| (k.as_str(), *v)),
        0.0,
    );
    scheduler.add(spring);
    None
}

fn start_keyframes(
    name: &str,
    scene: &KeyframeScene,
    values: &SharedValues,
    scheduler: &mut AnimationScheduler,
) -> Option<Driver> {
    let sink = Arc::clone(values);
    let mut animation = KeyframeAnimation::from_config(&scene.keyframes, &scene.options)
        .with_label(name)
        .on_update(move |current| store_keyframes(&sink, current));
    store_keyframes(values, &animation.values());
    animation.start(0.0);
    scheduler.add(animation);
    None
}

fn start_stagger(name: &str, scene: &StaggerScene, values: &SharedValues) -> Option<Driver> {
    let keys: Vec<String> = (0..scene.count).map(|i| format!("item-{i}")).collect();
    store(values, keys.iter().map(|key| (key.as_str(), scene.from)));

    let due = Arc::new(Mutex::new(Vec::new()));
    let activated = Arc::clone(&due);
    let mut stagger = StaggerScheduler::new(scene.count, scene.stagger)
        .with_label(name)
        .on_activate(move |index, _| {
            if let Ok(mut due) = activated.lock() {
                due.push(index);
            }
        });
    stagger.start(0.0);

    let config = scene.spring.map(SpringConfig::from).unwrap_or_default();
    let (from, to) = (scene.from, scene.to);
    let values = Arc::clone(values);

    Some(Box::new(move |now: f64, scheduler: &mut AnimationScheduler| {
        let status = stagger.on_frame(now);
        let ready: Vec<usize> = due
            .lock()
            .map(|mut due| due.drain(..).collect())
            .unwrap_or_default();

        for index in ready {
            let key = keys[index].clone();
            let sink = Arc::clone(&values);
            let mut spring = SpringAnimation::new(config)
                .with_label(key.as_str())
                .on_update(move |current| {
                    store(&sink, current.iter().map(|(k, v)| (k.as_str(), *v)))
                });
            spring.animate([(key.as_str(), from)], [(key.as_str(), to)], now);
            scheduler.add(spring);
        }
        status
    }))
}

fn start_sequence(name: &str, scene: &SequenceScene, values: &SharedValues) -> Option<Driver> {
    let mut targets = PropertyValues::new();
    for item in &scene.items {
        for key in item.values.keys() {
            targets.entry(key.clone()).or_insert(0.0);
        }
    }
    store(values, targets.iter().map(|(k, v)| (k.as_str(), *v)));

    let due: Arc<Mutex<Vec<(usize, SequenceItem)>>> = Arc::new(Mutex::new(Vec::new()));
    let started = Arc::clone(&due);
    let mut sequence = SequenceController::new(scene.items.clone(), scene.options)
        .with_label(name)
        .on_item(move |index, item| {
            if let Ok(mut due) = started.lock() {
                due.push((index, item.clone()));
            }
        });
    sequence.play(0.0);

    let values = Arc::clone(values);
    let mut running: Option<AnimationId> = None;

    Some(Box::new(move |now: f64, scheduler: &mut AnimationScheduler| {
        let status = sequence.on_frame(now);
        let ready: Vec<(usize, SequenceItem)> = due
            .lock()
            .map(|mut due| due.drain(..).collect())
            .unwrap_or_default();

        for (index, item) in ready {
            if let Some(previous) = running.take() {
                scheduler.cancel(previous);
            }

            let mut keyframes = KeyframeConfig::new();
            for (key, to) in &item.values {
                let from = targets.get(key).copied().unwrap_or(0.0);
                keyframes = keyframes.property(key.as_str(), [from, *to]);
                targets.insert(key.clone(), *to);
            }
            let options = KeyframeOptions {
                duration_ms: item.duration.max(0.0) * 1000.0,
                easing: Some(KeyframeEasing::Uniform(item.easing)),
            };

            let sink = Arc::clone(&values);
            let mut animation = KeyframeAnimation::from_config(&keyframes, &options)
                .with_label(item.label.clone().unwrap_or_else(|| format!("item-{index}")))
                .on_update(move |current| store_keyframes(&sink, current));
            animation.start(now + item.delay.max(0.0) * 1000.0);
            running = Some(scheduler.add(animation));
        }
        status
    }))
}

fn start_pinch(scene: &PinchScene, values: &SharedValues) -> Option<Driver> {
    let mut pinch = PinchZoomController::new(scene.options);
    let sink = Arc::clone(values);
    pinch.subscribe(move |event| {
        if event.kind != PinchEventKind::End {
            let state = event.state;
            store(
                &sink,
                [
                    ("scale", state.scale),
                    ("rotation", state.rotation),
                    ("center_x", state.center.x),
                    ("center_y", state.center.y),
                ],
            );
        }
    });
    store(
        values,
        [
            ("scale", scene.options.initial_scale),
            ("rotation", scene.options.initial_rotation),
        ],
    );

    let mut events = scene.events.clone();
    events.sort_by(|a, b| a.timestamp_ms.total_cmp(&b.timestamp_ms));
    let mut pending = events.into_iter().peekable();

    Some(Box::new(move |now: f64, _scheduler: &mut AnimationScheduler| {
        while let Some(event) = pending.next_if(|event| event.timestamp_ms <= now) {
            pinch.handle(&event);
        }
        let status = pinch.on_frame(now);
        if pending.peek().is_some() || pinch.tracker().is_active() {
            return FrameStatus::Continue;
        }
        status
    }))
}

/// Per-property final values of a report, for summaries
pub fn final_values(report: &SimulationReport) -> IndexMap<String, f64> {
    report
        .frames
        .last()
        .map(|sample| sample.values.clone())
        .unwrap_or_default()
}
