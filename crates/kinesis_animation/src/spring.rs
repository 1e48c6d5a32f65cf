//! Spring physics animation
//!
//! Semi-implicit Euler springs for smooth, natural animations.
//! Supports preset configurations, named multi-property springs and a
//! frame-driven controller.

use indexmap::IndexMap;
use kinesis_core::frame::{delta_seconds, FrameDriven, FrameStatus};
use serde::{Deserialize, Serialize};

use crate::PropertyValues;

/// Configuration for a spring animation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping: f64,
    /// A non-positive or non-finite mass makes the spring jump straight to its target
    pub mass: f64,
    /// Displacement below which the spring may come to rest
    pub rest_delta: f64,
    /// Speed below which the spring may come to rest
    pub rest_speed: f64,
}

impl SpringConfig {
    /// Create a new spring configuration with default rest thresholds
    pub fn new(stiffness: f64, damping: f64, mass: f64) -> Self {
        Self {
            stiffness,
            damping,
            mass,
            ..Default::default()
        }
    }

    /// A soft, slow spring (good for page transitions)
    pub fn gentle() -> Self {
        Self::new(50.0, 15.0, 1.0)
    }

    /// An underdamped spring with visible overshoot
    pub fn bouncy() -> Self {
        Self::new(200.0, 8.0, 1.0)
    }

    /// A firm spring with little oscillation (good for buttons)
    pub fn stiff() -> Self {
        Self::new(300.0, 20.0, 1.0)
    }

    /// A loose spring that takes its time
    pub fn slow() -> Self {
        Self::new(30.0, 12.0, 1.0)
    }

    /// A very stiff spring for quick responses
    pub fn fast() -> Self {
        Self::new(400.0, 25.0, 1.0)
    }

    /// Calculate critical damping for this spring's stiffness and mass
    pub fn critical_damping(&self) -> f64 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// Ratio of actual to critical damping (1.0 = critically damped)
    pub fn damping_ratio(&self) -> f64 {
        let critical = self.critical_damping();
        if critical > 0.0 {
            self.damping / critical
        } else {
            0.0
        }
    }

    /// Check if the spring is underdamped (will oscillate)
    pub fn is_underdamped(&self) -> bool {
        self.damping < self.critical_damping()
    }

    /// Check if the spring is critically damped (no oscillation, fastest settling)
    pub fn is_critically_damped(&self) -> bool {
        (self.damping - self.critical_damping()).abs() < 0.01
    }

    /// Check if the spring is overdamped (slow settling, no oscillation)
    pub fn is_overdamped(&self) -> bool {
        self.damping > self.critical_damping()
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 10.0,
            mass: 1.0,
            rest_delta: 0.01,
            rest_speed: 0.01,
        }
    }
}

/// Named spring configurations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpringPreset {
    Gentle,
    Bouncy,
    Stiff,
    Slow,
    Fast,
}

impl SpringPreset {
    pub const ALL: [SpringPreset; 5] = [
        SpringPreset::Gentle,
        SpringPreset::Bouncy,
        SpringPreset::Stiff,
        SpringPreset::Slow,
        SpringPreset::Fast,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SpringPreset::Gentle => "gentle",
            SpringPreset::Bouncy => "bouncy",
            SpringPreset::Stiff => "stiff",
            SpringPreset::Slow => "slow",
            SpringPreset::Fast => "fast",
        }
    }

    pub fn config(&self) -> SpringConfig {
        match self {
            SpringPreset::Gentle => SpringConfig::gentle(),
            SpringPreset::Bouncy => SpringConfig::bouncy(),
            SpringPreset::Stiff => SpringConfig::stiff(),
            SpringPreset::Slow => SpringConfig::slow(),
            SpringPreset::Fast => SpringConfig::fast(),
        }
    }
}

impl From<SpringPreset> for SpringConfig {
    fn from(preset: SpringPreset) -> Self {
        preset.config()
    }
}

/// Result of a single spring step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringUpdate {
    pub position: f64,
    pub velocity: f64,
    pub is_complete: bool,
}

/// A single-value spring integrator
#[derive(Clone, Copy, Debug, Default)]
pub struct Spring {
    config: SpringConfig,
    position: f64,
    velocity: f64,
    target: f64,
    active: bool,
}

impl Spring {
    pub fn new(config: SpringConfig) -> Self {
        Self {
            config,
            position: 0.0,
            velocity: 0.0,
            target: 0.0,
            active: false,
        }
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Set a new target and wake the spring
    pub fn set_target(&mut self, target: f64) {
        self.target = target;
        self.active = true;
    }

    pub fn set_position(&mut self, position: f64) {
        self.position = position;
    }

    pub fn set_velocity(&mut self, velocity: f64) {
        self.velocity = velocity;
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// The rest check combines the displacement measured before the step with
    /// the velocity after it. Once at rest the position snaps to the target,
    /// velocity is zeroed and the spring goes inactive. An inactive spring
    /// returns its state unchanged.
    pub fn update(&mut self, dt: f64) -> SpringUpdate {
        if !self.active {
            return SpringUpdate {
                position: self.position,
                velocity: self.velocity,
                is_complete: true,
            };
        }

        let SpringConfig {
            stiffness,
            damping,
            mass,
            rest_delta,
            rest_speed,
        } = self.config;

        if !(mass.is_finite() && mass > 0.0) {
            tracing::debug!(mass, "massless spring, snapping to target");
            self.position = self.target;
            self.velocity = 0.0;
            self.active = false;
            return SpringUpdate {
                position: self.position,
                velocity: self.velocity,
                is_complete: true,
            };
        }

        let displacement = self.target - self.position;
        let spring_force = stiffness * displacement;
        let damping_force = damping * self.velocity;
        let acceleration = (spring_force - damping_force) / mass;

        self.velocity += acceleration * dt;
        self.position += self.velocity * dt;

        if displacement.abs() < rest_delta && self.velocity.abs() < rest_speed {
            self.position = self.target;
            self.velocity = 0.0;
            self.active = false;
        }

        SpringUpdate {
            position: self.position,
            velocity: self.velocity,
            is_complete: !self.active,
        }
    }

    /// Zero the velocity and deactivate; the position is kept
    pub fn reset(&mut self) {
        self.velocity = 0.0;
        self.active = false;
    }
}

/// Independent springs keyed by property name, sharing one config and clock
#[derive(Clone, Debug, Default)]
pub struct MultiSpring {
    config: SpringConfig,
    springs: IndexMap<String, Spring>,
}

impl MultiSpring {
    pub fn new(config: SpringConfig) -> Self {
        Self {
            config,
            springs: IndexMap::new(),
        }
    }

    fn spring_mut(&mut self, property: &str) -> &mut Spring {
        let config = self.config;
        self.springs
            .entry(property.to_string())
            .or_insert_with(|| Spring::new(config))
    }

    /// Set a target, creating the spring at position 0 if it does not exist yet
    pub fn set_target(&mut self, property: &str, target: f64) {
        self.spring_mut(property).set_target(target);
    }

    pub fn set_position(&mut self, property: &str, position: f64) {
        self.spring_mut(property).set_position(position);
    }

    pub fn set_velocity(&mut self, property: &str, velocity: f64) {
        self.spring_mut(property).set_velocity(velocity);
    }

    pub fn get(&self, property: &str) -> Option<&Spring> {
        self.springs.get(property)
    }

    pub fn len(&self) -> usize {
        self.springs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.springs.is_empty()
    }

    /// Step every spring once and return each property's position
    pub fn update(&mut self, dt: f64) -> PropertyValues {
        self.springs
            .iter_mut()
            .map(|(property, spring)| (property.clone(), spring.update(dt).position))
            .collect()
    }

    /// True when every member spring is inactive
    pub fn is_complete(&self) -> bool {
        self.springs.values().all(|spring| !spring.is_active())
    }

    pub fn reset(&mut self) {
        for spring in self.springs.values_mut() {
            spring.reset();
        }
    }
}

/// Spring easing: position of a 0→1 spring after `t` seconds of 1/60 s steps
pub fn spring_progress(config: SpringConfig, t: f64) -> f64 {
    const STEPS_PER_SECOND: f64 = 60.0;

    let mut spring = Spring::new(config);
    spring.set_position(0.0);
    spring.set_target(1.0);

    let steps = (STEPS_PER_SECOND * t.max(0.0)).ceil() as usize;
    for _ in 0..steps {
        spring.update(1.0 / STEPS_PER_SECOND);
    }
    spring.position()
}

pub type UpdateCallback = Box<dyn FnMut(&PropertyValues) + Send>;
pub type CompleteCallback = Box<dyn FnMut() + Send>;

/// Frame-driven multi-property spring animation
pub struct SpringAnimation {
    physics: MultiSpring,
    label: String,
    last_frame_ms: f64,
    running: bool,
    /// Oversized frame deltas are integrated in slices of at most this size
    max_step_seconds: f64,
    values: PropertyValues,
    on_update: Option<UpdateCallback>,
    on_complete: Option<CompleteCallback>,
}

impl SpringAnimation {
    pub fn new(config: SpringConfig) -> Self {
        Self {
            physics: MultiSpring::new(config),
            label: "spring".to_string(),
            last_frame_ms: 0.0,
            running: false,
            max_step_seconds: 1.0 / 60.0,
            values: PropertyValues::new(),
            on_update: None,
            on_complete: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Largest single integration step; zero or negative disables sub-stepping
    pub fn with_max_step(mut self, seconds: f64) -> Self {
        self.max_step_seconds = seconds;
        self
    }

    pub fn on_update<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&PropertyValues) + Send + 'static,
    {
        self.on_update = Some(Box::new(callback));
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Start animating every property in `to`.
    ///
    /// Positions from `from` are applied before any target so that new
    /// properties start where the caller says rather than at 0.
    pub fn animate<F, T, K>(&mut self, from: F, to: T, now_ms: f64)
    where
        F: IntoIterator<Item = (K, f64)>,
        T: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        for (property, value) in from {
            self.physics.set_position(property.as_ref(), value);
        }
        for (property, value) in to {
            self.physics.set_target(property.as_ref(), value);
        }
        self.last_frame_ms = now_ms;
        self.running = true;
        tracing::debug!(label = %self.label, properties = self.physics.len(), "spring animation started");
    }

    pub fn physics(&self) -> &MultiSpring {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut MultiSpring {
        &mut self.physics
    }

    /// Positions produced by the most recent frame
    pub fn values(&self) -> &PropertyValues {
        &self.values
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stop(&mut self) {
        if self.running {
            tracing::debug!(label = %self.label, "spring animation stopped");
        }
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.physics.reset();
    }

    fn step(&mut self, dt: f64) {
        let mut remaining = dt;
        loop {
            let slice = if self.max_step_seconds > 0.0 {
                remaining.min(self.max_step_seconds)
            } else {
                remaining
            };
            self.values = self.physics.update(slice);
            remaining -= slice;
            if remaining <= 0.0 || self.physics.is_complete() {
                break;
            }
        }
    }
}

impl FrameDriven for SpringAnimation {
    fn on_frame(&mut self, now_ms: f64) -> FrameStatus {
        if !self.running {
            return FrameStatus::Done;
        }

        let dt = delta_seconds(self.last_frame_ms, now_ms);
        self.last_frame_ms = now_ms;
        self.step(dt);

        if let Some(on_update) = self.on_update.as_mut() {
            on_update(&self.values);
        }

        if self.physics.is_complete() {
            self.running = false;
            tracing::debug!(label = %self.label, "spring animation complete");
            if let Some(on_complete) = self.on_complete.as_mut() {
                on_complete();
            }
            FrameStatus::Done
        } else {
            FrameStatus::Continue
        }
    }

    fn cancel(&mut self) {
        self.stop();
    }

    fn is_active(&self) -> bool {
        self.running
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Debug for SpringAnimation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpringAnimation")
            .field("label", &self.label)
            .field("running", &self.running)
            .field("values", &self.values)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn test_critically_damped_spring_settles_exactly() {
        let mut spring = Spring::new(SpringConfig::new(100.0, 20.0, 1.0));
        spring.set_position(0.0);
        spring.set_target(100.0);

        let mut last = spring.update(DT);
        for _ in 1..300 {
            last = spring.update(DT);
        }

        assert!(last.is_complete);
        assert_eq!(last.position, 100.0);
        assert_eq!(last.velocity, 0.0);
        assert!(!spring.is_active());
    }

    #[test]
    fn test_massless_spring_jumps_to_target() {
        for mass in [0.0, -1.0, f64::NAN] {
            let mut spring = Spring::new(SpringConfig::new(100.0, 10.0, mass));
            spring.set_target(25.0);

            let update = spring.update(DT);
            assert!(update.is_complete);
            assert_eq!(update.position, 25.0);
            assert_eq!(update.velocity, 0.0);
            assert!(!spring.is_active());
        }
    }

    #[test]
    fn test_settles_exactly_for_any_target() {
        for target in [-250.0, -1.0, 0.5, 42.0, 1000.0] {
            let mut spring = Spring::new(SpringConfig::default());
            spring.set_target(target);

            let mut complete = false;
            for _ in 0..5000 {
                if spring.update(DT).is_complete {
                    complete = true;
                    break;
                }
            }

            assert!(complete, "target {target} never settled");
            assert_eq!(spring.position(), target);
        }
    }

    #[test]
    fn test_overdamped_displacement_never_grows() {
        let mut spring = Spring::new(SpringConfig::new(100.0, 40.0, 1.0));
        spring.set_target(100.0);

        let mut previous = f64::MAX;
        for step in 0..600 {
            let update = spring.update(DT);
            let distance = (update.position - 100.0).abs();
            if step >= 3 {
                assert!(distance <= previous + 1e-12, "step {step}: {distance} > {previous}");
            }
            previous = distance;
        }
    }

    #[test]
    fn test_inactive_spring_is_unchanged() {
        let mut spring = Spring::new(SpringConfig::default());
        spring.set_position(12.0);
        spring.set_velocity(3.0);

        let update = spring.update(DT);
        assert_eq!(
            update,
            SpringUpdate {
                position: 12.0,
                velocity: 3.0,
                is_complete: true
            }
        );
    }

    #[test]
    fn test_reset_keeps_position() {
        let mut spring = Spring::new(SpringConfig::default());
        spring.set_target(50.0);
        for _ in 0..10 {
            spring.update(DT);
        }
        let position = spring.position();
        spring.reset();

        assert!(!spring.is_active());
        assert_eq!(spring.velocity(), 0.0);
        assert_eq!(spring.position(), position);
    }

    #[test]
    fn test_presets() {
        assert_eq!(SpringPreset::Bouncy.config().stiffness, 200.0);
        assert!(SpringConfig::bouncy().is_underdamped());
        assert!(SpringConfig::new(100.0, 20.0, 1.0).is_critically_damped());
        assert!(SpringConfig::new(100.0, 40.0, 1.0).is_overdamped());
        assert_eq!(SpringPreset::ALL.len(), 5);
    }

    #[test]
    fn test_multi_spring_creates_springs_lazily() {
        let mut springs = MultiSpring::new(SpringConfig::default());
        springs.set_position("x", 10.0);
        springs.set_target("x", 10.0);
        springs.set_target("y", 5.0);

        assert_eq!(springs.len(), 2);
        assert_eq!(springs.get("y").map(|s| s.position()), Some(0.0));

        let values = springs.update(DT);
        let keys: Vec<&str> = values.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["x", "y"]);
        assert!(!springs.is_complete());
    }

    #[test]
    fn test_multi_spring_complete_when_all_rest() {
        let mut springs = MultiSpring::new(SpringConfig::new(100.0, 20.0, 1.0));
        springs.set_target("opacity", 1.0);
        springs.set_target("scale", 2.0);

        for _ in 0..600 {
            springs.update(DT);
        }

        assert!(springs.is_complete());
        let values = springs.update(DT);
        assert_eq!(values["opacity"], 1.0);
        assert_eq!(values["scale"], 2.0);
    }

    #[test]
    fn test_spring_progress() {
        let config = SpringConfig::default();
        assert_eq!(spring_progress(config, 0.0), 0.0);
        assert!((spring_progress(config, 1.0) - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_animation_completes_once() {
        let completions = Arc::new(Mutex::new(0));
        let updates = Arc::new(Mutex::new(Vec::new()));

        let c = Arc::clone(&completions);
        let u = Arc::clone(&updates);
        let mut animation = SpringAnimation::new(SpringConfig::stiff())
            .on_update(move |values| u.lock().unwrap().push(values["x"]))
            .on_complete(move || *c.lock().unwrap() += 1);

        animation.animate([("x", 0.0)], [("x", 100.0)], 0.0);

        let mut now = 0.0;
        let mut frames = 0;
        while animation.on_frame(now) == FrameStatus::Continue {
            now += 1000.0 / 60.0;
            frames += 1;
            assert!(frames < 1000);
        }
        // Further frames are no-ops
        animation.on_frame(now + 16.0);

        assert_eq!(*completions.lock().unwrap(), 1);
        assert_eq!(updates.lock().unwrap().last().copied(), Some(100.0));
    }

    #[test]
    fn test_stalled_clock_is_sub_stepped() {
        let mut animation = SpringAnimation::new(SpringConfig::stiff());
        animation.animate([("x", 0.0)], [("x", 100.0)], 0.0);

        // One frame after a five second stall
        let status = animation.on_frame(5000.0);

        assert_eq!(status, FrameStatus::Done);
        assert_eq!(animation.values()["x"], 100.0);
    }

    #[test]
    fn test_cancelled_animation_does_nothing() {
        let completions = Arc::new(Mutex::new(0));
        let c = Arc::clone(&completions);
        let mut animation = SpringAnimation::new(SpringConfig::default())
            .on_complete(move || *c.lock().unwrap() += 1);

        animation.animate([("x", 0.0)], [("x", 1.0)], 0.0);
        animation.cancel();

        assert_eq!(animation.on_frame(16.0), FrameStatus::Done);
        assert!(animation.values().is_empty());
        assert_eq!(*completions.lock().unwrap(), 0);
    }
}
