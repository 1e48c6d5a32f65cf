//! Keyframe animations
//!
//! A keyframe config maps each property to an array of values. The arrays are
//! spread across the duration at equal time fractions and sampled with
//! optional per-segment easing.

use indexmap::IndexMap;
use kinesis_core::frame::{FrameDriven, FrameStatus};
use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::PropertyValues;

/// A value held by a keyframe
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyframeValue {
    Number(f64),
    /// Non-numeric values (colors, keywords) snap instead of blending
    Text(String),
}

impl KeyframeValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            KeyframeValue::Number(n) => Some(*n),
            KeyframeValue::Text(_) => None,
        }
    }

    /// Blend towards `next`. Numbers interpolate linearly; anything else
    /// switches over once `t` reaches 0.5.
    pub fn lerp(&self, next: &KeyframeValue, t: f64) -> KeyframeValue {
        match (self, next) {
            (KeyframeValue::Number(a), KeyframeValue::Number(b)) => {
                KeyframeValue::Number(a + (b - a) * t)
            }
            _ if t < 0.5 => self.clone(),
            _ => next.clone(),
        }
    }
}

impl From<f64> for KeyframeValue {
    fn from(value: f64) -> Self {
        KeyframeValue::Number(value)
    }
}

impl From<&str> for KeyframeValue {
    fn from(value: &str) -> Self {
        KeyframeValue::Text(value.to_string())
    }
}

impl From<String> for KeyframeValue {
    fn from(value: String) -> Self {
        KeyframeValue::Text(value)
    }
}

/// Sampled keyframe output, in property order
pub type KeyframeValues = IndexMap<String, KeyframeValue>;

/// Ordered mapping of property name to its keyframe values
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyframeConfig {
    properties: IndexMap<String, Vec<KeyframeValue>>,
}

impl KeyframeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a property and its values
    pub fn property<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<KeyframeValue>,
    {
        self.properties
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[KeyframeValue])> {
        self.properties
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Easing applied between keyframes
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyframeEasing {
    /// Same curve for every segment
    Uniform(Easing),
    /// Curve per segment; segments past the end of the list are linear
    PerSegment(Vec<Easing>),
}

impl KeyframeEasing {
    fn for_segment(&self, index: usize) -> Option<Easing> {
        match self {
            KeyframeEasing::Uniform(easing) => Some(*easing),
            KeyframeEasing::PerSegment(list) => list.get(index).copied(),
        }
    }
}

/// Keyframe timing options
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyframeOptions {
    pub duration_ms: f64,
    pub easing: Option<KeyframeEasing>,
}

impl Default for KeyframeOptions {
    fn default() -> Self {
        Self {
            duration_ms: 1000.0,
            easing: None,
        }
    }
}

/// Values at one point in time
#[derive(Clone, Debug)]
pub struct KeyframeSegment {
    /// Time position in milliseconds
    pub time: f64,
    pub values: KeyframeValues,
    /// Easing used when leaving this segment towards the next
    pub easing: Option<Easing>,
}

/// Immutable segment list sampled by progress
#[derive(Clone, Debug, Default)]
pub struct KeyframeTimeline {
    segments: Vec<KeyframeSegment>,
    duration_ms: f64,
}

impl KeyframeTimeline {
    pub fn new(config: &KeyframeConfig, options: &KeyframeOptions) -> Self {
        let mut timeline = Self::default();
        timeline.set_keyframes(config, options);
        timeline
    }

    /// Replace the whole segment list
    pub fn set_keyframes(&mut self, config: &KeyframeConfig, options: &KeyframeOptions) {
        self.duration_ms = options.duration_ms;
        self.segments = build_segments(config, options);
    }

    pub fn segments(&self) -> &[KeyframeSegment] {
        &self.segments
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Sample every property at `progress` (clamped to 0..=1).
    ///
    /// Values beyond the last segment hold. A property present on only one
    /// side of the active segment pair carries that side's value.
    pub fn interpolate(&self, progress: f64) -> KeyframeValues {
        let Some(first) = self.segments.first() else {
            return KeyframeValues::new();
        };

        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        let current_time = progress * self.duration_ms;

        let mut index = 0;
        for (i, segment) in self.segments.iter().enumerate() {
            if segment.time <= current_time {
                index = i;
            } else {
                break;
            }
        }

        let current = self.segments.get(index).unwrap_or(first);
        let Some(next) = self.segments.get(index + 1) else {
            return current.values.clone();
        };

        let span = next.time - current.time;
        let segment_progress = if span > 0.0 {
            (current_time - current.time) / span
        } else {
            1.0
        };
        let eased = match current.easing {
            Some(easing) => easing.apply(segment_progress),
            None => segment_progress,
        };

        let mut values = KeyframeValues::with_capacity(current.values.len());
        for key in current.values.keys().chain(next.values.keys()) {
            if values.contains_key(key) {
                continue;
            }
            let value = match (current.values.get(key), next.values.get(key)) {
                (Some(a), Some(b)) => a.lerp(b, eased),
                (Some(a), None) => a.clone(),
                (None, Some(b)) => b.clone(),
                (None, None) => continue,
            };
            values.insert(key.clone(), value);
        }
        values
    }

    /// Numeric properties only, for sinks that take plain numbers
    pub fn interpolate_numbers(&self, progress: f64) -> PropertyValues {
        self.interpolate(progress)
            .into_iter()
            .filter_map(|(key, value)| value.as_number().map(|n| (key, n)))
            .collect()
    }
}

/// Only the first property's array decides how many segments exist; other
/// properties contribute their value at the same index when they have one.
fn build_segments(config: &KeyframeConfig, options: &KeyframeOptions) -> Vec<KeyframeSegment> {
    let Some((first_key, first_values)) = config.iter().next() else {
        return Vec::new();
    };

    let frames = first_values.len();
    for (key, values) in config.iter().skip(1) {
        if values.len() != frames {
            tracing::debug!(
                property = key,
                len = values.len(),
                first = first_key,
                expected = frames,
                "keyframe property length differs from first property"
            );
        }
    }

    let mut segments: Vec<KeyframeSegment> = (0..frames)
        .map(|i| {
            let time = if frames > 1 {
                i as f64 / (frames - 1) as f64 * options.duration_ms
            } else {
                0.0
            };
            let values = config
                .iter()
                .filter_map(|(key, values)| values.get(i).map(|v| (key.to_string(), v.clone())))
                .collect();
            KeyframeSegment {
                time,
                values,
                easing: options.easing.as_ref().and_then(|e| e.for_segment(i)),
            }
        })
        .collect();

    segments.sort_by(|a, b| a.time.total_cmp(&b.time));
    segments
}

pub type KeyframeUpdateCallback = Box<dyn FnMut(&KeyframeValues) + Send>;
pub type KeyframeCompleteCallback = Box<dyn FnMut() + Send>;

/// Frame-driven playback of a [`KeyframeTimeline`]
pub struct KeyframeAnimation {
    timeline: KeyframeTimeline,
    label: String,
    start_ms: f64,
    progress: f64,
    running: bool,
    on_update: Option<KeyframeUpdateCallback>,
    on_complete: Option<KeyframeCompleteCallback>,
}

impl KeyframeAnimation {
    pub fn new(timeline: KeyframeTimeline) -> Self {
        Self {
            timeline,
            label: "keyframes".to_string(),
            start_ms: 0.0,
            progress: 0.0,
            running: false,
            on_update: None,
            on_complete: None,
        }
    }

    pub fn from_config(config: &KeyframeConfig, options: &KeyframeOptions) -> Self {
        Self::new(KeyframeTimeline::new(config, options))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn on_update<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&KeyframeValues) + Send + 'static,
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

    pub fn timeline(&self) -> &KeyframeTimeline {
        &self.timeline
    }

    pub fn start(&mut self, now_ms: f64) {
        self.start_ms = now_ms;
        self.progress = 0.0;
        self.running = true;
        tracing::debug!(label = %self.label, duration_ms = self.timeline.duration_ms(), "keyframe animation started");
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current sample without advancing
    pub fn values(&self) -> KeyframeValues {
        self.timeline.interpolate(self.progress)
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.start_ms = 0.0;
        self.progress = 0.0;
    }
}

impl FrameDriven for KeyframeAnimation {
    fn on_frame(&mut self, now_ms: f64) -> FrameStatus {
        if !self.running {
            return FrameStatus::Done;
        }

        let duration = self.timeline.duration_ms();
        let elapsed = (now_ms - self.start_ms).max(0.0);
        self.progress = if duration > 0.0 {
            (elapsed / duration).min(1.0)
        } else {
            1.0
        };

        let values = self.timeline.interpolate(self.progress);
        if let Some(on_update) = self.on_update.as_mut() {
            on_update(&values);
        }

        if self.progress >= 1.0 {
            self.running = false;
            tracing::debug!(label = %self.label, "keyframe animation complete");
            if let Some(on_complete) = self.on_complete.as_mut() {
                on_complete();
            }
            return FrameStatus::Done;
        }
        FrameStatus::Continue
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

impl std::fmt::Debug for KeyframeAnimation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyframeAnimation")
            .field("label", &self.label)
            .field("progress", &self.progress)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}
