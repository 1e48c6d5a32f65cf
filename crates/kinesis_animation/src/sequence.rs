//! Animation sequences
//!
//! Plays an ordered list of items one after another. Each item occupies
//! `delay + duration` seconds; the item-start callback hands its target values
//! to whoever applies them.

use kinesis_core::frame::{FrameDriven, FrameStatus};
use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::PropertyValues;

/// Properties negated by [`RepeatType::Mirror`]
const MIRRORED_PROPERTIES: [&str; 3] = ["x", "translateX", "rotateY"];

/// One step of a sequence. Times are in seconds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceItem {
    pub label: Option<String>,
    pub values: PropertyValues,
    pub duration: f64,
    pub delay: f64,
    pub easing: Easing,
}

impl Default for SequenceItem {
    fn default() -> Self {
        Self {
            label: None,
            values: PropertyValues::new(),
            duration: 0.3,
            delay: 0.0,
            easing: Easing::EaseOut,
        }
    }
}

impl SequenceItem {
    pub fn new<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = seconds;
        self
    }

    pub fn with_delay(mut self, seconds: f64) -> Self {
        self.delay = seconds;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    fn span_ms(&self) -> f64 {
        (self.duration.max(0.0) + self.delay.max(0.0)) * 1000.0
    }

    fn mirrored(&self) -> Self {
        let mut item = self.clone();
        for (key, value) in item.values.iter_mut() {
            if MIRRORED_PROPERTIES.contains(&key.as_str()) {
                *value = -*value;
            }
        }
        item
    }
}

/// How many times the whole sequence plays again
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceRepeat {
    #[default]
    None,
    Count(u32),
    Infinite,
}

/// How items are transformed between repeats
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatType {
    #[default]
    Loop,
    /// Play the items in the opposite order
    Reverse,
    /// Negate horizontal movement and Y rotation
    Mirror,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceOptions {
    pub repeat: SequenceRepeat,
    /// Seconds between repeats
    pub repeat_delay: f64,
    pub repeat_type: RepeatType,
}

pub type ItemCallback = Box<dyn FnMut(usize, &SequenceItem) + Send>;
pub type SequenceCompleteCallback = Box<dyn FnMut() + Send>;

/// Frame-driven sequence playback
pub struct SequenceController {
    items: Vec<SequenceItem>,
    options: SequenceOptions,
    current_index: usize,
    playing: bool,
    paused_at_ms: Option<f64>,
    repeat_count: u32,
    item_start_ms: f64,
    last_frame_ms: f64,
    pending_repeat_ms: Option<f64>,
    label: String,
    on_item: Option<ItemCallback>,
    on_complete: Option<SequenceCompleteCallback>,
}

impl SequenceController {
    pub fn new(items: Vec<SequenceItem>, options: SequenceOptions) -> Self {
        Self {
            items,
            options,
            current_index: 0,
            playing: false,
            paused_at_ms: None,
            repeat_count: 0,
            item_start_ms: 0.0,
            last_frame_ms: 0.0,
            pending_repeat_ms: None,
            label: "sequence".to_string(),
            on_item: None,
            on_complete: None,
        }
    }

    /// Items sharing one animation, each delayed `stagger` seconds more than the last
    pub fn staggered(item: SequenceItem, count: usize, stagger: f64, options: SequenceOptions) -> Self {
        let items = (0..count)
            .map(|i| item.clone().with_delay(i as f64 * stagger))
            .collect();
        Self::new(items, options)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Called with the item index and item whenever an item begins
    pub fn on_item<F>(mut self, callback: F) -> Self
    where
        F: FnMut(usize, &SequenceItem) + Send + 'static,
    {
        self.on_item = Some(Box::new(callback));
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn items(&self) -> &[SequenceItem] {
        &self.items
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_item(&self) -> Option<&SequenceItem> {
        self.items.get(self.current_index)
    }

    /// Fraction of items already finished in this pass
    pub fn progress(&self) -> f64 {
        if self.items.is_empty() {
            0.0
        } else {
            self.current_index as f64 / self.items.len() as f64
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at_ms.is_some()
    }

    pub fn play(&mut self, now_ms: f64) {
        if self.playing {
            return;
        }
        self.playing = true;
        self.paused_at_ms = None;
        self.pending_repeat_ms = None;
        self.current_index = 0;
        self.item_start_ms = now_ms;
        self.last_frame_ms = now_ms;
        tracing::debug!(label = %self.label, items = self.items.len(), "sequence playing");
        self.begin_item();
    }

    /// Freeze item timing until [`resume`](Self::resume)
    pub fn pause(&mut self, now_ms: f64) {
        if self.playing && self.paused_at_ms.is_none() {
            self.paused_at_ms = Some(now_ms);
        }
    }

    pub fn resume(&mut self, now_ms: f64) {
        if let Some(paused_at) = self.paused_at_ms.take() {
            let shift = (now_ms - paused_at).max(0.0);
            self.item_start_ms += shift;
            if let Some(pending) = self.pending_repeat_ms.as_mut() {
                *pending += shift;
            }
        }
    }

    pub fn stop(&mut self) {
        self.playing = false;
        self.paused_at_ms = None;
        self.pending_repeat_ms = None;
        self.current_index = 0;
        self.repeat_count = 0;
    }

    /// Jump to item `index`; out-of-range indices are ignored
    pub fn seek(&mut self, index: usize) {
        if index < self.items.len() {
            self.current_index = index;
            self.item_start_ms = self.last_frame_ms;
        }
    }

    fn begin_item(&mut self) {
        let index = self.current_index;
        let Some(item) = self.items.get(index) else {
            return;
        };
        tracing::trace!(label = %self.label, index, "sequence item started");
        if let Some(on_item) = self.on_item.as_mut() {
            on_item(index, item);
        }
    }

    fn should_repeat(&self) -> bool {
        match self.options.repeat {
            SequenceRepeat::None => false,
            SequenceRepeat::Count(count) => self.repeat_count < count,
            SequenceRepeat::Infinite => true,
        }
    }

    fn prepare_repeat(&mut self) {
        match self.options.repeat_type {
            RepeatType::Loop => {}
            RepeatType::Reverse => self.items.reverse(),
            RepeatType::Mirror => {
                self.items = self.items.iter().map(SequenceItem::mirrored).collect();
            }
        }
    }
}

impl FrameDriven for SequenceController {
    fn on_frame(&mut self, now_ms: f64) -> FrameStatus {
        if !self.playing {
            return FrameStatus::Done;
        }
        if self.paused_at_ms.is_some() {
            return FrameStatus::Continue;
        }
        self.last_frame_ms = now_ms;

        if let Some(repeat_at) = self.pending_repeat_ms {
            if now_ms < repeat_at {
                return FrameStatus::Continue;
            }
            self.pending_repeat_ms = None;
            self.prepare_repeat();
            self.current_index = 0;
            self.item_start_ms = repeat_at;
            self.begin_item();
        }

        while let Some(item) = self.items.get(self.current_index) {
            let end = self.item_start_ms + item.span_ms();
            if now_ms < end {
                return FrameStatus::Continue;
            }
            self.item_start_ms = end;
            self.current_index += 1;
            self.begin_item();
        }

        if self.should_repeat() {
            self.repeat_count += 1;
            self.pending_repeat_ms = Some(self.item_start_ms + self.options.repeat_delay.max(0.0) * 1000.0);
            return FrameStatus::Continue;
        }

        self.playing = false;
        tracing::debug!(label = %self.label, "sequence complete");
        if let Some(on_complete) = self.on_complete.as_mut() {
            on_complete();
        }
        FrameStatus::Done
    }

    fn cancel(&mut self) {
        self.stop();
    }

    fn is_active(&self) -> bool {
        self.playing
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Debug for SequenceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceController")
            .field("label", &self.label)
            .field("current_index", &self.current_index)
            .field("playing", &self.playing)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
