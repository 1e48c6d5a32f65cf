//! Animation debugging context
//!
//! An explicitly constructed debugger that callers pass to whatever drives
//! their frames. It keeps a bounded timeline of animation lifecycle events
//! and simple frame metrics; everything is also emitted through `tracing`.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Debugger configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugOptions {
    /// Oldest entries are dropped beyond this count
    pub max_timeline_entries: usize,
    /// Keep value snapshots on timeline entries
    pub record_values: bool,
}

impl Default for DebugOptions {
    fn default() -> Self {
        Self {
            max_timeline_entries: 256,
            record_values: true,
        }
    }
}

/// Kind of lifecycle event recorded on the timeline
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebugEventKind {
    Start,
    Update,
    Complete,
    Cancel,
}

/// A single timeline record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub label: String,
    pub kind: DebugEventKind,
    pub timestamp_ms: f64,
    pub values: Vec<(String, f64)>,
}

/// Frame-rate and load figures
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Frames per second over the last completed one-second window
    pub fps: f64,
    pub frame_count: u64,
    pub active_animations: usize,
    pub last_update_ms: f64,
}

/// Explicit debugging context
#[derive(Clone, Debug, Default)]
pub struct AnimationDebugger {
    options: DebugOptions,
    timeline: VecDeque<TimelineEntry>,
    counts: FxHashMap<(String, DebugEventKind), usize>,
    metrics: PerformanceMetrics,
    window_start_ms: Option<f64>,
    window_frames: u32,
    paused: bool,
}

impl AnimationDebugger {
    pub fn new(options: DebugOptions) -> Self {
        tracing::debug!(?options, "animation debugger initialized");
        Self {
            options,
            ..Default::default()
        }
    }

    /// Record a lifecycle event for a labelled animation
    pub fn record<I, K>(&mut self, label: &str, kind: DebugEventKind, now_ms: f64, values: I)
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        if self.paused {
            return;
        }

        let values: Vec<(String, f64)> = if self.options.record_values {
            values.into_iter().map(|(k, v)| (k.into(), v)).collect()
        } else {
            Vec::new()
        };

        tracing::debug!(label, ?kind, now_ms, ?values, "animation event");

        *self.counts.entry((label.to_string(), kind)).or_default() += 1;

        if self.options.max_timeline_entries == 0 {
            return;
        }
        while self.timeline.len() >= self.options.max_timeline_entries {
            self.timeline.pop_front();
        }
        self.timeline.push_back(TimelineEntry {
            label: label.to_string(),
            kind,
            timestamp_ms: now_ms,
            values,
        });
    }

    /// Record that a frame was processed with `active` animations running
    pub fn record_frame(&mut self, now_ms: f64, active: usize) {
        if self.paused {
            return;
        }

        self.metrics.frame_count += 1;
        self.metrics.active_animations = active;
        self.metrics.last_update_ms = now_ms;

        let start = *self.window_start_ms.get_or_insert(now_ms);
        self.window_frames += 1;
        let span = now_ms - start;
        if span >= 1000.0 {
            self.metrics.fps = f64::from(self.window_frames - 1) * 1000.0 / span;
            self.window_start_ms = Some(now_ms);
            self.window_frames = 1;
        }
    }

    pub fn metrics(&self) -> PerformanceMetrics {
        self.metrics
    }

    /// Timeline entries, oldest first
    pub fn timeline(&self) -> impl Iterator<Item = &TimelineEntry> {
        self.timeline.iter()
    }

    /// How many times `kind` was recorded for `label` (not bounded by the timeline)
    pub fn event_count(&self, label: &str, kind: DebugEventKind) -> usize {
        self.counts
            .get(&(label.to_string(), kind))
            .copied()
            .unwrap_or(0)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn clear(&mut self) {
        self.timeline.clear();
        self.counts.clear();
        self.metrics = PerformanceMetrics::default();
        self.window_start_ms = None;
        self.window_frames = 0;
    }
}
