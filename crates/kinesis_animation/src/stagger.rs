//! Stagger scheduling
//!
//! Spreads one shared clock across N elements so each activates after its
//! own delay. Elements are reindexed by direction before the delay is applied.

use kinesis_core::frame::{FrameDriven, FrameStatus};
use serde::{Deserialize, Serialize};

/// Order in which elements activate
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StaggerDirection {
    #[default]
    Forward,
    Reverse,
    /// Outwards from the `from` index
    From,
    /// Outwards from `floor(N / 2)`
    FromCenter,
    FromStart,
    FromEnd,
}

/// Stagger configuration. `delay` is in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaggerConfig {
    pub delay: f64,
    pub direction: StaggerDirection,
    /// Origin index for [`StaggerDirection::From`]
    pub from: usize,
    /// Accepted for config compatibility; has no effect on delays
    pub to: Option<usize>,
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self {
            delay: 0.1,
            direction: StaggerDirection::Forward,
            from: 0,
            to: None,
        }
    }
}

impl StaggerConfig {
    pub fn new(delay: f64) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn with_direction(mut self, direction: StaggerDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_from(mut self, from: usize) -> Self {
        self.from = from;
        self
    }
}

/// Reindex `index` of `total` elements according to `direction`
pub fn stagger_index(index: usize, total: usize, direction: StaggerDirection, from: usize) -> usize {
    let last = total.saturating_sub(1);
    match direction {
        StaggerDirection::Forward | StaggerDirection::FromStart => index,
        StaggerDirection::Reverse | StaggerDirection::FromEnd => last.saturating_sub(index),
        StaggerDirection::From => index.abs_diff(from),
        StaggerDirection::FromCenter => index.abs_diff(total / 2),
    }
}

/// Activation delay in seconds for element `index`
pub fn stagger_delay(index: usize, total: usize, config: &StaggerConfig) -> f64 {
    stagger_index(index, total, config.direction, config.from) as f64 * config.delay
}

/// Observable stagger progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StaggerState {
    pub is_staggering: bool,
    pub current_index: usize,
    pub total_elements: usize,
    /// Fraction of `N * delay` elapsed, never decreasing within a run
    pub progress: f64,
    pub direction: StaggerDirection,
}

pub type ActivateCallback = Box<dyn FnMut(usize, f64) + Send>;
pub type StaggerCompleteCallback = Box<dyn FnMut(&StaggerState) + Send>;

/// Frame-driven stagger over a fixed number of elements
pub struct StaggerScheduler {
    config: StaggerConfig,
    delays: Vec<f64>,
    activated: Vec<bool>,
    start_ms: f64,
    state: StaggerState,
    label: String,
    on_activate: Option<ActivateCallback>,
    on_complete: Option<StaggerCompleteCallback>,
}

impl StaggerScheduler {
    pub fn new(count: usize, config: StaggerConfig) -> Self {
        let delays = (0..count).map(|i| stagger_delay(i, count, &config)).collect();
        Self {
            config,
            delays,
            activated: vec![false; count],
            start_ms: 0.0,
            state: StaggerState::default(),
            label: "stagger".to_string(),
            on_activate: None,
            on_complete: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Called with `(index, delay_seconds)` the first frame an element is due
    pub fn on_activate<F>(mut self, callback: F) -> Self
    where
        F: FnMut(usize, f64) + Send + 'static,
    {
        self.on_activate = Some(Box::new(callback));
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&StaggerState) + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &StaggerConfig {
        &self.config
    }

    /// Per-element delays in seconds, by element index
    pub fn delays(&self) -> &[f64] {
        &self.delays
    }

    pub fn state(&self) -> StaggerState {
        self.state
    }

    pub fn is_activated(&self, index: usize) -> bool {
        self.activated.get(index).copied().unwrap_or(false)
    }

    /// Begin a run. Does nothing when there are no elements.
    pub fn start(&mut self, now_ms: f64) {
        let total = self.delays.len();
        if total == 0 {
            tracing::trace!(label = %self.label, "stagger started with no elements");
            return;
        }

        self.activated.iter_mut().for_each(|a| *a = false);
        self.start_ms = now_ms;
        self.state = StaggerState {
            is_staggering: true,
            current_index: 0,
            total_elements: total,
            progress: 0.0,
            direction: self.config.direction,
        };
        tracing::debug!(label = %self.label, total, delay = self.config.delay, "stagger started");
    }

    pub fn stop(&mut self) {
        self.state.is_staggering = false;
    }

    /// Stop and forget which elements have run
    pub fn reset(&mut self) {
        self.stop();
        self.activated.iter_mut().for_each(|a| *a = false);
        self.state = StaggerState::default();
    }

    fn activate(&mut self, index: usize) {
        if let Some(flag) = self.activated.get_mut(index) {
            *flag = true;
        }
        let delay = self.delays.get(index).copied().unwrap_or(0.0);
        tracing::trace!(label = %self.label, index, delay, "stagger element activated");
        if let Some(on_activate) = self.on_activate.as_mut() {
            on_activate(index, delay);
        }
    }
}

impl FrameDriven for StaggerScheduler {
    fn on_frame(&mut self, now_ms: f64) -> FrameStatus {
        if !self.state.is_staggering {
            return FrameStatus::Done;
        }

        let total = self.delays.len();
        let elapsed = ((now_ms - self.start_ms) / 1000.0).max(0.0);
        let duration = total as f64 * self.config.delay;
        let progress = if duration > 0.0 {
            (elapsed / duration).min(1.0)
        } else {
            1.0
        };

        self.state.progress = self.state.progress.max(progress);
        self.state.current_index = (self.state.progress * total as f64).floor() as usize;

        for index in 0..total {
            if !self.activated[index] && elapsed >= self.delays[index] {
                self.activate(index);
            }
        }

        if self.state.progress < 1.0 {
            return FrameStatus::Continue;
        }

        // `from` origins outside the list can push delays past N * delay
        for index in 0..total {
            if !self.activated[index] {
                self.activate(index);
            }
        }

        self.state.is_staggering = false;
        self.state.progress = 1.0;
        tracing::debug!(label = %self.label, "stagger complete");
        if let Some(on_complete) = self.on_complete.as_mut() {
            on_complete(&self.state);
        }
        FrameStatus::Done
    }

    fn cancel(&mut self) {
        self.stop();
    }

    fn is_active(&self) -> bool {
        self.state.is_staggering
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Debug for StaggerScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaggerScheduler")
            .field("label", &self.label)
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
