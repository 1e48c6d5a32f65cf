//! Timeline scheduling
//!
//! A timeline runs a single clock over a fixed duration and activates
//! segments anchored at millisecond offsets. Segment `i` is current while
//! `elapsed` lies in `[start_i, start_{i+1})`, where a missing `at` falls back
//! to an even split of the duration.

use kinesis_core::frame::{FrameDriven, FrameStatus};
use serde::{Deserialize, Serialize};

use crate::easing::Easing;

/// A point of interest on the timeline
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSegment {
    /// Start offset in milliseconds
    pub at: Option<f64>,
    /// Length used for the segment's local progress; defaults to the gap to the next segment
    pub duration: Option<f64>,
    pub easing: Option<Easing>,
    pub label: Option<String>,
}

impl TimelineSegment {
    pub fn at(at: f64) -> Self {
        Self {
            at: Some(at),
            ..Default::default()
        }
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = Some(easing);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// What happens when a playthrough finishes.
///
/// Besides `"loop"`, `"reverse"` and `{ count = n }`, a bare number is read as
/// a count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "RepeatRepr")]
pub enum Repeat {
    /// Play this many extra times
    Count(u32),
    /// Restart forever
    Loop,
    /// Reverse playback is not supported; the timeline finishes normally
    Reverse,
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum TaggedRepeat {
    Count(u32),
    Loop,
    Reverse,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RepeatRepr {
    Times(u32),
    Tagged(TaggedRepeat),
}

impl From<RepeatRepr> for Repeat {
    fn from(repr: RepeatRepr) -> Self {
        match repr {
            RepeatRepr::Times(count) | RepeatRepr::Tagged(TaggedRepeat::Count(count)) => {
                Repeat::Count(count)
            }
            RepeatRepr::Tagged(TaggedRepeat::Loop) => Repeat::Loop,
            RepeatRepr::Tagged(TaggedRepeat::Reverse) => Repeat::Reverse,
        }
    }
}

/// Timeline configuration. Times are in milliseconds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub duration: f64,
    pub segments: Vec<TimelineSegment>,
    pub repeat: Option<Repeat>,
    pub repeat_delay: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            duration: 1000.0,
            segments: Vec::new(),
            repeat: None,
            repeat_delay: 0.0,
        }
    }
}

/// Observable timeline progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineState {
    pub is_playing: bool,
    pub progress: f64,
    pub current_segment: usize,
    pub total_segments: usize,
    pub duration: f64,
    pub elapsed: f64,
}

pub type ProgressCallback = Box<dyn FnMut(f64) + Send>;
pub type SegmentCallback = Box<dyn FnMut(usize, &TimelineSegment) + Send>;

/// Frame-driven timeline with segment activation and repeats
pub struct TimelineScheduler {
    config: TimelineConfig,
    state: TimelineState,
    entered: Vec<bool>,
    start_ms: f64,
    last_frame_ms: f64,
    repeats_done: u32,
    pending_restart_ms: Option<f64>,
    label: String,
    on_start: Option<ProgressCallback>,
    on_update: Option<ProgressCallback>,
    on_complete: Option<ProgressCallback>,
    on_segment: Option<SegmentCallback>,
}

impl TimelineScheduler {
    pub fn new(config: TimelineConfig) -> Self {
        let total = config.segments.len();
        Self {
            state: TimelineState {
                total_segments: total,
                duration: config.duration,
                ..Default::default()
            },
            entered: vec![false; total],
            config,
            start_ms: 0.0,
            last_frame_ms: 0.0,
            repeats_done: 0,
            pending_restart_ms: None,
            label: "timeline".to_string(),
            on_start: None,
            on_update: None,
            on_complete: None,
            on_segment: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn on_start<F>(mut self, callback: F) -> Self
    where
        F: FnMut(f64) + Send + 'static,
    {
        self.on_start = Some(Box::new(callback));
        self
    }

    pub fn on_update<F>(mut self, callback: F) -> Self
    where
        F: FnMut(f64) + Send + 'static,
    {
        self.on_update = Some(Box::new(callback));
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnMut(f64) + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Called with the segment index the first time a playthrough reaches it
    pub fn on_segment<F>(mut self, callback: F) -> Self
    where
        F: FnMut(usize, &TimelineSegment) + Send + 'static,
    {
        self.on_segment = Some(Box::new(callback));
        self
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn state(&self) -> TimelineState {
        self.state
    }

    pub fn progress(&self) -> f64 {
        self.state.progress
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    /// Start offset of segment `index`
    pub fn segment_start(&self, index: usize) -> f64 {
        self.config
            .segments
            .get(index)
            .and_then(|s| s.at)
            .unwrap_or_else(|| self.even_split(index))
    }

    /// End offset of segment `index` (exclusive)
    pub fn segment_end(&self, index: usize) -> f64 {
        self.config
            .segments
            .get(index + 1)
            .and_then(|s| s.at)
            .unwrap_or_else(|| self.even_split(index + 1))
    }

    fn even_split(&self, index: usize) -> f64 {
        let total = self.config.segments.len();
        if total == 0 {
            return 0.0;
        }
        index as f64 * (self.config.duration / total as f64)
    }

    /// First segment whose interval contains `elapsed`
    pub fn segment_at(&self, elapsed: f64) -> Option<usize> {
        (0..self.config.segments.len())
            .find(|&i| elapsed >= self.segment_start(i) && elapsed < self.segment_end(i))
    }

    /// Eased local progress of segment `index` at the current elapsed time
    pub fn segment_progress(&self, index: usize) -> Option<f64> {
        let segment = self.config.segments.get(index)?;
        let start = self.segment_start(index);
        let length = segment
            .duration
            .unwrap_or_else(|| self.segment_end(index) - start);

        let local = if length > 0.0 {
            ((self.state.elapsed - start) / length).clamp(0.0, 1.0)
        } else if self.state.elapsed >= start {
            1.0
        } else {
            0.0
        };
        Some(match segment.easing {
            Some(easing) => easing.apply(local),
            None => local,
        })
    }

    /// Start or resume playback from the current elapsed time
    pub fn play(&mut self, now_ms: f64) {
        if self.state.is_playing {
            return;
        }
        self.pending_restart_ms = None;
        self.state.is_playing = true;
        self.start_ms = now_ms - self.state.elapsed;
        self.last_frame_ms = now_ms;
        tracing::debug!(label = %self.label, progress = self.state.progress, "timeline playing");
        if let Some(on_start) = self.on_start.as_mut() {
            on_start(self.state.progress);
        }
    }

    /// Halt playback, keeping the elapsed time. Also drops a scheduled repeat.
    pub fn pause(&mut self) {
        self.pending_restart_ms = None;
        self.state.is_playing = false;
    }

    pub fn stop(&mut self) {
        self.pause();
        self.repeats_done = 0;
        self.seek(0.0);
    }

    /// Jump to `progress` (clamped to 0..=1)
    pub fn seek(&mut self, progress: f64) {
        let progress = progress.clamp(0.0, 1.0);
        let elapsed = progress * self.config.duration;

        // Segments from the new position onwards can be entered again
        for index in 0..self.entered.len() {
            if self.segment_start(index) >= elapsed {
                self.entered[index] = false;
            }
        }

        self.state.progress = progress;
        self.state.elapsed = elapsed;
        if self.state.is_playing {
            self.start_ms = self.last_frame_ms - elapsed;
        }

        if let Some(on_update) = self.on_update.as_mut() {
            on_update(progress);
        }
        self.update_segments(elapsed);
    }

    fn update_segments(&mut self, elapsed: f64) {
        if let Some(index) = self.segment_at(elapsed) {
            self.state.current_segment = index;
        }

        for index in 0..self.entered.len() {
            if self.entered[index] || self.segment_start(index) > elapsed {
                continue;
            }
            self.entered[index] = true;
            tracing::trace!(label = %self.label, index, elapsed, "timeline segment entered");
            if let Some(on_segment) = self.on_segment.as_mut() {
                on_segment(index, &self.config.segments[index]);
            }
        }
    }

    fn restart(&mut self, now_ms: f64) {
        self.entered.iter_mut().for_each(|e| *e = false);
        self.state.elapsed = 0.0;
        self.state.progress = 0.0;
        self.state.current_segment = 0;
        self.play(now_ms);
    }

    fn finish(&mut self, now_ms: f64) -> FrameStatus {
        self.state.is_playing = false;
        tracing::debug!(label = %self.label, "timeline complete");
        if let Some(on_complete) = self.on_complete.as_mut() {
            on_complete(self.state.progress);
        }

        let restart = match self.config.repeat {
            None => false,
            Some(Repeat::Loop) => true,
            Some(Repeat::Count(count)) => {
                if self.repeats_done < count {
                    self.repeats_done += 1;
                    true
                } else {
                    false
                }
            }
            Some(Repeat::Reverse) => {
                tracing::warn!(label = %self.label, "reverse timeline repeat is not supported, finishing");
                false
            }
        };

        if restart {
            self.pending_restart_ms = Some(now_ms + self.config.repeat_delay.max(0.0));
            FrameStatus::Continue
        } else {
            // A later play() starts a fresh run with the full repeat budget
            self.repeats_done = 0;
            FrameStatus::Done
        }
    }
}

impl FrameDriven for TimelineScheduler {
    fn on_frame(&mut self, now_ms: f64) -> FrameStatus {
        if let Some(restart_at) = self.pending_restart_ms {
            if now_ms < restart_at {
                return FrameStatus::Continue;
            }
            self.restart(now_ms);
        }

        if !self.state.is_playing {
            return FrameStatus::Done;
        }

        self.last_frame_ms = now_ms;
        let duration = self.config.duration;
        let elapsed = (now_ms - self.start_ms).max(0.0);
        let progress = if duration > 0.0 {
            (elapsed / duration).min(1.0)
        } else {
            1.0
        };

        self.state.progress = progress;
        self.state.elapsed = elapsed.min(duration.max(0.0));

        if let Some(on_update) = self.on_update.as_mut() {
            on_update(progress);
        }
        self.update_segments(self.state.elapsed);

        if progress >= 1.0 {
            return self.finish(now_ms);
        }
        FrameStatus::Continue
    }

    fn cancel(&mut self) {
        self.pause();
    }

    fn is_active(&self) -> bool {
        self.state.is_playing || self.pending_restart_ms.is_some()
    }

    fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Debug for TimelineScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineScheduler")
            .field("label", &self.label)
            .field("state", &self.state)
            .field("repeat", &self.config.repeat)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn three_segments() -> TimelineConfig {
        TimelineConfig {
            duration: 2000.0,
            segments: vec![
                TimelineSegment::at(0.0),
                TimelineSegment::at(1000.0),
                TimelineSegment::at(2000.0),
            ],
            ..Default::default()
        }
    }

    fn recorder(timeline: TimelineScheduler) -> (TimelineScheduler, Arc<Mutex<Vec<usize>>>) {
        let entered = Arc::new(Mutex::new(Vec::new()));
        let e = Arc::clone(&entered);
        let timeline = timeline.on_segment(move |index, _| e.lock().unwrap().push(index));
        (timeline, entered)
    }

    #[test]
    fn test_segment_containment() {
        let timeline = TimelineScheduler::new(three_segments());
        assert_eq!(timeline.segment_at(0.0), Some(0));
        assert_eq!(timeline.segment_at(999.0), Some(0));
        assert_eq!(timeline.segment_at(1000.0), Some(1));
        assert_eq!(timeline.segment_at(1500.0), Some(1));
    }

    #[test]
    fn test_playing_selects_segment_by_elapsed() {
        let mut timeline = TimelineScheduler::new(three_segments());
        timeline.play(0.0);
        timeline.on_frame(1500.0);

        let state = timeline.state();
        assert_eq!(state.current_segment, 1);
        assert_eq!(state.elapsed, 1500.0);
        assert_eq!(state.progress, 0.75);
    }

    #[test]
    fn test_missing_offsets_split_duration_evenly() {
        let timeline = TimelineScheduler::new(TimelineConfig {
            duration: 900.0,
            segments: vec![TimelineSegment::default(); 3],
            ..Default::default()
        });
        assert_eq!(timeline.segment_start(1), 300.0);
        assert_eq!(timeline.segment_end(1), 600.0);
        assert_eq!(timeline.segment_at(650.0), Some(2));
    }

    #[test]
    fn test_segments_enter_once_and_in_order() {
        let (mut timeline, entered) = recorder(TimelineScheduler::new(three_segments()));
        timeline.play(0.0);
        timeline.on_frame(0.0);
        timeline.on_frame(100.0);
        assert_eq!(*entered.lock().unwrap(), vec![0]);

        // One long frame skips straight to the end
        assert_eq!(timeline.on_frame(2500.0), FrameStatus::Done);
        assert_eq!(*entered.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_pause_and_resume_keep_elapsed() {
        let mut timeline = TimelineScheduler::new(three_segments());
        timeline.play(0.0);
        timeline.on_frame(500.0);
        timeline.pause();
        assert_eq!(timeline.on_frame(5000.0), FrameStatus::Done);

        timeline.play(10_000.0);
        timeline.on_frame(10_250.0);
        assert_eq!(timeline.state().elapsed, 750.0);
    }

    #[test]
    fn test_stop_rewinds() {
        let mut timeline = TimelineScheduler::new(three_segments());
        timeline.play(0.0);
        timeline.on_frame(1200.0);
        timeline.stop();

        let state = timeline.state();
        assert!(!state.is_playing);
        assert_eq!(state.elapsed, 0.0);
        assert_eq!(state.progress, 0.0);
        assert_eq!(state.current_segment, 0);
    }

    #[test]
    fn test_seek_backwards_reenters_segments() {
        let (mut timeline, entered) = recorder(TimelineScheduler::new(three_segments()));
        timeline.seek(0.6);
        assert_eq!(*entered.lock().unwrap(), vec![0, 1]);

        timeline.seek(0.1);
        timeline.seek(0.6);
        assert_eq!(*entered.lock().unwrap(), vec![0, 1, 1]);
    }

    #[test]
    fn test_loop_restarts_after_delay() {
        let starts = Arc::new(Mutex::new(0));
        let s = Arc::clone(&starts);
        let mut timeline = TimelineScheduler::new(TimelineConfig {
            duration: 100.0,
            repeat: Some(Repeat::Loop),
            repeat_delay: 50.0,
            ..Default::default()
        })
        .on_start(move |_| *s.lock().unwrap() += 1);

        timeline.play(0.0);
        assert_eq!(timeline.on_frame(100.0), FrameStatus::Continue);
        assert!(!timeline.is_playing());
        assert!(timeline.is_active());

        timeline.on_frame(120.0);
        assert!(!timeline.is_playing());

        timeline.on_frame(150.0);
        assert!(timeline.is_playing());
        assert_eq!(timeline.progress(), 0.0);
        assert_eq!(*starts.lock().unwrap(), 2);

        timeline.on_frame(200.0);
        assert_eq!(timeline.progress(), 0.5);
    }

    #[test]
    fn test_count_repeats_then_finishes() {
        let completions = Arc::new(Mutex::new(0));
        let c = Arc::clone(&completions);
        let mut timeline = TimelineScheduler::new(TimelineConfig {
            duration: 100.0,
            repeat: Some(Repeat::Count(1)),
            ..Default::default()
        })
        .on_complete(move |_| *c.lock().unwrap() += 1);

        timeline.play(0.0);
        assert_eq!(timeline.on_frame(100.0), FrameStatus::Continue);
        assert_eq!(timeline.on_frame(110.0), FrameStatus::Continue);
        assert_eq!(timeline.on_frame(210.0), FrameStatus::Done);
        assert_eq!(*completions.lock().unwrap(), 2);
    }

    #[test]
    fn test_replay_after_finish_repeats_again() {
        let completions = Arc::new(Mutex::new(0));
        let c = Arc::clone(&completions);
        let mut timeline = TimelineScheduler::new(TimelineConfig {
            duration: 100.0,
            repeat: Some(Repeat::Count(1)),
            ..Default::default()
        })
        .on_complete(move |_| *c.lock().unwrap() += 1);

        timeline.play(0.0);
        timeline.on_frame(100.0);
        timeline.on_frame(110.0);
        assert_eq!(timeline.on_frame(210.0), FrameStatus::Done);

        timeline.seek(0.0);
        timeline.play(300.0);
        assert_eq!(timeline.on_frame(400.0), FrameStatus::Continue);
        assert_eq!(timeline.on_frame(410.0), FrameStatus::Continue);
        assert_eq!(timeline.on_frame(510.0), FrameStatus::Done);
        assert_eq!(*completions.lock().unwrap(), 4);
    }

    #[test]
    fn test_reverse_repeat_finishes() {
        let mut timeline = TimelineScheduler::new(TimelineConfig {
            duration: 100.0,
            repeat: Some(Repeat::Reverse),
            ..Default::default()
        });
        timeline.play(0.0);
        assert_eq!(timeline.on_frame(100.0), FrameStatus::Done);
        assert!(!timeline.is_active());
    }

    #[test]
    fn test_segment_progress_uses_easing() {
        let mut timeline = TimelineScheduler::new(TimelineConfig {
            duration: 1000.0,
            segments: vec![
                TimelineSegment::at(0.0).with_duration(200.0).with_easing(Easing::Step),
                TimelineSegment::at(500.0),
            ],
            ..Default::default()
        });
        timeline.seek(0.05);
        assert_eq!(timeline.segment_progress(0), Some(0.0));
        timeline.seek(0.15);
        assert_eq!(timeline.segment_progress(0), Some(1.0));
        timeline.seek(0.75);
        assert_eq!(timeline.segment_progress(1), Some(0.5));
        assert_eq!(timeline.segment_progress(7), None);
    }

    #[test]
    fn test_config_from_json() {
        let config: TimelineConfig =
            serde_json::from_str(r#"{"segments": [{"at": 0}, {"at": 250}], "repeat": "loop"}"#)
                .unwrap();
        assert_eq!(config.duration, 1000.0);
        assert_eq!(config.repeat, Some(Repeat::Loop));

        let counted: TimelineConfig = serde_json::from_str(r#"{"repeat": {"count": 2}}"#).unwrap();
        assert_eq!(counted.repeat, Some(Repeat::Count(2)));

        let bare: TimelineConfig = serde_json::from_str(r#"{"repeat": 3}"#).unwrap();
        assert_eq!(bare.repeat, Some(Repeat::Count(3)));

        let reverse: Repeat = serde_json::from_str(r#""reverse""#).unwrap();
        assert_eq!(reverse, Repeat::Reverse);
        assert!(serde_json::from_str::<Repeat>(r#""bounce""#).is_err());
    }
}
