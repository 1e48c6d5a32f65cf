//! Frame driving contract
//!
//! Every controller is advanced once per display frame by whoever owns the
//! frame clock. Steps never recurse within a frame; the next step happens on
//! the next call. Cancellation is cooperative: `cancel()` clears a flag and
//! the next `on_frame` call observes it and does nothing.

use std::time::Instant;

/// Outcome of a single frame step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    /// Wants another frame
    Continue,
    /// Finished or cancelled; no further frames needed
    Done,
}

impl FrameStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, FrameStatus::Done)
    }
}

/// Something advanced once per frame by a frame clock owner
pub trait FrameDriven {
    /// Advance to `now_ms`. Timestamps are monotonically non-decreasing.
    fn on_frame(&mut self, now_ms: f64) -> FrameStatus;

    /// Request cancellation; the next frame becomes a no-op
    fn cancel(&mut self);

    /// Whether the controller still expects frames
    fn is_active(&self) -> bool;

    /// Short name used in logs and the debugger timeline
    fn label(&self) -> &str {
        "animation"
    }
}

/// Source of monotonically increasing frame timestamps (milliseconds)
pub trait FrameClock {
    fn now_ms(&self) -> f64;
}

/// Wall clock backed by [`Instant`], measured from construction
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

/// Manually advanced clock for deterministic stepping
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ManualClock {
    now_ms: f64,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self { now_ms: start_ms }
    }

    /// Move time forward; negative deltas are ignored
    pub fn advance(&mut self, delta_ms: f64) -> f64 {
        if delta_ms > 0.0 {
            self.now_ms += delta_ms;
        }
        self.now_ms
    }

    /// Jump to an absolute time. Earlier times are ignored to stay monotonic.
    pub fn set(&mut self, now_ms: f64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

impl FrameClock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now_ms
    }
}

/// Convert a millisecond frame delta to seconds (never negative)
pub fn delta_seconds(prev_ms: f64, now_ms: f64) -> f64 {
    ((now_ms - prev_ms) / 1000.0).max(0.0)
}
