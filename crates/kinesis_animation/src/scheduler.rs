//! Animation scheduler
//!
//! Owns frame-driven animations and advances all of them once per frame.
//! Finished animations are dropped; cancelled ones are flagged immediately and
//! removed on the next tick without being stepped again.

use kinesis_core::debug::{AnimationDebugger, DebugEventKind};
use kinesis_core::frame::{FrameClock, FrameDriven, FrameStatus};
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

new_key_type! {
    pub struct AnimationId;
}

struct ScheduledAnimation {
    animation: Box<dyn FrameDriven + Send>,
    cancelled: bool,
}

/// The animation scheduler that ticks all active animations
#[derive(Default)]
pub struct AnimationScheduler {
    animations: SlotMap<AnimationId, ScheduledAnimation>,
    debugger: Option<AnimationDebugger>,
    last_tick_ms: f64,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a debugger that records lifecycle events and frame metrics
    pub fn with_debugger(mut self, debugger: AnimationDebugger) -> Self {
        self.debugger = Some(debugger);
        self
    }

    pub fn debugger(&self) -> Option<&AnimationDebugger> {
        self.debugger.as_ref()
    }

    pub fn debugger_mut(&mut self) -> Option<&mut AnimationDebugger> {
        self.debugger.as_mut()
    }

    /// Schedule an already started animation
    pub fn add<A>(&mut self, animation: A) -> AnimationId
    where
        A: FrameDriven + Send + 'static,
    {
        self.add_boxed(Box::new(animation))
    }

    pub fn add_boxed(&mut self, animation: Box<dyn FrameDriven + Send>) -> AnimationId {
        if let Some(debugger) = self.debugger.as_mut() {
            debugger.record(
                animation.label(),
                DebugEventKind::Start,
                self.last_tick_ms,
                std::iter::empty::<(String, f64)>(),
            );
        }
        self.animations.insert(ScheduledAnimation {
            animation,
            cancelled: false,
        })
    }

    /// Cancel an animation. It is not stepped again and is removed on the next tick.
    pub fn cancel(&mut self, id: AnimationId) -> bool {
        match self.animations.get_mut(id) {
            Some(entry) if !entry.cancelled => {
                entry.cancelled = true;
                entry.animation.cancel();
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, id: AnimationId) -> bool {
        self.animations
            .get(id)
            .is_some_and(|entry| !entry.cancelled)
    }

    pub fn get(&self, id: AnimationId) -> Option<&(dyn FrameDriven + Send)> {
        self.animations
            .get(id)
            .filter(|entry| !entry.cancelled)
            .map(|entry| entry.animation.as_ref())
    }

    /// Tick all animations at `now_ms`; returns how many are still running
    pub fn tick(&mut self, now_ms: f64) -> usize {
        self.last_tick_ms = now_ms;
        let mut finished: SmallVec<[(AnimationId, DebugEventKind); 8]> = SmallVec::new();

        for (id, entry) in self.animations.iter_mut() {
            if entry.cancelled {
                finished.push((id, DebugEventKind::Cancel));
                continue;
            }
            if entry.animation.on_frame(now_ms) == FrameStatus::Done {
                finished.push((id, DebugEventKind::Complete));
            }
        }

        for (id, kind) in finished {
            if let Some(entry) = self.animations.remove(id) {
                tracing::trace!(label = entry.animation.label(), ?kind, "animation removed");
                if let Some(debugger) = self.debugger.as_mut() {
                    debugger.record(
                        entry.animation.label(),
                        kind,
                        now_ms,
                        std::iter::empty::<(String, f64)>(),
                    );
                }
            }
        }

        let active = self.animations.len();
        if let Some(debugger) = self.debugger.as_mut() {
            debugger.record_frame(now_ms, active);
        }
        active
    }

    /// Tick using the clock's current time
    pub fn tick_clock(&mut self, clock: &dyn FrameClock) -> usize {
        self.tick(clock.now_ms())
    }

    /// Check if any animations are still active
    pub fn has_active_animations(&self) -> bool {
        self.animations
            .values()
            .any(|entry| !entry.cancelled && entry.animation.is_active())
    }

    /// Get the number of animations in the scheduler
    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

impl std::fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("animations", &self.animations.len())
            .field("has_debugger", &self.debugger.is_some())
            .finish()
    }
}
