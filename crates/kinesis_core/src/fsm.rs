//! State Machine Runtime
//!
//! Typed flat state machines for gesture and momentum phases.
//! States describe their own transitions through [`StateTransitions`];
//! the machine tracks the current state and a bounded transition history.

use crate::events::EventType;
use std::hash::Hash;

/// Maximum number of transitions retained in history
const MAX_HISTORY: usize = 64;

/// A state type that knows its own transition table
pub trait StateTransitions:
    Clone + Copy + PartialEq + Eq + Hash + Send + Sync + std::fmt::Debug + 'static
{
    /// Handle an event and return the new state, or None if no transition
    fn on_event(&self, event: EventType) -> Option<Self>;
}

/// A state machine instance
#[derive(Clone, Debug)]
pub struct StateMachine<S: StateTransitions> {
    initial_state: S,
    current_state: S,
    /// History of state transitions (for debugging)
    history: Vec<(S, EventType, S)>,
}

impl<S: StateTransitions> StateMachine<S> {
    /// Create a new state machine in its initial state
    pub fn new(initial_state: S) -> Self {
        Self {
            initial_state,
            current_state: initial_state,
            history: Vec::new(),
        }
    }

    /// Get the current state
    pub fn current(&self) -> S {
        self.current_state
    }

    /// Check if we're in a specific state
    pub fn is_in(&self, state: S) -> bool {
        self.current_state == state
    }

    /// Check if an event can trigger a transition from current state
    pub fn can_send(&self, event: EventType) -> bool {
        self.current_state.on_event(event).is_some()
    }

    /// Send an event, returning the new state if a transition happened
    pub fn send(&mut self, event: EventType) -> Option<S> {
        let from = self.current_state;
        let to = from.on_event(event)?;

        self.current_state = to;
        if self.history.len() == MAX_HISTORY {
            self.history.remove(0);
        }
        self.history.push((from, event, to));
        tracing::trace!(?from, ?to, event, "state transition");

        Some(to)
    }

    /// Return to the initial state without recording a transition
    pub fn reset(&mut self) {
        self.current_state = self.initial_state;
    }

    /// Get transition history
    pub fn history(&self) -> &[(S, EventType, S)] {
        &self.history
    }

    /// Clear transition history
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

impl<S: StateTransitions + Default> Default for StateMachine<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
