//! The DFA runtime. A passive structure produced by the compiler: states with their
//! interval-set transition tables and a default successor per state. It never mutates after
//! construction and can therefore be shared freely.

use serde::{Deserialize, Serialize};

use super::{char_set::CharSet, StateID};

/// A single DFA state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct DfaState {
    pub(crate) id: StateID,
    /// The source expression vector is nullable here.
    pub(crate) accepting: bool,
    /// The source expression vector is final here; no further input can change acceptance.
    pub(crate) is_final: bool,
    /// The exceptional transitions. The character sets are pairwise disjoint.
    pub(crate) transitions: Vec<(CharSet, StateID)>,
    /// The successor for every character not covered by an exceptional transition.
    pub(crate) default: StateID,
}

/// The deterministic automaton. The start state is always state 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Dfa {
    states: Vec<DfaState>,
}

impl Dfa {
    pub(crate) fn new(states: Vec<DfaState>) -> Self {
        debug_assert!(!states.is_empty());
        Dfa { states }
    }

    /// The start state.
    #[inline]
    pub(crate) fn start(&self) -> StateID {
        StateID::new(0)
    }

    #[inline]
    pub(crate) fn state(&self, id: StateID) -> &DfaState {
        &self.states[id]
    }

    pub(crate) fn states(&self) -> &[DfaState] {
        &self.states
    }

    /// Advance one character: the exceptional transition containing `c` if present, else the
    /// default successor.
    pub(crate) fn step(&self, state: StateID, c: char) -> StateID {
        let state = &self.states[state];
        for (set, target) in &state.transitions {
            if set.contains(c) {
                return *target;
            }
        }
        state.default
    }

    /// Walk the whole input and report acceptance. A convenience driver for whole-string
    /// matching; the streaming scanner does not use it.
    pub(crate) fn matches(&self, input: &str) -> bool {
        let mut state = self.start();
        for c in input.chars() {
            state = self.step(state, c);
            if self.states[state].is_final {
                break;
            }
        }
        self.states[state].accepting
    }
}
