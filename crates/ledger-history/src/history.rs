#![forbid(unsafe_code)]

//! Dual undo/redo stacks holding recorded [`Action`]s.
//!
//! # Invariants
//!
//! 1. The redo stack is cleared whenever a new action is recorded. History
//!    is a single linear timeline; branching is not supported.
//! 2. `undo_stack.len() <= config.max_depth` after every record, and
//!    `max_depth >= 1`, so the action just recorded is always undoable.
//! 3. An action lives on exactly one stack at a time. It is never cloned.
//!
//! # Memory Model
//!
//! Actions are stored in `VecDeque` for O(1) eviction of the oldest entry
//! when a depth cap is configured.
//!
//! ```text
//! record(a5)
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [a1, a2, a3, a4, a5]              │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//!
//! undo() x2
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [a1, a2, a3]                      │
//! │ Redo Stack: [a5, a4]                          │
//! └───────────────────────────────────────────────┘
//!
//! record(a6)  <-- new timeline, clears redo
//! ┌───────────────────────────────────────────────┐
//! │ Undo Stack: [a1, a2, a3, a6]                  │
//! │ Redo Stack: []                                │
//! └───────────────────────────────────────────────┘
//! ```

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, warn};

use crate::action::Action;
use crate::config::HistoryConfig;

/// Undo and redo stacks for one open document.
pub struct History {
    /// Actions available for undo (newest at back).
    undo_stack: VecDeque<Action>,
    /// Actions available for redo (newest at back).
    redo_stack: VecDeque<Action>,
    config: HistoryConfig,
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl History {
    /// Create an empty history with the given configuration.
    ///
    /// A zero depth cap is raised to 1.
    #[must_use]
    pub fn new(mut config: HistoryConfig) -> Self {
        if config.max_depth == 0 {
            warn!("history max_depth of 0 raised to 1");
            config.max_depth = 1;
        }
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            config,
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Record an already-applied action.
    ///
    /// Discards the whole redo stack, then enforces the depth cap. Returns
    /// the number of old undo entries evicted by the cap. Evicted and
    /// discarded actions are dropped without running their closures.
    pub fn record(&mut self, action: Action) -> usize {
        self.redo_stack.clear();
        self.undo_stack.push_back(action);
        self.enforce_depth()
    }

    /// Drop every action on both stacks. Returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.undo_stack.len() + self.redo_stack.len();
        self.undo_stack.clear();
        self.redo_stack.clear();
        dropped
    }

    pub(crate) fn pop_undo(&mut self) -> Option<Action> {
        self.undo_stack.pop_back()
    }

    pub(crate) fn pop_redo(&mut self) -> Option<Action> {
        self.redo_stack.pop_back()
    }

    /// Push an undone action onto the redo stack.
    pub(crate) fn push_redo(&mut self, action: Action) {
        self.redo_stack.push_back(action);
    }

    /// Push a redone action back onto the undo stack without touching redo.
    pub(crate) fn push_undo(&mut self, action: Action) {
        self.undo_stack.push_back(action);
    }

    // ========================================================================
    // Info
    // ========================================================================

    /// Check if undo is available.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Description of the action the next undo would revert.
    #[must_use]
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(Action::description)
    }

    /// Description of the action the next redo would reapply.
    #[must_use]
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(Action::description)
    }

    /// Undo descriptions, most recent first.
    pub fn undo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.undo_stack
            .iter()
            .rev()
            .take(limit)
            .map(Action::description)
            .collect()
    }

    /// Redo descriptions, most recent first.
    pub fn redo_descriptions(&self, limit: usize) -> Vec<&str> {
        self.redo_stack
            .iter()
            .rev()
            .take(limit)
            .map(Action::description)
            .collect()
    }

    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    fn enforce_depth(&mut self) -> usize {
        let mut evicted = 0;
        while self.undo_stack.len() > self.config.max_depth {
            if let Some(oldest) = self.undo_stack.pop_front() {
                debug!(
                    description = oldest.description(),
                    max_depth = self.config.max_depth,
                    "evicted oldest history entry"
                );
                evicted += 1;
            }
        }
        evicted
    }
}
