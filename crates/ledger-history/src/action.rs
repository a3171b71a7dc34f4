#![forbid(unsafe_code)]

//! Reversible actions recorded into the history.
//!
//! An [`Action`] is one reversible mutation of a document: a human-readable
//! description plus an `undo` and a `redo` operation. The mutation itself has
//! already been applied by the time the action is built; the action only
//! knows how to move the document back and forth across it.
//!
//! # Invariants
//!
//! - `redo()` replays captured concrete values. It never recomputes derived
//!   data (fresh identifiers, timestamps), so repeated undo/redo cycles land
//!   on exactly the same state.
//! - Closures are `Fn`, not `FnMut`: an action is never mutated after
//!   creation, only moved between the undo and redo stacks.
//!
//! # Failure Modes
//!
//! - **Stale reference**: the entity a closure targets is gone. The closure
//!   must skip its mutation; the helpers in [`crate::snapshot`] and
//!   [`crate::collection`] already do.
//!
//! # Named actions
//!
//! Call sites that prefer a domain name ("`CustomerAdded`") implement
//! `From<Named> for Action`. [`crate::CommandManager::record_action`] accepts
//! anything `Into<Action>`, so named and generic actions share one contract.

use std::fmt;
use std::rc::Rc;

/// Boxed zero-argument operation stored inside an [`Action`].
pub type ActionFn = Box<dyn Fn()>;

/// One reversible mutation: description plus undo and redo closures.
pub struct Action {
    description: String,
    undo: ActionFn,
    redo: ActionFn,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl Action {
    /// Create an action from a description and its two operations.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        undo: impl Fn() + 'static,
        redo: impl Fn() + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            undo: Box::new(undo),
            redo: Box::new(redo),
        }
    }

    /// Human-readable description ("Delete customer 'Jane Doe'").
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Revert the mutation.
    pub fn undo(&self) {
        (self.undo)();
    }

    /// Reapply the mutation.
    pub fn redo(&self) {
        (self.redo)();
    }
}

/// Several actions that undo and redo as a single history entry.
///
/// Used for bulk operations ("Delete 3 customers") that the user should be
/// able to reverse in one step. Members undo in reverse order and redo in
/// recording order.
pub struct ActionGroup {
    description: String,
    actions: Vec<Action>,
}

impl fmt::Debug for ActionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionGroup")
            .field("description", &self.description)
            .field("actions", &self.actions.len())
            .finish()
    }
}

impl ActionGroup {
    /// Create an empty group.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            actions: Vec::new(),
        }
    }

    /// Append an already-applied action.
    pub fn push(&mut self, action: impl Into<Action>) {
        self.actions.push(action.into());
    }

    /// Number of member actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Collapse the group into a single action.
    ///
    /// Returns `None` for an empty group: there is nothing to reverse, so
    /// nothing should reach the history.
    #[must_use]
    pub fn into_action(self) -> Option<Action> {
        if self.actions.is_empty() {
            return None;
        }
        let members = Rc::new(self.actions);
        let for_undo = Rc::clone(&members);
        let for_redo = members;
        Some(Action::new(
            self.description,
            move || {
                for action in for_undo.iter().rev() {
                    action.undo();
                }
            },
            move || {
                for action in for_redo.iter() {
                    action.redo();
                }
            },
        ))
    }
}
