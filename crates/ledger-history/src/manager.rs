#![forbid(unsafe_code)]

//! Command manager: records actions, replays them, broadcasts StateChanged.
//!
//! [`CommandManager`] is the single entry point CRUD flows and pages use to
//! touch the history. It is a cheap-to-clone handle: every clone shares one
//! [`History`] and one StateChanged [`Signal`], so the manager created when a
//! document is opened can be handed explicitly to every component that needs
//! it.
//!
//! # Transitions
//!
//! | Call              | Empty stack        | Otherwise                                   |
//! |-------------------|--------------------|---------------------------------------------|
//! | `record_action`   | n/a                | push undo, clear redo, emit                 |
//! | `undo`            | no-op, no emit     | pop undo, run `undo()`, push redo, emit      |
//! | `redo`            | no-op, no emit     | pop redo, run `redo()`, push undo, emit      |
//! | `clear`           | no-op, no emit     | drop both stacks (no closures run), emit    |
//!
//! StateChanged fires exactly once per committed transition, strictly after
//! both the stack transition and the document mutation have completed.
//!
//! # Re-entrancy
//!
//! No borrow of the history is held while an action closure or a subscriber
//! runs. Subscribers may read `can_undo()`/`undo_label()` to refresh their
//! controls. While an action closure runs, its action sits on neither stack.
//!
//! # Failure Modes
//!
//! - **Panicking action**: the panic is caught and logged, and the action
//!   still moves to the opposite stack so bookkeeping stays consistent.
//! - **Panicking subscriber**: isolated by [`Signal::emit`].

use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{error, info_span, trace};

use crate::action::Action;
use crate::config::HistoryConfig;
use crate::history::History;
use crate::signal::{Signal, Subscription, panic_message};

/// Name of the broadcast fired after every committed transition.
pub const STATE_CHANGED: &str = "state_changed";

/// Shared handle to one document's undo/redo history.
#[derive(Clone)]
pub struct CommandManager {
    history: Rc<RefCell<History>>,
    state_changed: Signal,
}

impl fmt::Debug for CommandManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandManager")
            .field("history", &*self.history.borrow())
            .field("subscribers", &self.state_changed.subscriber_count())
            .finish()
    }
}

impl Default for CommandManager {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

#[derive(Clone, Copy)]
enum Direction {
    Undo,
    Redo,
}

impl Direction {
    fn name(self) -> &'static str {
        match self {
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }
}

impl CommandManager {
    /// Create a manager with an empty history.
    #[must_use]
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            history: Rc::new(RefCell::new(History::new(config))),
            state_changed: Signal::new(STATE_CHANGED),
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Record an action whose mutation has already been applied.
    ///
    /// Clears the redo stack and fires StateChanged once. The action's
    /// closures are not invoked.
    pub fn record_action(&self, action: impl Into<Action>) {
        let action = action.into();
        let span = info_span!(
            "history.record",
            description = action.description(),
            undo_depth = tracing::field::Empty,
            evicted = tracing::field::Empty
        );
        let _guard = span.enter();

        let (undo_depth, evicted) = {
            let mut history = self.history.borrow_mut();
            let evicted = history.record(action);
            (history.undo_depth(), evicted)
        };
        span.record("undo_depth", undo_depth);
        span.record("evicted", evicted);

        self.notify();
    }

    /// Revert the most recent action.
    ///
    /// Returns its description, or `None` (without notifying) when there is
    /// nothing to undo.
    pub fn undo(&self) -> Option<String> {
        self.replay(Direction::Undo)
    }

    /// Reapply the most recently undone action.
    ///
    /// Returns its description, or `None` (without notifying) when there is
    /// nothing to redo.
    pub fn redo(&self) -> Option<String> {
        self.replay(Direction::Redo)
    }

    /// Drop the whole history without running any closures.
    ///
    /// Fires StateChanged once if anything was dropped. Returns the number of
    /// actions dropped.
    pub fn clear(&self) -> usize {
        let dropped = self.history.borrow_mut().clear();
        if dropped == 0 {
            trace!("history already empty; clear is a no-op");
            return 0;
        }
        let _guard = info_span!("history.clear", dropped).entered();
        self.notify();
        dropped
    }

    fn replay(&self, direction: Direction) -> Option<String> {
        let popped = {
            let mut history = self.history.borrow_mut();
            match direction {
                Direction::Undo => history.pop_undo(),
                Direction::Redo => history.pop_redo(),
            }
        };
        let Some(action) = popped else {
            trace!(op = direction.name(), "stack empty; nothing to replay");
            return None;
        };

        let description = action.description().to_string();
        let span = match direction {
            Direction::Undo => info_span!(
                "history.undo",
                description = %description,
                undo_depth = tracing::field::Empty,
                redo_depth = tracing::field::Empty
            ),
            Direction::Redo => info_span!(
                "history.redo",
                description = %description,
                undo_depth = tracing::field::Empty,
                redo_depth = tracing::field::Empty
            ),
        };
        let _guard = span.enter();

        // The history is not borrowed here: closures may read the manager.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match direction {
            Direction::Undo => action.undo(),
            Direction::Redo => action.redo(),
        }));
        if let Err(payload) = outcome {
            error!(
                op = direction.name(),
                description = %description,
                panic = panic_message(payload.as_ref()),
                "action panicked; history transition still applied"
            );
        }

        let (undo_depth, redo_depth) = {
            let mut history = self.history.borrow_mut();
            match direction {
                Direction::Undo => history.push_redo(action),
                Direction::Redo => history.push_undo(action),
            }
            (history.undo_depth(), history.redo_depth())
        };
        span.record("undo_depth", undo_depth);
        span.record("redo_depth", redo_depth);

        self.notify();
        Some(description)
    }

    fn notify(&self) {
        let delivery = self.state_changed.emit();
        if delivery.faulted > 0 {
            trace!(
                notified = delivery.notified,
                faulted = delivery.faulted,
                "state change delivered with faults"
            );
        }
    }

    // ========================================================================
    // Notification
    // ========================================================================

    /// Subscribe to StateChanged.
    ///
    /// Keep the returned guard for as long as the subscriber lives; dropping
    /// it unsubscribes.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        self.state_changed.subscribe(callback)
    }

    /// Handle to the StateChanged signal itself.
    #[must_use]
    pub fn state_changed(&self) -> Signal {
        self.state_changed.clone()
    }

    // ========================================================================
    // Info
    // ========================================================================

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.borrow().can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.borrow().can_redo()
    }

    /// Description of the action the next undo would revert.
    #[must_use]
    pub fn undo_description(&self) -> Option<String> {
        self.history.borrow().undo_description().map(str::to_string)
    }

    /// Description of the action the next redo would reapply.
    #[must_use]
    pub fn redo_description(&self) -> Option<String> {
        self.history.borrow().redo_description().map(str::to_string)
    }

    /// Control label such as `Undo: Delete customer 'Jane Doe'`.
    #[must_use]
    pub fn undo_label(&self) -> Option<String> {
        self.history
            .borrow()
            .undo_description()
            .map(|d| format!("Undo: {d}"))
    }

    /// Control label such as `Redo: Add department 'Sales'`.
    #[must_use]
    pub fn redo_label(&self) -> Option<String> {
        self.history
            .borrow()
            .redo_description()
            .map(|d| format!("Redo: {d}"))
    }

    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.history.borrow().undo_depth()
    }

    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.history.borrow().redo_depth()
    }

    /// Undo descriptions, most recent first.
    #[must_use]
    pub fn undo_descriptions(&self, limit: usize) -> Vec<String> {
        self.history
            .borrow()
            .undo_descriptions(limit)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Redo descriptions, most recent first.
    #[must_use]
    pub fn redo_descriptions(&self, limit: usize) -> Vec<String> {
        self.history
            .borrow()
            .redo_descriptions(limit)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    #[must_use]
    pub fn config(&self) -> HistoryConfig {
        self.history.borrow().config().clone()
    }
}
