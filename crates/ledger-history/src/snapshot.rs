#![forbid(unsafe_code)]

//! Snapshot/restore helpers for field edits.
//!
//! Editing an entity in place follows one pattern everywhere: capture the
//! old field values, apply the new ones, and build an action whose closures
//! restore either side. [`Snapshot`] names the captured record and
//! [`snapshot_action`] / [`edit_entity`] build the action from it.
//!
//! # Invariants
//!
//! - Snapshots are captured by value when the action is built, never read
//!   back from the live entity later.
//! - The closures hold only a weak reference to the document. Once the
//!   document is dropped they do nothing.
//!
//! # Failure Modes
//!
//! - **Stale reference**: `locate` returns `None` at replay time. The closure
//!   logs at debug level and skips the mutation and the modified flag.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::action::Action;
use crate::document::Document;

/// An entity whose editable fields can be captured and restored.
pub trait Snapshot {
    /// Captured field values.
    type State: Clone + 'static;

    fn capture(&self) -> Self::State;

    fn restore(&mut self, state: &Self::State);
}

/// Build an action that flips an entity between two captured states.
///
/// `locate` finds the entity inside the document on every replay; it is
/// typically a lookup by identifier.
pub fn snapshot_action<D, E, L>(
    doc: &Rc<RefCell<D>>,
    description: impl Into<String>,
    locate: L,
    before: E::State,
    after: E::State,
) -> Action
where
    D: Document + 'static,
    E: Snapshot + 'static,
    L: Fn(&mut D) -> Option<&mut E> + 'static,
{
    let description = description.into();
    let locate = Rc::new(locate);
    let undo = restorer::<D, E, L>(
        Rc::downgrade(doc),
        Rc::clone(&locate),
        before,
        &description,
    );
    let redo = restorer::<D, E, L>(Rc::downgrade(doc), locate, after, &description);
    Action::new(description, undo, redo)
}

/// Capture, mutate, capture again, flag the document, and build the action.
///
/// Returns `None` without touching the document when `locate` cannot find
/// the entity.
pub fn edit_entity<D, E, L, F>(
    doc: &Rc<RefCell<D>>,
    description: impl Into<String>,
    locate: L,
    mutate: F,
) -> Option<Action>
where
    D: Document + 'static,
    E: Snapshot + 'static,
    L: Fn(&mut D) -> Option<&mut E> + 'static,
    F: FnOnce(&mut E),
{
    let (before, after) = {
        let mut guard = doc.borrow_mut();
        let entity = locate(&mut *guard)?;
        let before = entity.capture();
        mutate(&mut *entity);
        let after = entity.capture();
        guard.mark_modified();
        (before, after)
    };
    Some(snapshot_action(doc, description, locate, before, after))
}

fn restorer<D, E, L>(
    doc: Weak<RefCell<D>>,
    locate: Rc<L>,
    state: E::State,
    description: &str,
) -> impl Fn() + 'static
where
    D: Document + 'static,
    E: Snapshot + 'static,
    L: Fn(&mut D) -> Option<&mut E> + 'static,
{
    let description = description.to_string();
    move || {
        let Some(doc) = doc.upgrade() else {
            debug!(description = %description, "document dropped; skipping");
            return;
        };
        let mut guard = doc.borrow_mut();
        let Some(entity) = (*locate)(&mut *guard) else {
            debug!(description = %description, "entity not found; skipping");
            return;
        };
        entity.restore(&state);
        guard.mark_modified();
    }
}
