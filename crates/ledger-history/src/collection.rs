#![forbid(unsafe_code)]

//! Add/remove helpers for keyed entity lists.
//!
//! Creating or deleting an entity is reversed by removing or re-inserting a
//! captured copy of it. The copy is taken when the action is built, so redo
//! re-inserts the very same record (same identifier, same fields) instead of
//! building a new one.
//!
//! Entities are matched by [`Keyed::key`], never by position: other actions
//! may have reordered the list since this one was recorded. The captured
//! index is only a placement hint, clamped to the current length.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::action::Action;
use crate::document::Document;

/// An entity with a stable identity inside its list.
pub trait Keyed {
    type Key: Clone + PartialEq + fmt::Debug + 'static;

    fn key(&self) -> Self::Key;
}

/// Build an action for an entity the caller already inserted.
///
/// Undo removes it by key; redo re-inserts the captured copy where it was.
pub fn insert_action<D, E, C>(
    doc: &Rc<RefCell<D>>,
    description: impl Into<String>,
    collection: C,
    entity: E,
) -> Action
where
    D: Document + 'static,
    E: Keyed + Clone + 'static,
    C: Fn(&mut D) -> &mut Vec<E> + 'static,
{
    let index = {
        let mut guard = doc.borrow_mut();
        let items = collection(&mut *guard);
        position(items.as_slice(), &entity.key()).unwrap_or(items.len())
    };
    let description = description.into();
    let collection = Rc::new(collection);
    let undo = remover::<D, E, C>(
        Rc::downgrade(doc),
        Rc::clone(&collection),
        entity.key(),
        &description,
    );
    let redo = inserter(Rc::downgrade(doc), collection, entity, index, &description);
    Action::new(description, undo, redo)
}

/// Build an action for an entity the caller already removed from `index`.
///
/// Undo re-inserts the captured copy at `index`; redo removes it by key.
pub fn remove_action<D, E, C>(
    doc: &Rc<RefCell<D>>,
    description: impl Into<String>,
    collection: C,
    entity: E,
    index: usize,
) -> Action
where
    D: Document + 'static,
    E: Keyed + Clone + 'static,
    C: Fn(&mut D) -> &mut Vec<E> + 'static,
{
    let description = description.into();
    let collection = Rc::new(collection);
    let key = entity.key();
    let undo = inserter(
        Rc::downgrade(doc),
        Rc::clone(&collection),
        entity,
        index,
        &description,
    );
    let redo = remover::<D, E, C>(Rc::downgrade(doc), collection, key, &description);
    Action::new(description, undo, redo)
}

/// Append `entity`, flag the document, and build the matching action.
///
/// Returns `None` without touching the document if an entity with the same
/// key is already present.
pub fn insert_entity<D, E, C>(
    doc: &Rc<RefCell<D>>,
    description: impl Into<String>,
    collection: C,
    entity: E,
) -> Option<Action>
where
    D: Document + 'static,
    E: Keyed + Clone + 'static,
    C: Fn(&mut D) -> &mut Vec<E> + 'static,
{
    {
        let mut guard = doc.borrow_mut();
        let items = collection(&mut *guard);
        if position(items.as_slice(), &entity.key()).is_some() {
            return None;
        }
        items.push(entity.clone());
        guard.mark_modified();
    }
    Some(insert_action(doc, description, collection, entity))
}

/// Remove the entity with `key`, flag the document, and build the action.
///
/// Returns `None` without touching the document if no such entity exists.
pub fn remove_entity<D, E, C>(
    doc: &Rc<RefCell<D>>,
    description: impl Into<String>,
    collection: C,
    key: &E::Key,
) -> Option<Action>
where
    D: Document + 'static,
    E: Keyed + Clone + 'static,
    C: Fn(&mut D) -> &mut Vec<E> + 'static,
{
    let (entity, index) = {
        let mut guard = doc.borrow_mut();
        let items = collection(&mut *guard);
        let index = position(items.as_slice(), key)?;
        let entity = items.remove(index);
        guard.mark_modified();
        (entity, index)
    };
    Some(remove_action(doc, description, collection, entity, index))
}

fn position<E: Keyed>(items: &[E], key: &E::Key) -> Option<usize> {
    items.iter().position(|item| item.key() == *key)
}

fn inserter<D, E, C>(
    doc: Weak<RefCell<D>>,
    collection: Rc<C>,
    entity: E,
    index: usize,
    description: &str,
) -> impl Fn() + 'static
where
    D: Document + 'static,
    E: Keyed + Clone + 'static,
    C: Fn(&mut D) -> &mut Vec<E> + 'static,
{
    let description = description.to_string();
    move || {
        let Some(doc) = doc.upgrade() else {
            debug!(description = %description, "document dropped; skipping");
            return;
        };
        let mut guard = doc.borrow_mut();
        let items = (*collection)(&mut *guard);
        let key = entity.key();
        if position(items.as_slice(), &key).is_some() {
            debug!(description = %description, ?key, "entity already present; skipping");
            return;
        }
        let at = index.min(items.len());
        items.insert(at, entity.clone());
        guard.mark_modified();
    }
}

fn remover<D, E, C>(
    doc: Weak<RefCell<D>>,
    collection: Rc<C>,
    key: E::Key,
    description: &str,
) -> impl Fn() + 'static
where
    D: Document + 'static,
    E: Keyed + Clone + 'static,
    C: Fn(&mut D) -> &mut Vec<E> + 'static,
{
    let description = description.to_string();
    move || {
        let Some(doc) = doc.upgrade() else {
            debug!(description = %description, "document dropped; skipping");
            return;
        };
        let mut guard = doc.borrow_mut();
        let items = (*collection)(&mut *guard);
        let Some(at) = position(items.as_slice(), &key) else {
            debug!(description = %description, ?key, "entity not found; skipping");
            return;
        };
        items.remove(at);
        guard.mark_modified();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ModifiedFlag;

    #[derive(Debug, Clone, PartialEq)]
    struct Department {
        id: u32,
        name: &'static str,
    }

    impl Keyed for Department {
        type Key = u32;

        fn key(&self) -> u32 {
            self.id
        }
    }

    #[derive(Default)]
    struct Org {
        departments: Vec<Department>,
        modified: ModifiedFlag,
    }

    impl Document for Org {
        fn mark_modified(&mut self) {
            self.modified.mark();
        }
        fn is_modified(&self) -> bool {
            self.modified.get()
        }
        fn mark_saved(&mut self) {
            self.modified.clear();
        }
    }

    fn departments(org: &mut Org) -> &mut Vec<Department> {
        &mut org.departments
    }

    fn dept(id: u32, name: &'static str) -> Department {
        Department { id, name }
    }

    fn names(doc: &Rc<RefCell<Org>>) -> Vec<&'static str> {
        doc.borrow().departments.iter().map(|d| d.name).collect()
    }

    fn org(depts: Vec<Department>) -> Rc<RefCell<Org>> {
        Rc::new(RefCell::new(Org {
            departments: depts,
            modified: ModifiedFlag::default(),
        }))
    }

    #[test]
    fn insert_entity_roundtrip() {
        let doc = org(vec![dept(1, "Sales")]);
        let action = insert_entity(&doc, "Add department 'Ops'", departments, dept(2, "Ops"))
            .expect("new key");
        assert_eq!(names(&doc), ["Sales", "Ops"]);
        assert!(doc.borrow().is_modified());

        action.undo();
        assert_eq!(names(&doc), ["Sales"]);
        action.redo();
        assert_eq!(names(&doc), ["Sales", "Ops"]);
    }

    #[test]
    fn insert_entity_rejects_duplicate_key() {
        let doc = org(vec![dept(1, "Sales")]);
        assert!(insert_entity(&doc, "dup", departments, dept(1, "Other")).is_none());
        assert_eq!(names(&doc), ["Sales"]);
        assert!(!doc.borrow().is_modified());
    }

    #[test]
    fn remove_entity_restores_position() {
        let doc = org(vec![dept(1, "Sales"), dept(2, "Ops"), dept(3, "HR")]);
        let action = remove_entity(&doc, "Delete department 'Ops'", departments, &2)
            .expect("key exists");
        assert_eq!(names(&doc), ["Sales", "HR"]);

        action.undo();
        assert_eq!(names(&doc), ["Sales", "Ops", "HR"]);
        action.redo();
        assert_eq!(names(&doc), ["Sales", "HR"]);
    }

    #[test]
    fn remove_entity_missing_key() {
        let doc = org(vec![dept(1, "Sales")]);
        assert!(remove_entity(&doc, "Delete", departments, &9).is_none());
        assert!(!doc.borrow().is_modified());
    }

    #[test]
    fn redo_reinserts_same_identity() {
        let doc = org(Vec::new());
        let action = insert_entity(&doc, "Add", departments, dept(42, "R&D")).expect("new");
        for _ in 0..3 {
            action.undo();
            action.redo();
        }
        assert_eq!(doc.borrow().departments, [dept(42, "R&D")]);
    }

    #[test]
    fn stale_entities_are_skipped() {
        let doc = org(vec![dept(1, "Sales")]);
        let action = remove_entity(&doc, "Delete", departments, &1).expect("exists");

        // Re-created outside the history before undo.
        doc.borrow_mut().departments.push(dept(1, "Sales (restored)"));
        action.undo();
        assert_eq!(names(&doc), ["Sales (restored)"]);

        // Removed outside the history before redo.
        doc.borrow_mut().departments.clear();
        doc.borrow_mut().mark_saved();
        action.redo();
        assert!(names(&doc).is_empty());
        assert!(!doc.borrow().is_modified());
    }

    #[test]
    fn index_hint_is_clamped() {
        let doc = org(vec![dept(1, "A"), dept(2, "B"), dept(3, "C")]);
        let action = remove_entity(&doc, "Delete C", departments, &3).expect("exists");
        doc.borrow_mut().departments.truncate(1);

        action.undo();
        assert_eq!(names(&doc), ["A", "C"]);
    }
}
