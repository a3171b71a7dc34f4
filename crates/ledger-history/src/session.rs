#![forbid(unsafe_code)]

//! One open document and its history.
//!
//! A [`Session`] is built when a file is opened and its handles are passed
//! explicitly to every page or flow that records actions or listens for
//! StateChanged. There is no ambient accessor.
//!
//! Opening another document replaces the contents of the shared document
//! cell and clears the history, so an action recorded against the previous
//! document can never be replayed against the new one. Existing document and
//! manager handles stay valid and observe the new document.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::info;

use crate::config::HistoryConfig;
use crate::document::Document;
use crate::manager::CommandManager;

/// The active document plus its [`CommandManager`].
pub struct Session<D> {
    document: Rc<RefCell<D>>,
    commands: CommandManager,
}

impl<D: fmt::Debug> fmt::Debug for Session<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("document", &self.document)
            .field("commands", &self.commands)
            .finish()
    }
}

impl<D: Document + 'static> Session<D> {
    /// Open `document` with an unlimited history.
    #[must_use]
    pub fn new(document: D) -> Self {
        Self::with_config(document, HistoryConfig::default())
    }

    #[must_use]
    pub fn with_config(document: D, config: HistoryConfig) -> Self {
        Self {
            document: Rc::new(RefCell::new(document)),
            commands: CommandManager::new(config),
        }
    }

    /// Shared handle to the document, for flows that mutate it.
    #[must_use]
    pub fn document(&self) -> Rc<RefCell<D>> {
        Rc::clone(&self.document)
    }

    /// Shared handle to the history.
    #[must_use]
    pub fn commands(&self) -> CommandManager {
        self.commands.clone()
    }

    /// Borrow the document for reading.
    pub fn read(&self) -> Ref<'_, D> {
        self.document.borrow()
    }

    /// Replace the active document and discard the history.
    ///
    /// Subscribers are told exactly once, even when the history was already
    /// empty, so every view reloads from the new document. Returns the
    /// previous document.
    pub fn open(&self, document: D) -> D {
        let previous = self.document.replace(document);
        let dropped = self.commands.clear();
        if dropped == 0 {
            self.commands.state_changed().emit();
        }
        info!(dropped, "opened new document; history reset");
        previous
    }
}
