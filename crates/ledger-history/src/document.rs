#![forbid(unsafe_code)]

//! Boundary to the edited document.
//!
//! The history engine never inspects a document. Action closures built by
//! the helpers in this crate only need to flag it as modified after they
//! mutate it, which is all [`Document`] asks for.

/// A shared aggregate that actions mutate.
pub trait Document {
    /// Flag unsaved changes. Called by action closures after every mutation.
    fn mark_modified(&mut self);

    /// Whether there are unsaved changes.
    fn is_modified(&self) -> bool;

    /// Clear the flag after the host persisted the document.
    fn mark_saved(&mut self);
}

/// Plain dirty flag for documents to embed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModifiedFlag(bool);

impl ModifiedFlag {
    pub fn mark(&mut self) {
        self.0 = true;
    }

    pub fn clear(&mut self) {
        self.0 = false;
    }

    #[must_use]
    pub fn get(self) -> bool {
        self.0
    }
}
