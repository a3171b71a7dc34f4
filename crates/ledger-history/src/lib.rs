#![forbid(unsafe_code)]

//! Ledger History
//!
//! Reversible-action history for the ledger desktop application: every CRUD
//! flow (customers, departments, suppliers, rentals, expenses) records what
//! it changed so the user can undo and redo it, and every open page reloads
//! when the history moves.
//!
//! # Key Components
//!
//! - [`Action`] - One reversible mutation: description, undo, redo
//! - [`History`] - Undo and redo stacks with linear-timeline discipline
//! - [`CommandManager`] - Records and replays actions, fires StateChanged
//! - [`Signal`] / [`Subscription`] - Zero-payload broadcast with RAII unsubscribe
//! - [`Session`] - One open document plus its manager, passed explicitly
//! - [`snapshot`] / [`collection`] - Builders for the common edit, add and
//!   remove actions
//!
//! # How it fits in the system
//!
//! ```text
//! CRUD flow ──mutate──► Document ◄──re-read── page (subscriber)
//!     │                    ▲                        ▲
//!     └─record_action─►  CommandManager ──StateChanged┘
//!                          │   ▲
//!                     undo │   │ redo (closures re-mutate Document)
//! ```
//!
//! The engine knows nothing about entity types. Closures built by the
//! helpers flag the document modified themselves; the manager never does.
//!
//! # Threading
//!
//! Everything here is single-threaded (`Rc`-based, `!Send`). All calls run
//! synchronously on the edit thread.

pub mod action;
pub mod collection;
pub mod config;
pub mod document;
pub mod history;
pub mod manager;
pub mod session;
pub mod signal;
pub mod snapshot;

pub use action::{Action, ActionGroup};
pub use collection::{Keyed, insert_action, insert_entity, remove_action, remove_entity};
pub use config::{ConfigError, HistoryConfig};
pub use document::{Document, ModifiedFlag};
pub use history::History;
pub use manager::{CommandManager, STATE_CHANGED};
pub use session::Session;
pub use signal::{Delivery, Signal, Subscription};
pub use snapshot::{Snapshot, edit_entity, snapshot_action};
