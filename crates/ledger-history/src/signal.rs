#![forbid(unsafe_code)]

//! Zero-payload broadcast with RAII subscriptions.
//!
//! # Design
//!
//! [`Signal`] keeps its subscribers as `Weak` callbacks in shared,
//! reference-counted storage (`Rc<RefCell<..>>`). The strong side lives in the
//! [`Subscription`] guard handed back by [`Signal::subscribe`], so a UI page
//! that drops its guard on teardown is detached automatically and a signal
//! that outlives the page never calls into it.
//!
//! Emitting carries no payload. Subscribers are told only that something
//! changed and re-derive whatever they show from the source of truth.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. No internal borrow is held while a callback runs, so callbacks may
//!    subscribe, drop guards, or emit again.
//! 3. A panicking subscriber does not stop the others from being notified.
//!    The panic is logged and swallowed.
//!
//! # Failure Modes
//!
//! - **Subscriber leak**: guards stored forever keep their callbacks alive.
//!   Dead weak references are pruned lazily during `emit()`.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use tracing::{error, info_span, trace};
use web_time::Instant;

type CallbackRc = Rc<dyn Fn()>;
type CallbackWeak = Weak<dyn Fn()>;

struct SignalInner {
    name: &'static str,
    subscribers: Vec<CallbackWeak>,
    emit_count: u64,
}

/// A named, zero-payload broadcast.
///
/// Cloning a `Signal` creates a new handle to the **same** subscriber list.
pub struct Signal {
    inner: Rc<RefCell<SignalInner>>,
}

// Manual Clone: shares the same Rc.
impl Clone for Signal {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Signal")
            .field("name", &inner.name)
            .field("subscriber_count", &inner.subscribers.len())
            .field("emit_count", &inner.emit_count)
            .finish()
    }
}

/// Outcome of one [`Signal::emit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Subscribers whose callback ran.
    pub notified: usize,
    /// Subscribers whose callback panicked.
    pub faulted: usize,
}

impl Signal {
    /// Create a signal. The name shows up in logs.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SignalInner {
                name,
                subscribers: Vec::new(),
                emit_count: 0,
            })),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.borrow().name
    }

    /// Register a callback.
    ///
    /// Returns a [`Subscription`] guard. Dropping the guard unsubscribes the
    /// callback; it will not run after the drop.
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> Subscription {
        let strong: CallbackRc = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription { callback: strong }
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .borrow()
            .subscribers
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    /// How many times this signal has been emitted.
    #[must_use]
    pub fn emit_count(&self) -> u64 {
        self.inner.borrow().emit_count
    }

    /// Notify every live subscriber, pruning dead ones.
    pub fn emit(&self) -> Delivery {
        // Snapshot weak handles so no borrow is held during calls. Each one is
        // upgraded only right before its call: a guard dropped by an earlier
        // subscriber in this same emit must not run.
        let (name, callbacks): (&'static str, Vec<CallbackWeak>) = {
            let mut inner = self.inner.borrow_mut();
            inner.emit_count += 1;
            inner.subscribers.retain(|w| w.strong_count() > 0);
            (inner.name, inner.subscribers.clone())
        };

        if callbacks.is_empty() {
            trace!(signal = name, "emitted with no subscribers");
            return Delivery::default();
        }

        let start = Instant::now();
        let span = info_span!(
            "signal.emit",
            signal = name,
            subscribers = callbacks.len(),
            duration_us = tracing::field::Empty
        );
        let _guard = span.enter();

        let mut delivery = Delivery::default();
        for weak in &callbacks {
            let Some(callback) = weak.upgrade() else {
                continue;
            };
            match panic::catch_unwind(AssertUnwindSafe(|| callback())) {
                Ok(()) => delivery.notified += 1,
                Err(payload) => {
                    delivery.faulted += 1;
                    error!(
                        signal = name,
                        panic = panic_message(payload.as_ref()),
                        "subscriber panicked; continuing with remaining subscribers"
                    );
                }
            }
        }

        span.record("duration_us", start.elapsed().as_micros() as u64);
        delivery
    }
}

/// RAII guard for a subscriber callback.
///
/// Holds the only strong reference to the callback. Once dropped, the weak
/// entry in the signal fails to upgrade and is pruned on the next emit.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    callback: CallbackRc,
}

impl Subscription {
    /// Detach the callback. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("strong_count", &Rc::strong_count(&self.callback))
            .finish_non_exhaustive()
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}
