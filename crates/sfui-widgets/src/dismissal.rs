#![forbid(unsafe_code)]

//! Persisted "don't show this again" flags.
//!
//! [`DismissalStore`] maps a stable per-affordance key onto the durable
//! key/value store. A key is dismissed when the store holds exactly
//! `"true"` under it.
//!
//! # Invariants
//!
//! 1. Monotonic: once `is_dismissed(key)` has been observed `true` in this
//!    process (or `dismiss(key)` was called), it stays `true` until
//!    [`reset`](DismissalStore::reset), even if later reads fail.
//! 2. `dismiss` never fails. The session flag is set before the write, so
//!    a failed write still hides the affordance for this session.
//!
//! # Failure Modes
//!
//! - Read failure, missing entry, or any value other than `"true"`: the key
//!   is not dismissed (fail-open). Read failures are logged at `warn`.
//! - Write failure: logged at `warn`; the session flag still holds.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use sfui_runtime::StorageBackend;

/// Value written for a dismissed key.
pub const DISMISSED_VALUE: &str = "true";

/// Session-cached view of persisted dismissal flags.
///
/// Cloning shares the backend and the session cache.
#[derive(Clone)]
pub struct DismissalStore {
    backend: Rc<dyn StorageBackend>,
    session: Rc<RefCell<HashSet<String>>>,
}

impl fmt::Debug for DismissalStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DismissalStore")
            .field("backend", &self.backend.name())
            .field("session", &*self.session.borrow())
            .finish()
    }
}

impl DismissalStore {
    #[must_use]
    pub fn new(backend: Rc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            session: Rc::new(RefCell::new(HashSet::new())),
        }
    }

    /// Whether `key` has been dismissed.
    pub fn is_dismissed(&self, key: &str) -> bool {
        if self.session.borrow().contains(key) {
            return true;
        }
        match self.backend.get(key) {
            Ok(Some(value)) if value == DISMISSED_VALUE => {
                self.session.borrow_mut().insert(key.to_owned());
                true
            }
            Ok(Some(value)) => {
                tracing::debug!(
                    target: "sfui.dismissal",
                    key,
                    value = %value,
                    "unrecognised dismissal value treated as not dismissed"
                );
                false
            }
            Ok(None) => false,
            Err(err) => {
                tracing::warn!(
                    target: "sfui.dismissal",
                    key,
                    backend = self.backend.name(),
                    error = %err,
                    "dismissal read failed; treating as not dismissed"
                );
                false
            }
        }
    }

    /// Mark `key` dismissed for this session and persist it.
    pub fn dismiss(&self, key: &str) {
        self.session.borrow_mut().insert(key.to_owned());
        match self.backend.set(key, DISMISSED_VALUE) {
            Ok(()) => {
                tracing::debug!(target: "sfui.dismissal", key, "dismissed");
            }
            Err(err) => {
                tracing::warn!(
                    target: "sfui.dismissal",
                    key,
                    backend = self.backend.name(),
                    error = %err,
                    "dismissal write failed; hidden for this session only"
                );
            }
        }
    }

    /// Clear `key` in the session cache and the backend.
    pub fn reset(&self, key: &str) {
        self.session.borrow_mut().remove(key);
        if let Err(err) = self.backend.remove(key) {
            tracing::warn!(
                target: "sfui.dismissal",
                key,
                error = %err,
                "dismissal reset failed"
            );
        }
    }

    #[must_use]
    pub fn backend(&self) -> &Rc<dyn StorageBackend> {
        &self.backend
    }
}
