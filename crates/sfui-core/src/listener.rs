#![forbid(unsafe_code)]

//! Scoped input listener subscriptions.
//!
//! A drag needs global move/release listeners, but only for the duration of
//! the gesture. [`ListenerRegistry::acquire`] hands out a [`ListenerGuard`]
//! representing one attached move/release pair; dropping the guard detaches
//! it. Because release happens in `Drop`, every exit path (normal release,
//! cancellation, teardown of the owning widget, unwinding) detaches.
//!
//! Hosts that attach real listeners (e.g. `window.addEventListener`) can
//! consult [`ListenerRegistry::active`] to mirror the attached set.
//!
//! # Invariants
//!
//! 1. `active()` equals the number of live guards from this registry.
//! 2. A guard releases exactly once, whether through `release()` or drop.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

#[derive(Default)]
struct RegistryInner {
    active: Cell<usize>,
    acquired: Cell<u64>,
}

/// Shared, single-threaded counter of attached listener pairs.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Rc<RegistryInner>,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("active", &self.active())
            .field("acquired", &self.total_acquired())
            .finish()
    }
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach one move/release listener pair.
    #[must_use = "dropping the guard detaches the listeners immediately"]
    pub fn acquire(&self) -> ListenerGuard {
        self.inner.active.set(self.inner.active.get() + 1);
        self.inner.acquired.set(self.inner.acquired.get() + 1);
        tracing::trace!(
            target: "sfui.listener",
            active = self.inner.active.get(),
            "listener pair attached"
        );
        ListenerGuard {
            inner: Rc::clone(&self.inner),
            released: false,
        }
    }

    /// Number of currently attached listener pairs.
    #[must_use]
    pub fn active(&self) -> usize {
        self.inner.active.get()
    }

    /// Total pairs ever attached through this registry.
    #[must_use]
    pub fn total_acquired(&self) -> u64 {
        self.inner.acquired.get()
    }
}

/// RAII handle for an attached move/release listener pair.
pub struct ListenerGuard {
    inner: Rc<RegistryInner>,
    released: bool,
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("released", &self.released)
            .finish()
    }
}

impl ListenerGuard {
    /// Detach the listeners now.
    pub fn release(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        let active = self.inner.active.get().saturating_sub(1);
        self.inner.active.set(active);
        tracing::trace!(target: "sfui.listener", active, "listener pair detached");
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.detach();
    }
}
