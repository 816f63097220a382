#![forbid(unsafe_code)]

//! Observable value wrapper with change notification and version tracking.
//!
//! # Design
//!
//! [`Observable<T>`] wraps a value in shared, reference-counted storage
//! (`Rc<RefCell<..>>`). When the value changes (by `PartialEq`), all live
//! subscribers are notified in registration order. The authentication
//! provider is exposed to widgets as an `Observable<AuthState>` so that
//! visibility can be recomputed on every login, logout, or role change.
//!
//! # Invariants
//!
//! 1. `version` increments by exactly 1 on each value-changing mutation.
//! 2. `set(v)` where `v == current` is a no-op.
//! 3. Subscribers are notified in registration order.
//! 4. A dropped [`Subscription`] guard is never called again.
//!
//! # Failure Modes
//!
//! - **Re-entrant set**: the value borrow is released before callbacks run,
//!   so a subscriber may call `set()`; the nested change notifies
//!   synchronously before the outer loop continues.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct ObservableInner<T> {
    value: T,
    version: u64,
    /// Dead entries are pruned on notify.
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning an `Observable` creates a new handle to the **same** state.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create a new observable at version 0 with no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Get a clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value, notifying subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Modify the value in place, notifying subscribers if it changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let old = inner.value.clone();
            f(&mut inner.value);
            if inner.value != old {
                inner.version += 1;
                true
            } else {
                false
            }
        };
        if changed {
            self.notify();
        }
    }

    /// Subscribe to value changes.
    ///
    /// Dropping the returned guard unsubscribes.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        let weak = Rc::downgrade(&strong);
        self.inner.borrow_mut().subscribers.push(weak);
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Increments by 1 on each value-changing mutation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registered subscribers, including dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        let (callbacks, value, version) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let callbacks: Vec<CallbackRc<T>> =
                inner.subscribers.iter().filter_map(Weak::upgrade).collect();
            (callbacks, inner.value.clone(), inner.version)
        };
        if callbacks.is_empty() {
            return;
        }

        let _span = tracing::debug_span!(
            "sfui.observable.notify",
            version,
            subscribers = callbacks.len()
        )
        .entered();
        for cb in &callbacks {
            cb(&value);
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Holds the only strong reference to the callback; the observable keeps a
/// `Weak` that stops upgrading once this guard is dropped.
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthState, Role};
    use std::cell::Cell;

    #[test]
    fn get_set_and_version() {
        let auth = Observable::new(AuthState::anonymous());
        assert_eq!(auth.version(), 0);

        auth.set(AuthState::signed_in(Role::Client));
        assert!(auth.get().is_authenticated);
        assert_eq!(auth.version(), 1);

        // Same value: no bump.
        auth.set(AuthState::signed_in(Role::Client));
        assert_eq!(auth.version(), 1);
    }

    #[test]
    fn subscribers_see_role_changes_in_order() {
        let auth = Observable::new(AuthState::anonymous());
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        let _a = auth.subscribe(move |s: &AuthState| first.borrow_mut().push(("a", s.role.clone())));
        let second = Rc::clone(&log);
        let _b = auth.subscribe(move |s: &AuthState| second.borrow_mut().push(("b", s.role.clone())));

        auth.set(AuthState::signed_in(Role::Doctor));
        assert_eq!(
            *log.borrow(),
            vec![("a", Some(Role::Doctor)), ("b", Some(Role::Doctor))]
        );
    }

    #[test]
    fn dropped_subscription_is_not_called() {
        let auth = Observable::new(AuthState::anonymous());
        let calls = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&calls);
        let sub = auth.subscribe(move |_| c.set(c.get() + 1));

        auth.set(AuthState::signed_in(Role::Client));
        drop(sub);
        auth.set(AuthState::anonymous());
        assert_eq!(calls.get(), 1);
        // Pruned on the notify that followed the drop.
        assert_eq!(auth.subscriber_count(), 0);
    }

    #[test]
    fn update_in_place_notifies_once() {
        let auth = Observable::new(AuthState::signed_in(Role::Client));
        let calls = Rc::new(Cell::new(0u32));
        let c = Rc::clone(&calls);
        let _sub = auth.subscribe(move |_| c.set(c.get() + 1));

        auth.update(|s| s.role = Some(Role::Admin));
        auth.update(|s| s.role = Some(Role::Admin));
        assert_eq!(calls.get(), 1);
        assert_eq!(auth.with(|s| s.role.clone()), Some(Role::Admin));
    }

    #[test]
    fn clones_share_value_and_subscribers() {
        let a = Observable::new(0u32);
        let b = a.clone();
        let seen = Rc::new(Cell::new(0u32));
        let s = Rc::clone(&seen);
        let _sub = a.subscribe(move |v| s.set(*v));

        b.set(7);
        assert_eq!(a.get(), 7);
        assert_eq!(seen.get(), 7);
    }

    #[test]
    fn reentrant_set_from_subscriber() {
        let obs = Observable::new(0u32);
        let inner = obs.clone();
        let _sub = obs.subscribe(move |v| {
            if *v == 1 {
                inner.set(2);
            }
        });
        obs.set(1);
        assert_eq!(obs.get(), 2);
        assert_eq!(obs.version(), 2);
    }
}
