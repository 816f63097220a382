#![forbid(unsafe_code)]

//! Route navigation seam.
//!
//! The host router implements [`Navigator`]. Navigation is fire-and-forget:
//! the kernel never waits for a route change and never observes failure.

use std::cell::RefCell;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Extra state handed to the destination route.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NavigationIntent {
    /// Ask the destination to open its primary modal on arrival.
    pub open_modal: bool,
    /// Route to come back to after a detour (login).
    pub return_to: Option<String>,
}

impl NavigationIntent {
    /// No extra state.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            open_modal: false,
            return_to: None,
        }
    }

    #[must_use]
    pub const fn open_modal() -> Self {
        Self {
            open_modal: true,
            return_to: None,
        }
    }

    #[must_use]
    pub fn returning_to(route: impl Into<String>) -> Self {
        Self {
            open_modal: false,
            return_to: Some(route.into()),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.open_modal && self.return_to.is_none()
    }
}

/// Host router.
pub trait Navigator {
    /// Go to `path`, carrying `intent`.
    fn navigate(&self, path: &str, intent: NavigationIntent);

    /// Route currently displayed.
    fn current_route(&self) -> String;
}

/// One recorded navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRecord {
    pub path: String,
    pub intent: NavigationIntent,
}

/// In-memory router that records every navigation.
pub struct MemoryNavigator {
    current: RefCell<String>,
    history: RefCell<Vec<NavigationRecord>>,
}

impl fmt::Debug for MemoryNavigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryNavigator")
            .field("current", &*self.current.borrow())
            .field("navigations", &self.history.borrow().len())
            .finish()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl MemoryNavigator {
    #[must_use]
    pub fn new(initial_route: impl Into<String>) -> Self {
        Self {
            current: RefCell::new(initial_route.into()),
            history: RefCell::new(Vec::new()),
        }
    }

    /// Every navigation so far, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<NavigationRecord> {
        self.history.borrow().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<NavigationRecord> {
        self.history.borrow().last().cloned()
    }

    #[must_use]
    pub fn navigation_count(&self) -> usize {
        self.history.borrow().len()
    }

    /// Change the current route without recording a navigation (the user
    /// followed an ordinary link).
    pub fn set_current_route(&self, route: impl Into<String>) {
        *self.current.borrow_mut() = route.into();
    }
}

impl Navigator for MemoryNavigator {
    fn navigate(&self, path: &str, intent: NavigationIntent) {
        tracing::debug!(
            target: "sfui.navigation",
            from = %self.current.borrow(),
            to = path,
            open_modal = intent.open_modal,
            return_to = intent.return_to.as_deref(),
            "navigate"
        );
        *self.current.borrow_mut() = path.to_owned();
        self.history.borrow_mut().push(NavigationRecord {
            path: path.to_owned(),
            intent,
        });
    }

    fn current_route(&self) -> String {
        self.current.borrow().clone()
    }
}

impl<N: Navigator + ?Sized> Navigator for std::rc::Rc<N> {
    fn navigate(&self, path: &str, intent: NavigationIntent) {
        (**self).navigate(path, intent);
    }

    fn current_route(&self) -> String {
        (**self).current_route()
    }
}
