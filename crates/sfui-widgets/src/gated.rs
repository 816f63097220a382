#![forbid(unsafe_code)]

//! Authentication-gated user actions.
//!
//! Privileged storefront actions (add to cart, favourite, buy now) run only
//! for signed-in users. A guest who triggers one gets a login prompt that
//! remembers the current route, and the action itself is dropped: there is
//! no queueing or replay after login.
//!
//! # Invariants
//!
//! 1. Unauthenticated: the action never runs and the prompt callback runs
//!    exactly once, synchronously, per dispatch.
//! 2. Authenticated: the action runs exactly once and no prompt is shown.
//! 3. The auth status is read at dispatch time, never cached.

use std::fmt;
use std::rc::Rc;

use sfui_runtime::{
    AuthProvider, DEFAULT_LOGIN_PATH, LoginPrompt, Navigator, PromptChannel, PromptConfig,
    PromptId,
};

/// Labels of the catalog's gated actions.
pub mod labels {
    pub const ADD_TO_CART: &str = "Agregar al carrito";
    pub const FAVORITES: &str = "Favoritos";
    pub const BUY_NOW: &str = "Comprar ahora";
}

/// A privileged action evaluated at call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatedAction {
    pub label: String,
    pub authenticated: bool,
}

/// Outcome of a gated dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Gated<R> {
    /// The action ran and produced this value.
    Executed(R),
    /// The user is not signed in; a login prompt was requested instead.
    Denied,
}

impl<R> Gated<R> {
    #[must_use]
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed(_))
    }

    #[must_use]
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied)
    }

    /// The action's result, if it ran.
    pub fn executed(self) -> Option<R> {
        match self {
            Self::Executed(value) => Some(value),
            Self::Denied => None,
        }
    }
}

/// Run `action` if `authenticated`, otherwise call
/// `on_prompt(label, current_route)` once.
pub fn dispatch_gated<R>(
    action: impl FnOnce() -> R,
    label: &str,
    authenticated: bool,
    current_route: &str,
    on_prompt: impl FnOnce(&str, &str),
) -> Gated<R> {
    if authenticated {
        tracing::debug!(target: "sfui.gated", label, "gated action executed");
        Gated::Executed(action())
    } else {
        tracing::debug!(
            target: "sfui.gated",
            label,
            return_to = current_route,
            "gated action denied; prompting login"
        );
        on_prompt(label, current_route);
        Gated::Denied
    }
}

/// [`dispatch_gated`] bound to the page's collaborators.
pub struct GatedActionDispatcher {
    auth: AuthProvider,
    navigator: Rc<dyn Navigator>,
    prompts: Rc<dyn PromptChannel>,
    login_path: String,
}

impl fmt::Debug for GatedActionDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatedActionDispatcher")
            .field("auth", &self.auth)
            .field("login_path", &self.login_path)
            .finish_non_exhaustive()
    }
}

impl GatedActionDispatcher {
    #[must_use]
    pub fn new(
        auth: AuthProvider,
        navigator: Rc<dyn Navigator>,
        prompts: Rc<dyn PromptChannel>,
    ) -> Self {
        Self {
            auth,
            navigator,
            prompts,
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
        }
    }

    /// Take the login route from `config`.
    #[must_use]
    pub fn with_config(mut self, config: &PromptConfig) -> Self {
        self.login_path.clone_from(&config.login_path);
        self
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Snapshot `label` against the current auth status.
    #[must_use]
    pub fn gate(&self, label: &str) -> GatedAction {
        GatedAction {
            label: label.to_owned(),
            authenticated: self.auth.with(|s| s.is_authenticated),
        }
    }

    /// Run `action` for a signed-in user, or show a login prompt.
    pub fn dispatch<R>(&self, label: &str, action: impl FnOnce() -> R) -> Gated<R> {
        self.dispatch_tracked(label, action).0
    }

    /// Like [`dispatch`](Self::dispatch), also returning the id of the
    /// prompt shown on denial.
    pub fn dispatch_tracked<R>(
        &self,
        label: &str,
        action: impl FnOnce() -> R,
    ) -> (Gated<R>, Option<PromptId>) {
        let GatedAction {
            label,
            authenticated,
        } = self.gate(label);
        let route = self.navigator.current_route();
        let mut shown = None;
        let outcome = dispatch_gated(action, &label, authenticated, &route, |label, route| {
            let prompt = LoginPrompt::new(label, route).with_login_path(self.login_path.clone());
            shown = Some(self.prompts.show(prompt));
        });
        (outcome, shown)
    }
}
