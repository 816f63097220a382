#![forbid(unsafe_code)]

//! Login prompts shown when a guest triggers a gated action.
//!
//! A [`LoginPrompt`] is a transient toast: a message naming the blocked
//! action plus a "go to login" affordance that carries the current route as
//! return intent. Hosts surface prompts through a [`PromptChannel`];
//! [`PromptQueue`] is the in-process implementation.
//!
//! # Invariants
//!
//! 1. Every `show` yields a fresh [`PromptId`]; prompts are never
//!    deduplicated (two blocked clicks give two prompts).
//! 2. A prompt leaves the queue exactly once: on `dismiss`, `accept`, or
//!    expiry in `tick`.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::navigation::{NavigationIntent, Navigator};

/// Route of the login page.
pub const DEFAULT_LOGIN_PATH: &str = "/pharmacy/login";

/// Default time a prompt stays visible.
pub const DEFAULT_PROMPT_DURATION: Duration = Duration::from_millis(4000);

const GENERIC_MESSAGE: &str = "Esta acción requiere iniciar sesión.";

/// Label of the embedded login button.
pub const LOGIN_ACTION_LABEL: &str = "Iniciar sesión";

// ---------------------------------------------------------------------------
// LoginPrompt
// ---------------------------------------------------------------------------

/// "This action requires login" prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPrompt {
    /// Label of the action that was blocked; may be empty.
    pub label: String,
    /// Route the user should come back to after logging in.
    pub return_to: String,
    /// Route of the login page.
    pub login_path: String,
}

impl LoginPrompt {
    #[must_use]
    pub fn new(label: impl Into<String>, return_to: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            return_to: return_to.into(),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
        }
    }

    #[must_use]
    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Text shown to the user.
    #[must_use]
    pub fn message(&self) -> String {
        let label = self.label.trim();
        if label.is_empty() {
            GENERIC_MESSAGE.to_owned()
        } else {
            format!("{label} requiere iniciar sesión.")
        }
    }

    /// Follow the embedded login affordance.
    pub fn accept(&self, navigator: &dyn Navigator) {
        navigator.navigate(
            &self.login_path,
            NavigationIntent::returning_to(self.return_to.clone()),
        );
    }
}

/// Identifier of a shown prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PromptId(u64);

impl PromptId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prompt#{}", self.0)
    }
}

/// Sink for login prompts.
pub trait PromptChannel {
    /// Display `prompt`. Must not block.
    fn show(&self, prompt: LoginPrompt) -> PromptId;
}

impl<P: PromptChannel + ?Sized> PromptChannel for Rc<P> {
    fn show(&self, prompt: LoginPrompt) -> PromptId {
        (**self).show(prompt)
    }
}

// ---------------------------------------------------------------------------
// PromptQueue
// ---------------------------------------------------------------------------

/// Prompt timing and routing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PromptConfig {
    /// How long a prompt stays visible (default: 4000ms).
    pub duration_ms: u64,
    /// Login route (default: `/pharmacy/login`).
    pub login_path: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_PROMPT_DURATION.as_millis() as u64,
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
        }
    }
}

impl PromptConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }

    #[must_use]
    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    #[must_use]
    pub fn display_duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// A prompt currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisiblePrompt {
    pub id: PromptId,
    pub prompt: LoginPrompt,
    pub remaining: Duration,
}

#[derive(Debug, Default)]
struct QueueInner {
    next_id: u64,
    visible: Vec<VisiblePrompt>,
    shown_total: u64,
}

/// In-process prompt queue with timed expiry.
#[derive(Debug, Default)]
pub struct PromptQueue {
    config: PromptConfig,
    inner: RefCell<QueueInner>,
}

impl PromptQueue {
    #[must_use]
    pub fn new(config: PromptConfig) -> Self {
        Self {
            config,
            inner: RefCell::new(QueueInner::default()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &PromptConfig {
        &self.config
    }

    /// Prompts on screen, oldest first.
    #[must_use]
    pub fn visible(&self) -> Vec<VisiblePrompt> {
        self.inner.borrow().visible.clone()
    }

    #[must_use]
    pub fn visible_count(&self) -> usize {
        self.inner.borrow().visible.len()
    }

    /// Prompts shown since creation.
    #[must_use]
    pub fn shown_total(&self) -> u64 {
        self.inner.borrow().shown_total
    }

    /// Remove a prompt. Returns it if it was still visible.
    pub fn dismiss(&self, id: PromptId) -> Option<LoginPrompt> {
        let mut inner = self.inner.borrow_mut();
        let idx = inner.visible.iter().position(|p| p.id == id)?;
        let entry = inner.visible.remove(idx);
        tracing::debug!(target: "sfui.prompt", %id, "prompt dismissed");
        Some(entry.prompt)
    }

    /// Press the prompt's login button: dismiss it and navigate to login.
    ///
    /// Returns `false` if the prompt was already gone.
    pub fn accept(&self, id: PromptId, navigator: &dyn Navigator) -> bool {
        match self.dismiss(id) {
            Some(prompt) => {
                prompt.accept(navigator);
                true
            }
            None => false,
        }
    }

    /// Age visible prompts by `dt`, removing expired ones.
    ///
    /// Returns the ids that expired.
    pub fn tick(&self, dt: Duration) -> Vec<PromptId> {
        let mut inner = self.inner.borrow_mut();
        let mut expired = Vec::new();
        inner.visible.retain_mut(|p| {
            p.remaining = p.remaining.saturating_sub(dt);
            if p.remaining.is_zero() {
                expired.push(p.id);
                false
            } else {
                true
            }
        });
        if !expired.is_empty() {
            tracing::trace!(target: "sfui.prompt", count = expired.len(), "prompts expired");
        }
        expired
    }
}

impl PromptChannel for PromptQueue {
    fn show(&self, prompt: LoginPrompt) -> PromptId {
        let mut inner = self.inner.borrow_mut();
        inner.next_id += 1;
        inner.shown_total += 1;
        let id = PromptId(inner.next_id);
        tracing::debug!(
            target: "sfui.prompt",
            %id,
            label = %prompt.label,
            return_to = %prompt.return_to,
            "login prompt shown"
        );
        inner.visible.push(VisiblePrompt {
            id,
            prompt,
            remaining: self.config.display_duration(),
        });
        id
    }
}
