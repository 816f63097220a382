#![forbid(unsafe_code)]

//! Runtime: the collaborator seams of the storefront kernel.
//!
//! # Key Components
//!
//! - [`Observable`] / [`AuthProvider`] - change-notifying auth status
//! - [`TimerScheduler`] - single-threaded repeating timers on a virtual clock
//! - [`StorageBackend`] - durable key/value store ([`MemoryStorage`], [`FileStorage`])
//! - [`Navigator`] - host router ([`MemoryNavigator`])
//! - [`PromptChannel`] - login prompts ([`PromptQueue`])
//!
//! # Role in sfui
//! `sfui-runtime` sits between the input layer (`sfui-core`) and the
//! widgets. Everything here is single-threaded and event driven; nothing
//! blocks.

pub mod auth;
pub mod navigation;
pub mod prompt;
pub mod reactive;
pub mod state_persistence;
pub mod timer;

pub use auth::{AuthProvider, AuthState, Role};
pub use navigation::{MemoryNavigator, NavigationIntent, NavigationRecord, Navigator};
pub use prompt::{
    DEFAULT_LOGIN_PATH, DEFAULT_PROMPT_DURATION, LOGIN_ACTION_LABEL, LoginPrompt, PromptChannel,
    PromptConfig, PromptId, PromptQueue, VisiblePrompt,
};
pub use reactive::{Observable, Subscription};
#[cfg(feature = "file-storage")]
pub use state_persistence::FileStorage;
pub use state_persistence::{MemoryStorage, StorageBackend, StorageError, StorageResult};
pub use timer::{RealTimeDriver, TimerGuard, TimerId, TimerScheduler};
