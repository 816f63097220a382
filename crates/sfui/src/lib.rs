#![forbid(unsafe_code)]

//! Storefront UI kernel public facade.
//!
//! Re-exports the stable surface of the internal crates, the
//! [`KernelConfig`](config::KernelConfig) loader, subscriber setup, and a
//! prelude for day-to-day use.
//!
//! ```rust,ignore
//! use sfui::prelude::*;
//!
//! let auth = AuthProvider::new(AuthState::anonymous());
//! let navigator: Rc<dyn Navigator> = Rc::new(MemoryNavigator::new("/client/home"));
//! let storage: Rc<dyn StorageBackend> = Rc::new(MemoryStorage::new());
//! let ctx = AffordanceContext {
//!     auth: auth.clone(),
//!     navigator,
//!     dismissals: DismissalStore::new(storage),
//!     listeners: ListenerRegistry::new(),
//! };
//! let mut cta = FloatingAffordance::mount(
//!     AffordanceSpec::appointment_reminder(),
//!     GestureConfig::default(),
//!     &ctx,
//! );
//! ```

pub mod config;
pub mod logging;

// --- Core re-exports -------------------------------------------------------

pub use sfui_core::{
    Anchor, DEFAULT_DRAG_THRESHOLD, DEFAULT_MARGIN, Delta, DragGestureController, DragPhase,
    DragState, EventResponse, GestureConfig, GestureOutput, ListenerGuard, ListenerRegistry, Point,
    PointerEvent, PointerEventKind, Size, Verdict, clamp_position,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "file-storage")]
pub use sfui_runtime::FileStorage;
pub use sfui_runtime::{
    AuthProvider, AuthState, LoginPrompt, MemoryNavigator, MemoryStorage, NavigationIntent,
    Navigator, Observable, PromptChannel, PromptConfig, PromptId, PromptQueue, RealTimeDriver,
    Role, StorageBackend, StorageError, Subscription, TimerGuard, TimerScheduler,
};

// --- Widget re-exports -----------------------------------------------------

pub use sfui_widgets::{
    AffordanceContext, AffordanceFrame, AffordanceSpec, CarouselConfig, CarouselState,
    DismissalStore, FloatingAffordance, Gated, GatedAction, GatedActionDispatcher, PromoCarousel,
    PromoSlide, dispatch_gated, labels,
};

pub use config::{ConfigError, KernelConfig};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for sfui hosts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A storage backend failed outside the widgets' fail-open paths.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A global tracing subscriber could not be installed.
    #[error("logging init failed: {0}")]
    Logging(String),
}

/// Standard result type for sfui APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use std::rc::Rc;

    pub use crate::{
        AffordanceContext, AffordanceSpec, AuthProvider, AuthState, DismissalStore, Error,
        EventResponse, FloatingAffordance, Gated, GatedActionDispatcher, GestureConfig,
        KernelConfig, ListenerRegistry, LoginPrompt, MemoryNavigator, MemoryStorage,
        NavigationIntent, Navigator, Point, PointerEvent, PromoCarousel, PromoSlide, PromptChannel,
        PromptQueue, Result, Role, Size, StorageBackend, TimerScheduler, Verdict,
    };

    pub use crate::{core, runtime, widgets};
}

pub use sfui_core as core;
pub use sfui_runtime as runtime;
pub use sfui_widgets as widgets;
