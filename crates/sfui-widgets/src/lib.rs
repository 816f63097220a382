#![forbid(unsafe_code)]

//! Storefront widgets built on the core gesture layer and runtime seams.
//!
//! - [`FloatingAffordance`] - draggable, dismissible call-to-action card
//! - [`DismissalStore`] - persisted "don't show again" flags
//! - [`GatedActionDispatcher`] - auth-gated actions with a login detour
//! - [`PromoCarousel`] - timed, hover-pausable slide index
//!
//! # Role in sfui
//! Widgets own their state machines and talk to the host only through the
//! traits in `sfui-runtime`. None of them render; each exposes the state a
//! view layer needs (visibility, position, current slide).

pub mod affordance;
pub mod carousel;
pub mod dismissal;
pub mod gated;

pub use affordance::{
    AffordanceContext, AffordanceFrame, AffordanceSpec, DEFAULT_ELEMENT_SIZE, FloatingAffordance,
};
pub use carousel::{CarouselConfig, CarouselState, DEFAULT_INTERVAL, PromoCarousel, PromoSlide};
pub use dismissal::{DISMISSED_VALUE, DismissalStore};
pub use gated::{Gated, GatedAction, GatedActionDispatcher, dispatch_gated, labels};
