#![forbid(unsafe_code)]

//! Reactive values shared between collaborators and widgets.

pub mod observable;

pub use observable::{Observable, Subscription};
