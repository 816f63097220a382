#![forbid(unsafe_code)]

//! Subscriber setup for hosts that do not install their own.
//!
//! Every kernel event carries a `sfui.*` target (`sfui.gesture`,
//! `sfui.dismissal`, `sfui.affordance`, `sfui.gated`, `sfui.carousel`,
//! `sfui.timer`, `sfui.storage`, `sfui.prompt`, `sfui.navigation`), so
//! `RUST_LOG=sfui.carousel=trace` narrows output to one component.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn,sfui=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a human-readable fmt subscriber honouring `RUST_LOG`.
///
/// Fails if a global subscriber is already set.
pub fn init() -> crate::Result<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| crate::Error::Logging(e.to_string()))
}

/// Install a JSON-lines subscriber honouring `RUST_LOG`.
pub fn init_json() -> crate::Result<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .map_err(|e| crate::Error::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(DEFAULT_FILTER.parse::<EnvFilter>().is_ok());
    }

    #[test]
    fn second_init_fails_instead_of_panicking() {
        // Whichever runs first wins; the other must report an error.
        let first = init();
        let second = init_json();
        assert!(first.is_err() || second.is_err());
    }
}
