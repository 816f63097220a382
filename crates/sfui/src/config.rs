#![forbid(unsafe_code)]

//! Kernel configuration as data.
//!
//! [`KernelConfig`] groups every tunable of the kernel so a host can load
//! it from TOML or JSON at startup.
//!
//! ```toml
//! # sfui.toml
//! [gesture]
//! drag_threshold = 3.0
//! margin = 20.0
//! anchor = "bottom-right"
//!
//! [carousel]
//! interval_ms = 5000
//!
//! [prompt]
//! duration_ms = 4000
//! login_path = "/pharmacy/login"
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the built-in constant, so an empty file yields
//! `KernelConfig::default()`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use sfui_core::GestureConfig;
use sfui_runtime::PromptConfig;
use sfui_widgets::CarouselConfig;

/// Every tunable of the kernel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Drag recognition and viewport clamp.
    pub gesture: GestureConfig,
    /// Promo carousel timing.
    pub carousel: CarouselConfig,
    /// Login prompt timing and route.
    pub prompt: PromptConfig,
}

impl KernelConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check every parameter. An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let threshold = self.gesture.drag_threshold;
        if !(threshold >= 0.0 && threshold.is_finite()) {
            errors.push(format!(
                "gesture.drag_threshold must be a finite value >= 0, got {threshold}"
            ));
        }

        let margin = self.gesture.margin;
        if !(margin >= 0.0 && margin.is_finite()) {
            errors.push(format!(
                "gesture.margin must be a finite value >= 0, got {margin}"
            ));
        }

        if self.carousel.interval_ms == 0 {
            errors.push("carousel.interval_ms must be > 0".into());
        }

        if self.prompt.duration_ms == 0 {
            errors.push("prompt.duration_ms must be > 0".into());
        }

        if !self.prompt.login_path.starts_with('/') {
            errors.push(format!(
                "prompt.login_path must be an absolute route, got {:?}",
                self.prompt.login_path
            ));
        }

        errors
    }

    /// Validate, turning any problem into [`ConfigError::Validation`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Serialize as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::TomlSerialize)
    }
}

/// Errors that can occur when loading a kernel configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[source] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[source] toml::ser::Error),
    #[error("JSON parse error: {0}")]
    Json(#[source] serde_json::Error),
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
