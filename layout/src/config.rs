//! Store configuration with TOML file support.

use std::time::Duration;

use blobstate_store::{CancelFlag, Deadline};
use serde::{Deserialize, Serialize};

use crate::{LayoutError, LayoutSignal};

/// Configuration for opening a store.
///
/// Can be loaded from a TOML file via [`StoreConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Layout preference: "auto", "legacy" or "versioned". An existing
    /// metadata record and `BLOBSTATE_LEGACY_LAYOUT` both take precedence.
    #[serde(default)]
    pub layout: LayoutSignal,

    /// Upper bound on layout resolution, in milliseconds.
    #[serde(default)]
    pub resolve_timeout_ms: Option<u64>,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Aborts resolution when raised (programmatic only).
    #[serde(skip)]
    pub cancel: Option<CancelFlag>,
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl StoreConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, LayoutError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LayoutError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, LayoutError> {
        toml::from_str(s).map_err(|e| LayoutError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, LayoutError> {
        toml::to_string_pretty(self).map_err(|e| LayoutError::Config(e.to_string()))
    }

    /// The deadline resolution runs under, starting now.
    pub fn deadline(&self) -> Deadline {
        let deadline = match self.resolve_timeout_ms {
            Some(ms) => Deadline::after(Duration::from_millis(ms)),
            None => Deadline::none(),
        };
        match &self.cancel {
            Some(flag) => deadline.with_cancel(flag.clone()),
            None => deadline,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            layout: LayoutSignal::Unset,
            resolve_timeout_ms: None,
            log_format: default_log_format(),
            log_level: default_log_level(),
            cancel: None,
        }
    }
}
