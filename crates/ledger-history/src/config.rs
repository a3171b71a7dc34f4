#![forbid(unsafe_code)]

//! History configuration.
//!
//! The history is unbounded by default. A depth cap can be set in code or,
//! with the `config-file` feature, loaded from TOML at startup:
//!
//! ```toml
//! # ledger-history.toml
//! max_depth = 500
//! ```
//!
//! ```rust,ignore
//! let config = HistoryConfig::from_toml_file("ledger-history.toml")?;
//! let manager = CommandManager::new(config);
//! ```

#[cfg(feature = "config-file")]
use std::path::Path;

#[cfg(feature = "config-file")]
use serde::Deserialize;

/// Configuration for a [`History`](crate::History).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct HistoryConfig {
    /// Maximum number of actions kept on the undo stack. Oldest entries are
    /// evicted first. Loading rejects 0; a history built from 0 in code
    /// keeps one entry.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self::unlimited()
    }
}

impl HistoryConfig {
    /// Create a configuration with a depth cap.
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// No depth cap.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }

    /// Reject configurations that would make the history unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }
}

/// Errors from loading a [`HistoryConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[cfg(feature = "config-file")]
    #[error("failed to read history config: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "config-file")]
    #[error("malformed history config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid history config: {0}")]
    Invalid(String),
}
