//! Storage configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "versionedkv/";

/// Options for an [`crate::EtcdStorage`].
///
/// # Example
///
/// ```ignore
/// let options = Options::from_toml_str(r#"prefix = "jobs/""#)?;
/// let storage = EtcdStorage::new(client, options);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Namespace every key is stored under. Empty means [`DEFAULT_PREFIX`].
    pub prefix: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

/// Invalid configuration input.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Input is not valid TOML or has wrongly typed fields.
    #[error("invalid options: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Options {
    /// Options with the given key prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Parse options from a TOML fragment such as `prefix = "app/"`.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let options: Options = toml::from_str(input)?;
        Ok(options.sanitized())
    }

    /// Replace unset fields with their defaults.
    pub fn sanitize(&mut self) {
        if self.prefix.is_empty() {
            self.prefix = DEFAULT_PREFIX.to_string();
        }
    }

    /// Consuming form of [`Options::sanitize`].
    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }
}
