//! Errors raised while loading Shipdesk settings.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider (defaults, TOML file, environment) failed to merge or extract.
    #[error("Failed to load settings: {0}")]
    Figment(#[from] figment::Error),

    /// A setting parsed but is outside its accepted range.
    #[error("Setting '{field}' rejected: {reason}")]
    InvalidValue { field: String, reason: String },
}
