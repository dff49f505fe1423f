//! Schema and upload validation error types.

use thiserror::Error;

/// Errors from the schema registry.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Requested schema name was not found in the registry.
    #[error("Schema not found: {0}")]
    NotFound(String),

    /// Schema compilation error.
    #[error("Schema generation error: {0}")]
    Generation(String),
}

/// Errors from validating an uploaded invoice batch.
///
/// Both variants are caller input errors: they are surfaced verbatim and never
/// retried.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The upload is not valid JSON.
    #[error("Invalid JSON file: {0}")]
    Parse(String),

    /// The JSON is structurally not an invoice batch.
    #[error("Validation error: {}", .errors.join(", "))]
    Schema {
        /// One message per violation, each prefixed by its JSON pointer.
        errors: Vec<String>,
    },

    /// The batch schema itself could not be compiled.
    #[error(transparent)]
    Registry(#[from] SchemaError),
}

impl ValidationError {
    /// The individual violation messages (empty for non-schema errors).
    #[must_use]
    pub fn violations(&self) -> &[String] {
        match self {
            Self::Schema { errors } => errors,
            Self::Parse(_) | Self::Registry(_) => &[],
        }
    }
}
