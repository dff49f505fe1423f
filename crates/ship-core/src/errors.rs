//! Cross-cutting error types for Shipdesk.
//!
//! Domain-specific errors (`ValidationError`, `DatabaseError`, `CommitError`)
//! are defined in their respective crates. The CLI converges everything with
//! `anyhow`.

use thiserror::Error;

/// Errors that can be raised by core type conversions.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A date string could not be coerced into a UTC timestamp.
    #[error(
        "Invalid timestamp '{value}': expected RFC 3339, YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD"
    )]
    InvalidTimestamp { value: String },
}
