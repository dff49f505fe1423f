//! Database error types for ship-db.

use std::time::Duration;

use thiserror::Error;

/// SQLite primary result codes the commit path distinguishes.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
const SQLITE_CONSTRAINT: i32 = 19;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Invalid state encountered (e.g., misuse of an in-memory store).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}

/// Errors from committing an invoice batch.
///
/// Every variant means the transaction was rolled back; retrying the same
/// batch is safe.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The batch contained no invoices; nothing was sent to storage.
    #[error("No invoices provided")]
    EmptyInput,

    /// The write lock or the whole transaction exceeded its ceiling.
    #[error("Commit timed out while {stage} (limit {limit:?})")]
    Timeout {
        stage: &'static str,
        limit: Duration,
    },

    /// A uniqueness, foreign-key, or CHECK constraint rejected a row.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The store could not be reached or failed mid-transaction.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl CommitError {
    /// Classify a libSQL failure raised inside the commit transaction.
    ///
    /// `stage` and `limit` describe where a lock timeout would have happened.
    #[must_use]
    pub fn classify(error: &libsql::Error, stage: &'static str, limit: Duration) -> Self {
        if let libsql::Error::SqliteFailure(code, message) = error {
            match code & 0xff {
                SQLITE_CONSTRAINT => return Self::ConstraintViolation(message.clone()),
                SQLITE_BUSY | SQLITE_LOCKED => return Self::Timeout { stage, limit },
                _ => {}
            }
        }

        let message = error.to_string();
        if message.contains("constraint failed") {
            Self::ConstraintViolation(message)
        } else if message.contains("database is locked") {
            Self::Timeout { stage, limit }
        } else {
            Self::StorageUnavailable(message)
        }
    }

    /// Whether the caller may retry the identical request.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::StorageUnavailable(_))
    }

    /// Classify a `DatabaseError` raised while preparing `stage`.
    #[must_use]
    pub fn from_database(error: DatabaseError, stage: &'static str, limit: Duration) -> Self {
        match error {
            DatabaseError::LibSql(e) => Self::classify(&e, stage, limit),
            other => Self::StorageUnavailable(other.to_string()),
        }
    }
}
