//! Ceilings for the batch commit transaction.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Default wait for the database write lock, in milliseconds.
const fn default_lock_wait_ms() -> u64 {
    10_000
}

/// Default ceiling for the whole commit transaction, in milliseconds.
const fn default_transaction_timeout_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// How long a commit may wait to acquire the write lock.
    #[serde(default = "default_lock_wait_ms")]
    pub lock_wait_ms: u64,

    /// How long the whole commit (lookups, inserts, repoints) may take.
    #[serde(default = "default_transaction_timeout_ms")]
    pub transaction_timeout_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            lock_wait_ms: default_lock_wait_ms(),
            transaction_timeout_ms: default_transaction_timeout_ms(),
        }
    }
}

impl IngestConfig {
    pub const fn lock_wait(&self) -> Duration {
        Duration::from_millis(self.lock_wait_ms)
    }

    pub const fn transaction_timeout(&self) -> Duration {
        Duration::from_millis(self.transaction_timeout_ms)
    }

    /// Reject zero ceilings, which would fail every commit.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock_wait_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ingest.lock_wait_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.transaction_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ingest.transaction_timeout_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}
