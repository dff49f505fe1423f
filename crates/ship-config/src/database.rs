//! libSQL database location.

use serde::{Deserialize, Serialize};

fn default_path() -> String {
    "shipdesk.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file, or `:memory:` for an ephemeral store.
    ///
    /// A `:memory:` store has a single connection: concurrent commits queue
    /// behind each other and reads can observe a commit in progress.
    #[serde(default = "default_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

impl DatabaseConfig {
    /// Whether the configured database lives only in memory.
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}
