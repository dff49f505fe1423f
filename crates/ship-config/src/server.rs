//! HTTP server settings.

use serde::{Deserialize, Serialize};

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

/// Default upload ceiling: 5 MiB.
const fn default_max_upload_bytes() -> u64 {
    5 * 1024 * 1024
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Socket address the HTTP server listens on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}
