//! Signed token configuration.

use serde::{Deserialize, Serialize};

/// Access/refresh token signing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Secret key for token signing (HMAC-SHA256).
    #[serde(default = "default_secret")]
    pub secret: String,
    /// Access token TTL in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_ttl_days: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            access_ttl_minutes: default_access_ttl(),
            refresh_ttl_days: default_refresh_ttl(),
        }
    }
}

fn default_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_access_ttl() -> u64 {
    30
}

fn default_refresh_ttl() -> u64 {
    14
}
