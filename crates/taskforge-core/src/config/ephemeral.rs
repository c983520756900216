//! Ephemeral token lifetime configuration.

use serde::{Deserialize, Serialize};

/// TTL policy for single-use tokens, per kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EphemeralConfig {
    /// Email verification token TTL in hours.
    #[serde(default = "default_verification_ttl")]
    pub verification_ttl_hours: u64,
    /// Password reset token TTL in minutes.
    #[serde(default = "default_reset_ttl")]
    pub reset_ttl_minutes: u64,
}

impl Default for EphemeralConfig {
    fn default() -> Self {
        Self {
            verification_ttl_hours: default_verification_ttl(),
            reset_ttl_minutes: default_reset_ttl(),
        }
    }
}

fn default_verification_ttl() -> u64 {
    24
}

fn default_reset_ttl() -> u64 {
    30
}
