//! Credential and password policy configuration.

use serde::{Deserialize, Serialize};

/// Credential store configuration.
///
/// Hashing parameters themselves are the Argon2id defaults; only the
/// acceptance policy is configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Minimum password length accepted at registration, reset, and change.
    #[serde(default = "default_password_min")]
    pub password_min_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_min_length: default_password_min(),
        }
    }
}

fn default_password_min() -> usize {
    8
}
