//! Session lifetime configuration.

use serde::{Deserialize, Serialize};

/// Session registry configuration.
///
/// The session lifetime is absolute: refreshing the token pair does not
/// extend it. It should exceed the refresh token TTL so that refresh
/// failures mean what their error kind says.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Absolute session lifetime in hours.
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
        }
    }
}

fn default_ttl_hours() -> u64 {
    720
}
