//! Expiry sweeper configuration.

use serde::{Deserialize, Serialize};

/// Background expiry sweeper configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweeperConfig {
    /// Whether the sweeper is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval in minutes between sweep runs.
    #[serde(default = "default_interval")]
    pub interval_minutes: u64,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_minutes: default_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u64 {
    15
}
