//! Configuration for the relay module.

use serde::{Deserialize, Serialize};

/// Configuration for the relay scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Seconds between delivery passes. The next pass is only armed once
    /// the previous one has returned, so passes never overlap.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval() -> u64 {
    15
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert_eq!(RelayConfig::default().poll_interval_secs, 15);
    }

    #[test]
    fn test_deserialize() {
        let config: RelayConfig = toml::from_str("poll_interval_secs = 3").unwrap();
        assert_eq!(config.poll_interval_secs, 3);
    }
}
