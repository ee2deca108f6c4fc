//! Configuration for the fetcher module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the download orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Directory artifacts are written into and relayed from.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Proxy-fallback retry behavior.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("/tmp")
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            retry: RetryConfig::default(),
        }
    }
}

/// Retry configuration for the proxy-assisted fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum proxy-assisted attempts. Unset means retry until the
    /// request task is cancelled.
    #[serde(default)]
    pub max_attempts: Option<u32>,

    /// Initial delay between attempts in seconds.
    #[serde(default = "default_initial_delay")]
    pub initial_delay_secs: u64,

    /// Maximum delay between attempts in seconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: u64,

    /// Exponential backoff multiplier.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

fn default_initial_delay() -> u64 {
    1
}

fn default_max_delay() -> u64 {
    60
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: None,
            initial_delay_secs: default_initial_delay(),
            max_delay_secs: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}
