//! Configuration for the proxy module.

use serde::{Deserialize, Serialize};

use super::types::ProxyProtocol;

/// Configuration for proxy discovery and the resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Default country filter for discovery passes.
    #[serde(default = "default_country")]
    pub country: String,

    /// Acceptable proxy protocols.
    #[serde(default = "default_protocols")]
    pub protocols: Vec<ProxyProtocol>,

    /// Candidates to collect per discovery pass.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Provider URL templates. `{protocol}` and `{country}` placeholders
    /// are substituted per request; each endpoint must return plaintext
    /// `host:port` lines.
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    /// Timeout for a single provider fetch in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_country() -> String {
    "FR".to_string()
}

fn default_protocols() -> Vec<ProxyProtocol> {
    vec![ProxyProtocol::Http, ProxyProtocol::Https]
}

fn default_limit() -> usize {
    1
}

fn default_sources() -> Vec<String> {
    vec![
        "https://api.proxyscrape.com/v2/?request=displayproxies&protocol={protocol}&country={country}"
            .to_string(),
    ]
}

fn default_timeout() -> u32 {
    30
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            country: default_country(),
            protocols: default_protocols(),
            limit: default_limit(),
            sources: default_sources(),
            timeout_secs: default_timeout(),
        }
    }
}
