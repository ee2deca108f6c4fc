//! Types for the proxy module.

use serde::{Deserialize, Serialize};

/// A proxy address discovered by a candidate stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCandidate {
    pub host: String,
    pub port: u16,
}

impl ProxyCandidate {
    /// The candidate as a `host:port` address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Protocols a discovered proxy may speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyProtocol {
    Http,
    Https,
    Socks4,
    Socks5,
}

impl ProxyProtocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyProtocol::Http => "http",
            ProxyProtocol::Https => "https",
            ProxyProtocol::Socks4 => "socks4",
            ProxyProtocol::Socks5 => "socks5",
        }
    }
}

/// Parameters of one discovery pass.
#[derive(Debug, Clone)]
pub struct DiscoveryRequest {
    /// Acceptable proxy protocols.
    pub protocols: Vec<ProxyProtocol>,
    /// Country filter (ISO 3166-1 alpha-2 codes).
    pub countries: Vec<String>,
    /// Stop after this many candidates.
    pub limit: usize,
}

/// The process-wide "best known proxy" value.
///
/// Empty is a valid, if degraded, state: it means no candidate has been
/// found yet for the last requested country.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyState {
    /// Country the current address was discovered for.
    pub country_code: String,
    /// Current proxy as `host:port`, empty when unknown.
    pub address: String,
}

impl ProxyState {
    pub fn is_empty(&self) -> bool {
        self.address.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_address() {
        let candidate = ProxyCandidate {
            host: "10.0.0.1".to_string(),
            port: 3128,
        };
        assert_eq!(candidate.address(), "10.0.0.1:3128");
    }

    #[test]
    fn test_default_state_is_empty() {
        assert!(ProxyState::default().is_empty());
    }

    #[test]
    fn test_protocol_serde() {
        let json = serde_json::to_string(&ProxyProtocol::Http).unwrap();
        assert_eq!(json, "\"http\"");
        let back: ProxyProtocol = serde_json::from_str("\"socks5\"").unwrap();
        assert_eq!(back, ProxyProtocol::Socks5);
    }
}
