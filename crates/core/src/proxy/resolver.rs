//! The proxy resolver: a single current value fed by discovery passes.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::broker::CandidateStream;
use super::config::ProxyConfig;
use super::types::{DiscoveryRequest, ProxyState};

/// Maintains the best known proxy for the last requested country.
///
/// The slot is last-write-wins: each candidate received from a discovery
/// pass overwrites it, and overlapping passes are tolerated. Readers take
/// a snapshot and never block on discovery.
pub struct ProxyResolver {
    broker: Arc<dyn CandidateStream>,
    config: ProxyConfig,
    state: Arc<RwLock<ProxyState>>,
}

impl ProxyResolver {
    /// Creates a resolver with an empty initial state.
    pub fn new(broker: Arc<dyn CandidateStream>, config: ProxyConfig) -> Self {
        Self {
            broker,
            config,
            state: Arc::new(RwLock::new(ProxyState::default())),
        }
    }

    /// The configured default country.
    pub fn default_country(&self) -> &str {
        &self.config.country
    }

    /// Current proxy address as `host:port`, empty when none is known.
    pub async fn current_proxy(&self) -> String {
        self.state.read().await.address.clone()
    }

    /// Snapshot of the current state.
    pub async fn current(&self) -> ProxyState {
        self.state.read().await.clone()
    }

    /// Starts a background discovery pass for the given country.
    ///
    /// Fire-and-forget and idempotent: calling it again while a pass is
    /// running simply starts another pass, and the most recent write wins.
    /// A pass that fails to start is logged and leaves the state
    /// unchanged; it is never fatal to the hosting process.
    pub fn refresh(&self, country: &str) {
        let request = DiscoveryRequest {
            protocols: self.config.protocols.clone(),
            countries: vec![country.to_string()],
            limit: self.config.limit,
        };
        let broker = Arc::clone(&self.broker);
        let state = Arc::clone(&self.state);
        let country = country.to_string();

        info!("Refreshing proxy for country {}", country);

        tokio::spawn(async move {
            let mut rx = match broker.find(request).await {
                Ok(rx) => rx,
                Err(e) => {
                    warn!("Proxy discovery for {} failed to start: {}", country, e);
                    return;
                }
            };

            while let Some(item) = rx.recv().await {
                let Some(candidate) = item else {
                    break;
                };
                let address = candidate.address();
                info!("Found proxy {} for country {}", address, country);
                let mut slot = state.write().await;
                slot.country_code = country.clone();
                slot.address = address;
            }

            debug!("Proxy discovery pass for {} finished", country);
        });
    }

    /// Starts a discovery pass for the configured default country.
    pub fn refresh_default(&self) {
        let country = self.config.country.clone();
        self.refresh(&country);
    }
}
