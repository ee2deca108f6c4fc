//! Proxy candidate streams.
//!
//! A stream is opened per discovery pass and yields candidates as they are
//! found; `None` is the explicit end-of-stream sentinel. The HTTP broker
//! implementation pulls plaintext proxy lists from configurable provider
//! endpoints.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::config::ProxyConfig;
use super::types::{DiscoveryRequest, ProxyCandidate};

/// Buffer size of a candidate channel.
const CANDIDATE_BUFFER: usize = 16;

/// Errors that can occur when opening a discovery pass.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("Discovery request is invalid: {0}")]
    InvalidRequest(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Provider request timed out")]
    Timeout,

    #[error("Provider error: {0}")]
    ApiError(String),
}

/// A source of proxy candidates.
#[async_trait]
pub trait CandidateStream: Send + Sync {
    /// Returns the name of this stream implementation.
    fn name(&self) -> &str;

    /// Opens a discovery pass.
    ///
    /// Candidates arrive on the returned channel as they are found, ending
    /// with a `None` sentinel. An `Err` means the pass could not start at
    /// all; the channel never surfaces mid-stream failures, it just ends.
    async fn find(
        &self,
        request: DiscoveryRequest,
    ) -> Result<mpsc::Receiver<Option<ProxyCandidate>>, BrokerError>;
}

/// Candidate stream backed by plaintext proxy-list providers.
pub struct HttpBroker {
    client: Client,
    config: ProxyConfig,
}

impl HttpBroker {
    /// Creates a new broker with the given configuration.
    pub fn new(config: ProxyConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Expands the source templates for one request.
    fn build_urls(&self, request: &DiscoveryRequest) -> Vec<String> {
        let mut urls = Vec::new();
        for source in &self.config.sources {
            for protocol in &request.protocols {
                for country in &request.countries {
                    urls.push(
                        source
                            .replace("{protocol}", protocol.as_str())
                            .replace("{country}", country),
                    );
                }
            }
        }
        urls
    }

    /// Fetches one provider endpoint and parses its `host:port` lines.
    async fn fetch_source(client: &Client, url: &str) -> Result<Vec<ProxyCandidate>, BrokerError> {
        let response = client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                BrokerError::Timeout
            } else if e.is_connect() {
                BrokerError::ConnectionFailed(e.to_string())
            } else {
                BrokerError::ApiError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrokerError::ApiError(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| BrokerError::ApiError(e.to_string()))?;

        Ok(body.lines().filter_map(parse_candidate).collect())
    }
}

/// Parses a single `host:port` provider line.
fn parse_candidate(line: &str) -> Option<ProxyCandidate> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (host, port) = line.rsplit_once(':')?;
    let port: u16 = port.parse().ok()?;
    if host.is_empty() {
        return None;
    }
    Some(ProxyCandidate {
        host: host.to_string(),
        port,
    })
}

#[async_trait]
impl CandidateStream for HttpBroker {
    fn name(&self) -> &str {
        "http-broker"
    }

    async fn find(
        &self,
        request: DiscoveryRequest,
    ) -> Result<mpsc::Receiver<Option<ProxyCandidate>>, BrokerError> {
        if request.limit == 0 {
            return Err(BrokerError::InvalidRequest("limit is 0".to_string()));
        }
        let urls = self.build_urls(&request);
        if urls.is_empty() {
            return Err(BrokerError::InvalidRequest(
                "no sources match the request".to_string(),
            ));
        }

        let (tx, rx) = mpsc::channel(CANDIDATE_BUFFER);
        let client = self.client.clone();
        let limit = request.limit;

        tokio::spawn(async move {
            let mut sent = 0usize;
            'sources: for url in urls {
                debug!("Fetching proxy candidates from {}", url);
                match Self::fetch_source(&client, &url).await {
                    Ok(candidates) => {
                        for candidate in candidates {
                            if tx.send(Some(candidate)).await.is_err() {
                                // Consumer went away, stop the pass.
                                return;
                            }
                            sent += 1;
                            if sent >= limit {
                                break 'sources;
                            }
                        }
                    }
                    Err(e) => {
                        warn!("Proxy source {} failed: {}", url, e);
                    }
                }
            }
            let _ = tx.send(None).await;
        });

        Ok(rx)
    }
}
