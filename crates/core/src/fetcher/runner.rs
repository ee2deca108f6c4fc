//! Download orchestrator implementation.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

use crate::extractor::{ExtractionJob, Extractor};
use crate::proxy::ProxyResolver;
use crate::queue::{Artifact, ArtifactQueue};

use super::config::{FetcherConfig, RetryConfig};
use super::types::{RetrievalError, RetrievalRequest};

/// Executes one retrieval request end to end.
///
/// Each request runs inside its own task; the fetcher holds no mutable
/// state of its own, so any number of retrievals proceed concurrently.
pub struct Fetcher {
    config: FetcherConfig,
    extractor: Arc<dyn Extractor>,
    resolver: Arc<ProxyResolver>,
    queue: ArtifactQueue,
}

impl Fetcher {
    /// Creates a new fetcher.
    pub fn new(
        config: FetcherConfig,
        extractor: Arc<dyn Extractor>,
        resolver: Arc<ProxyResolver>,
    ) -> Self {
        let queue = ArtifactQueue::new(config.download_dir.clone());
        Self {
            config,
            extractor,
            resolver,
            queue,
        }
    }

    /// The queue this fetcher publishes into.
    pub fn queue(&self) -> &ArtifactQueue {
        &self.queue
    }

    /// Retrieves one media item and publishes it as an artifact.
    pub async fn retrieve(&self, request: RetrievalRequest) -> Result<Artifact, RetrievalError> {
        validate_url(&request.source_url)?;

        self.queue.ensure_dir().await?;
        let working = self.queue.working_path(request.destination, request.kind);

        let proxy = if request.use_proxy {
            self.resolver.current_proxy().await
        } else {
            String::new()
        };

        info!(
            "Retrieving {} for chat {} (kind {:?}, proxy {:?})",
            request.source_url, request.destination, request.kind, proxy
        );

        let job = ExtractionJob {
            url: request.source_url.clone(),
            output_path: working.clone(),
            kind: request.kind,
            proxy,
        };

        match self.extractor.fetch(job).await {
            Ok(_) => self.publish(&working, &request).await,
            Err(e) if request.use_proxy => {
                // This attempt was already proxy-assisted; there is no
                // further fallback level.
                warn!("Proxy-assisted retrieval of {} failed: {}", request.source_url, e);
                Err(RetrievalError::RetrievalFailed { source: e })
            }
            Err(e) => {
                warn!(
                    "Retrieval of {} failed: {}, falling back to proxy",
                    request.source_url, e
                );
                self.retry_with_proxy(&request, &working).await
            }
        }
    }

    /// Proxy-assisted retry loop.
    ///
    /// Each attempt rotates the proxy (fire-and-forget refresh, then a
    /// snapshot read — an attempt racing a discovery pass simply uses the
    /// previous value). Unbounded unless `retry.max_attempts` is set.
    async fn retry_with_proxy(
        &self,
        request: &RetrievalRequest,
        working: &Path,
    ) -> Result<Artifact, RetrievalError> {
        let retry = &self.config.retry;
        let mut delay = Duration::from_secs(retry.initial_delay_secs);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            self.resolver.refresh_default();
            let proxy = self.resolver.current_proxy().await;

            info!(
                "Proxy attempt {} for {} via {:?}",
                attempt, request.source_url, proxy
            );

            let job = ExtractionJob {
                url: request.source_url.clone(),
                output_path: working.to_path_buf(),
                kind: request.kind,
                proxy,
            };

            match self.extractor.fetch(job).await {
                Ok(_) => return self.publish(working, request).await,
                Err(e) => {
                    if let Some(max) = retry.max_attempts {
                        if attempt >= max {
                            warn!(
                                "Giving up on {} after {} proxy attempts: {}",
                                request.source_url, attempt, e
                            );
                            return Err(RetrievalError::RetrievalFailed { source: e });
                        }
                    }
                    warn!(
                        "Proxy attempt {} for {} failed: {}",
                        attempt, request.source_url, e
                    );
                    tokio::time::sleep(delay).await;
                    delay = next_delay(delay, retry);
                }
            }
        }
    }

    /// Atomically marks the working file complete and hands it to relay.
    async fn publish(
        &self,
        working: &Path,
        request: &RetrievalRequest,
    ) -> Result<Artifact, RetrievalError> {
        let finished = self.queue.publish(working).await?;
        info!("Artifact ready for relay: {:?}", finished);
        Ok(Artifact {
            path: finished,
            destination: request.destination,
            kind: request.kind,
        })
    }
}

/// Validates that the source is a well-formed http(s) URL.
fn validate_url(raw: &str) -> Result<Url, RetrievalError> {
    let url = Url::parse(raw).map_err(|e| RetrievalError::InvalidInput {
        reason: format!("{raw:?}: {e}"),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(RetrievalError::InvalidInput {
            reason: format!("unsupported scheme {scheme:?}"),
        }),
    }
}

/// Next backoff delay, capped at the configured maximum.
fn next_delay(current: Duration, retry: &RetryConfig) -> Duration {
    let next = current.as_secs_f64() * retry.backoff_multiplier;
    Duration::from_secs_f64(next.min(retry.max_delay_secs as f64))
}
