//! Mock candidate stream for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use crate::proxy::{BrokerError, CandidateStream, DiscoveryRequest, ProxyCandidate};

/// Mock implementation of the `CandidateStream` trait.
///
/// Yields a scripted list of candidates (in push order) followed by the
/// end-of-stream sentinel, or refuses to start when told to.
pub struct MockBroker {
    candidates: Arc<RwLock<Vec<ProxyCandidate>>>,
    fail_start: Arc<RwLock<bool>>,
    requests: Arc<RwLock<Vec<DiscoveryRequest>>>,
}

impl Default for MockBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBroker {
    /// Creates a mock broker with no scripted candidates.
    pub fn new() -> Self {
        Self {
            candidates: Arc::new(RwLock::new(Vec::new())),
            fail_start: Arc::new(RwLock::new(false)),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Appends a candidate to the scripted stream.
    pub async fn push_candidate(&self, candidate: ProxyCandidate) {
        self.candidates.write().await.push(candidate);
    }

    /// Makes `find` fail to start.
    pub async fn set_fail_start(&self, fail: bool) {
        *self.fail_start.write().await = fail;
    }

    /// All discovery requests received so far.
    pub async fn recorded_requests(&self) -> Vec<DiscoveryRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl CandidateStream for MockBroker {
    fn name(&self) -> &str {
        "mock"
    }

    async fn find(
        &self,
        request: DiscoveryRequest,
    ) -> Result<mpsc::Receiver<Option<ProxyCandidate>>, BrokerError> {
        self.requests.write().await.push(request.clone());

        if *self.fail_start.read().await {
            return Err(BrokerError::ConnectionFailed("mock broker down".to_string()));
        }

        // The scripted list is yielded in full; limit enforcement is the
        // real broker's concern, not the script's.
        let candidates = self.candidates.read().await.clone();
        let (tx, rx) = mpsc::channel(16);

        tokio::spawn(async move {
            for candidate in candidates {
                if tx.send(Some(candidate)).await.is_err() {
                    return;
                }
            }
            let _ = tx.send(None).await;
        });

        Ok(rx)
    }
}
