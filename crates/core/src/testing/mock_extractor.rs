//! Mock extractor for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::extractor::{
    ExtractionJob, ExtractionResult, Extractor, ExtractorError,
};

/// Mock implementation of the `Extractor` trait.
///
/// Controllable behavior for testing:
/// - records every job for assertions
/// - fails the next N fetches on demand
/// - simulates a geo-blocked source that only works through a proxy
/// - writes a real (dummy) output file on success, so queue and relay
///   behavior can be exercised against actual files
pub struct MockExtractor {
    jobs: Arc<RwLock<Vec<ExtractionJob>>>,
    fail_times: Arc<RwLock<u32>>,
    require_proxy: Arc<RwLock<bool>>,
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExtractor {
    /// Creates a new mock extractor that succeeds on every fetch.
    pub fn new() -> Self {
        Self {
            jobs: Arc::new(RwLock::new(Vec::new())),
            fail_times: Arc::new(RwLock::new(0)),
            require_proxy: Arc::new(RwLock::new(false)),
        }
    }

    /// Fail the next `n` fetches regardless of proxy.
    pub async fn set_fail_times(&self, n: u32) {
        *self.fail_times.write().await = n;
    }

    /// Fail every fetch whose job carries no proxy.
    pub async fn set_require_proxy(&self, require: bool) {
        *self.require_proxy.write().await = require;
    }

    /// All jobs fetched so far.
    pub async fn recorded_jobs(&self) -> Vec<ExtractionJob> {
        self.jobs.read().await.clone()
    }

    /// Number of fetches performed.
    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// The most recent job, if any.
    pub async fn last_job(&self) -> Option<ExtractionJob> {
        self.jobs.read().await.last().cloned()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, job: ExtractionJob) -> Result<ExtractionResult, ExtractorError> {
        self.jobs.write().await.push(job.clone());

        {
            let mut fail_times = self.fail_times.write().await;
            if *fail_times > 0 {
                *fail_times -= 1;
                return Err(ExtractorError::extraction_failed(
                    "mock failure".to_string(),
                    None,
                ));
            }
        }

        if *self.require_proxy.read().await && job.proxy.is_empty() {
            return Err(ExtractorError::extraction_failed(
                "source not available in this region".to_string(),
                None,
            ));
        }

        let data = b"mock media";
        tokio::fs::write(&job.output_path, data).await?;

        Ok(ExtractionResult {
            output_path: job.output_path,
            output_size_bytes: data.len() as u64,
            duration_ms: 1,
        })
    }

    async fn validate(&self) -> Result<(), ExtractorError> {
        Ok(())
    }
}
