//! Retrieval lifecycle integration tests.
//!
//! These verify the complete request path: URL validation, extraction,
//! the proxy-assisted fallback, and publication into the work queue.

use std::sync::Arc;
use tempfile::TempDir;

use telegrab_core::{
    testing::{MockBroker, MockExtractor, MockSink},
    Fetcher, FetcherConfig, ProxyCandidate, ProxyConfig, ProxyResolver, RelayConfig,
    RelayScheduler, RetrievalError, RetrievalRequest, RetryConfig, TransformKind,
    FINISHED_MARKER,
};

/// Test helper wiring a fetcher to mock collaborators.
struct TestHarness {
    extractor: Arc<MockExtractor>,
    broker: Arc<MockBroker>,
    fetcher: Arc<Fetcher>,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        // Zero delay keeps the unbounded fallback loop fast in tests.
        Self::with_retry(RetryConfig {
            max_attempts: None,
            initial_delay_secs: 0,
            max_delay_secs: 0,
            backoff_multiplier: 2.0,
        })
    }

    fn with_retry(retry: RetryConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let extractor = Arc::new(MockExtractor::new());
        let broker = Arc::new(MockBroker::new());
        let resolver = Arc::new(ProxyResolver::new(
            Arc::clone(&broker) as _,
            ProxyConfig::default(),
        ));

        let config = FetcherConfig {
            download_dir: temp_dir.path().to_path_buf(),
            retry,
        };
        let fetcher = Arc::new(Fetcher::new(config, Arc::clone(&extractor) as _, resolver));

        Self {
            extractor,
            broker,
            fetcher,
            temp_dir,
        }
    }

    fn request(&self, url: &str) -> RetrievalRequest {
        RetrievalRequest {
            source_url: url.to_string(),
            destination: 42,
            kind: TransformKind::Video,
            use_proxy: false,
        }
    }

    fn files_on_disk(&self) -> Vec<String> {
        std::fs::read_dir(self.temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect()
    }
}

#[tokio::test]
async fn test_successful_download_publishes_marked_artifact() {
    let harness = TestHarness::new();

    let artifact = harness
        .fetcher
        .retrieve(harness.request("https://example.test/v1"))
        .await
        .unwrap();

    assert_eq!(artifact.destination, 42);
    assert_eq!(artifact.kind, TransformKind::Video);
    assert!(artifact.path.exists());

    let name = artifact.file_name();
    assert!(name.starts_with("tgbot_"));
    assert!(name.ends_with(&format!("_{FINISHED_MARKER}.mp4")));

    // The plain attempt carried no proxy and was the only one.
    assert_eq!(harness.extractor.job_count().await, 1);
    assert!(harness.extractor.last_job().await.unwrap().proxy.is_empty());

    // Nothing but the marked artifact remains on disk.
    let files = harness.files_on_disk();
    assert_eq!(files, vec![name]);

    let scanned = harness.fetcher.queue().scan().await.unwrap();
    assert_eq!(scanned.len(), 1);
    assert_eq!(scanned[0], artifact);
}

#[tokio::test]
async fn test_malformed_url_rejected_synchronously() {
    let harness = TestHarness::new();

    let result = harness.fetcher.retrieve(harness.request("not a url")).await;

    assert!(matches!(result, Err(RetrievalError::InvalidInput { .. })));
    // The extractor was never consulted and no file was created.
    assert_eq!(harness.extractor.job_count().await, 0);
    assert!(harness.files_on_disk().is_empty());
}

#[tokio::test]
async fn test_geo_blocked_source_retried_through_proxy() {
    let harness = TestHarness::new();
    harness
        .broker
        .push_candidate(ProxyCandidate {
            host: "10.0.0.1".to_string(),
            port: 3128,
        })
        .await;
    harness.extractor.set_require_proxy(true).await;

    let artifact = harness
        .fetcher
        .retrieve(harness.request("https://example.test/v1"))
        .await
        .unwrap();

    assert!(artifact.path.exists());

    let jobs = harness.extractor.recorded_jobs().await;
    assert!(jobs.len() >= 2, "expected a plain attempt plus retries");
    assert!(jobs[0].proxy.is_empty());
    assert_eq!(jobs.last().unwrap().proxy, "10.0.0.1:3128");
}

#[tokio::test]
async fn test_proxied_request_fails_without_further_fallback() {
    let harness = TestHarness::new();
    harness.extractor.set_fail_times(1).await;

    let mut request = harness.request("https://example.test/v1");
    request.use_proxy = true;

    let result = harness.fetcher.retrieve(request).await;

    assert!(matches!(result, Err(RetrievalError::RetrievalFailed { .. })));
    // Exactly one attempt: a failed proxy-assisted attempt never falls
    // back again.
    assert_eq!(harness.extractor.job_count().await, 1);
}

#[tokio::test]
async fn test_bounded_retry_gives_up_with_cause() {
    let harness = TestHarness::with_retry(RetryConfig {
        max_attempts: Some(2),
        initial_delay_secs: 0,
        max_delay_secs: 0,
        backoff_multiplier: 2.0,
    });
    harness.extractor.set_fail_times(10).await;

    let result = harness
        .fetcher
        .retrieve(harness.request("https://example.test/v1"))
        .await;

    assert!(matches!(result, Err(RetrievalError::RetrievalFailed { .. })));
    // One plain attempt plus the two bounded proxy attempts.
    assert_eq!(harness.extractor.job_count().await, 3);
    assert!(harness
        .fetcher
        .queue()
        .scan()
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_concurrent_same_destination_requests_never_collide() {
    let harness = TestHarness::new();

    let mut handles = Vec::new();
    for i in 0..10 {
        let fetcher = Arc::clone(&harness.fetcher);
        let request = harness.request(&format!("https://example.test/v{i}"));
        handles.push(tokio::spawn(async move { fetcher.retrieve(request).await }));
    }

    let mut paths = std::collections::HashSet::new();
    for handle in handles {
        let artifact = handle.await.unwrap().unwrap();
        assert!(paths.insert(artifact.path.clone()), "path collision");
    }

    assert_eq!(harness.fetcher.queue().scan().await.unwrap().len(), 10);
}

#[tokio::test]
async fn test_download_then_relay_round_trip() {
    let harness = TestHarness::new();

    harness
        .fetcher
        .retrieve(harness.request("https://example.test/v1"))
        .await
        .unwrap();

    let sink = Arc::new(MockSink::new());
    let scheduler = RelayScheduler::new(
        RelayConfig::default(),
        harness.fetcher.queue().clone(),
        Arc::clone(&sink) as _,
    );

    assert_eq!(scheduler.run_once().await, 1);

    let deliveries = sink.recorded_deliveries().await;
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].destination, 42);

    // Storage reclaimed after delivery.
    assert!(harness.files_on_disk().is_empty());
}
