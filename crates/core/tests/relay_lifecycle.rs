//! Relay lifecycle integration tests.
//!
//! These verify the queue visibility invariant and the at-least-once
//! delivery behavior of the scheduler.

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use telegrab_core::{
    testing::{DeliveryMethod, MockSink},
    ArtifactQueue, RelayConfig, RelayScheduler, TransformKind,
};

/// Test helper owning a queue directory and a mock sink.
struct TestHarness {
    queue: ArtifactQueue,
    sink: Arc<MockSink>,
    scheduler: RelayScheduler,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_interval(1)
    }

    fn with_interval(poll_interval_secs: u64) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let queue = ArtifactQueue::new(temp_dir.path());
        let sink = Arc::new(MockSink::new());
        let scheduler = RelayScheduler::new(
            RelayConfig { poll_interval_secs },
            queue.clone(),
            Arc::clone(&sink) as _,
        );

        Self {
            queue,
            sink,
            scheduler,
            temp_dir,
        }
    }

    /// Writes and publishes one artifact, returning its marked path.
    async fn place_artifact(&self, destination: i64, kind: TransformKind) -> std::path::PathBuf {
        let working = self.queue.working_path(destination, kind);
        tokio::fs::write(&working, b"media bytes").await.unwrap();
        self.queue.publish(&working).await.unwrap()
    }
}

#[tokio::test]
async fn test_pass_delivers_and_reclaims() {
    let harness = TestHarness::new();
    let path = harness.place_artifact(42, TransformKind::Video).await;

    assert_eq!(harness.scheduler.run_once().await, 1);

    let deliveries = harness.sink.recorded_deliveries().await;
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].destination, 42);
    assert_eq!(deliveries[0].method, DeliveryMethod::Video);
    assert_eq!(deliveries[0].size_bytes, b"media bytes".len());
    assert!(!path.exists());
}

#[tokio::test]
async fn test_audio_routes_to_send_audio() {
    let harness = TestHarness::new();
    harness.place_artifact(7, TransformKind::Audio).await;

    harness.scheduler.run_once().await;

    let deliveries = harness.sink.recorded_deliveries().await;
    assert_eq!(deliveries[0].method, DeliveryMethod::Audio);
}

#[tokio::test]
async fn test_clip_routes_to_send_video() {
    let harness = TestHarness::new();
    harness.place_artifact(7, TransformKind::Clip).await;

    harness.scheduler.run_once().await;

    let deliveries = harness.sink.recorded_deliveries().await;
    assert_eq!(deliveries[0].method, DeliveryMethod::Video);
}

#[tokio::test]
async fn test_unmarked_artifact_is_never_delivered() {
    let harness = TestHarness::new();
    let working = harness.queue.working_path(42, TransformKind::Video);
    tokio::fs::write(&working, b"still being written")
        .await
        .unwrap();

    assert_eq!(harness.scheduler.run_once().await, 0);
    assert_eq!(harness.sink.delivery_count().await, 0);
    assert!(working.exists());
}

#[tokio::test]
async fn test_delivery_failure_retains_artifact_for_next_pass() {
    let harness = TestHarness::new();
    let path = harness.place_artifact(42, TransformKind::Video).await;
    harness.sink.set_fail_times(1).await;

    // Failed pass: the artifact stays on disk, untouched.
    assert_eq!(harness.scheduler.run_once().await, 0);
    assert!(path.exists());
    assert_eq!(tokio::fs::read(&path).await.unwrap(), b"media bytes");

    // Next pass with the sink healthy delivers and reclaims it.
    assert_eq!(harness.scheduler.run_once().await, 1);
    assert!(!path.exists());
    assert_eq!(harness.sink.delivery_count().await, 1);
}

#[tokio::test]
async fn test_malformed_marked_name_fails_closed() {
    let harness = TestHarness::new();
    let garbage = harness.temp_dir.path().join("tgbot_%%%_abc_tgok.mp4");
    tokio::fs::write(&garbage, b"x").await.unwrap();

    assert_eq!(harness.scheduler.run_once().await, 0);
    assert_eq!(harness.sink.delivery_count().await, 0);
    // The undecodable file is skipped, not deleted.
    assert!(garbage.exists());
}

#[tokio::test]
async fn test_scheduler_loop_delivers_within_one_interval() {
    let harness = TestHarness::with_interval(1);
    let path = harness.place_artifact(42, TransformKind::Video).await;

    harness.scheduler.start().await;

    let mut delivered = false;
    for _ in 0..50 {
        if !path.exists() {
            delivered = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    harness.scheduler.stop().await;

    assert!(delivered, "artifact was not relayed by the scheduler loop");
    assert_eq!(harness.sink.delivery_count().await, 1);
}
