//! Relay scheduler implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::delivery::DeliverySink;
use crate::extractor::TransformKind;
use crate::queue::ArtifactQueue;

use super::config::RelayConfig;

/// Discovers completed artifacts on a fixed interval and relays them.
///
/// Delivery is at-least-once: a failed delivery leaves the artifact on
/// disk untouched and the next pass simply tries again.
pub struct RelayScheduler {
    config: RelayConfig,
    queue: ArtifactQueue,
    sink: Arc<dyn DeliverySink>,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl RelayScheduler {
    /// Creates a new scheduler.
    pub fn new(config: RelayConfig, queue: ArtifactQueue, sink: Arc<dyn DeliverySink>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            queue,
            sink,
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Starts the scheduler loop task.
    pub async fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Relay scheduler already running");
            return;
        }

        let running = Arc::clone(&self.running);
        let queue = self.queue.clone();
        let sink = Arc::clone(&self.sink);
        let interval = Duration::from_secs(self.config.poll_interval_secs);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Relay scheduler started");
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Relay scheduler received shutdown signal");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {
                        if !running.load(Ordering::Relaxed) {
                            break;
                        }
                        Self::run_pass(&queue, sink.as_ref()).await;
                    }
                }
            }
            info!("Relay scheduler stopped");
        });
    }

    /// Stops the scheduler loop.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            warn!("Relay scheduler not running");
            return;
        }
        let _ = self.shutdown_tx.send(());
    }

    /// Runs a single delivery pass immediately. Used by the loop and by
    /// tests that need deterministic passes.
    pub async fn run_once(&self) -> usize {
        Self::run_pass(&self.queue, self.sink.as_ref()).await
    }

    /// One pass: scan, deliver, reclaim. Returns the delivered count.
    async fn run_pass(queue: &ArtifactQueue, sink: &dyn DeliverySink) -> usize {
        let artifacts = match queue.scan().await {
            Ok(artifacts) => artifacts,
            Err(e) => {
                error!("Queue scan failed: {}", e);
                return 0;
            }
        };

        let mut delivered = 0;
        for artifact in artifacts {
            let name = artifact.file_name();

            let data = match tokio::fs::read(&artifact.path).await {
                Ok(data) => data,
                Err(e) => {
                    error!("Failed to read artifact {:?}: {}", artifact.path, e);
                    continue;
                }
            };

            info!("Relaying {} to chat {}", name, artifact.destination);

            let result = match artifact.kind {
                TransformKind::Audio => {
                    sink.send_audio(artifact.destination, &name, data).await
                }
                TransformKind::Video | TransformKind::Clip => {
                    sink.send_video(artifact.destination, &name, data).await
                }
            };

            match result {
                Ok(()) => {
                    // Only reclaim once the sink accepted the bytes.
                    match queue.remove(&artifact).await {
                        Ok(()) => {
                            delivered += 1;
                            info!("Delivered {} to chat {}", name, artifact.destination);
                        }
                        Err(e) => {
                            error!("Failed to remove delivered artifact {:?}: {}", artifact.path, e);
                        }
                    }
                }
                Err(e) => {
                    error!(
                        "Delivery of {} failed, keeping it for the next pass: {}",
                        name, e
                    );
                }
            }
        }

        delivered
    }
}
