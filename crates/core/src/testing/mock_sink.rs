//! Mock delivery sink for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::delivery::{DeliveryError, DeliverySink};

/// Which sink method a delivery went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMethod {
    Video,
    Audio,
}

/// A recorded delivery for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedDelivery {
    pub destination: i64,
    pub file_name: String,
    pub method: DeliveryMethod,
    pub size_bytes: usize,
}

/// Mock implementation of the `DeliverySink` trait.
pub struct MockSink {
    deliveries: Arc<RwLock<Vec<RecordedDelivery>>>,
    fail_times: Arc<RwLock<u32>>,
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSink {
    /// Creates a sink that accepts every delivery.
    pub fn new() -> Self {
        Self {
            deliveries: Arc::new(RwLock::new(Vec::new())),
            fail_times: Arc::new(RwLock::new(0)),
        }
    }

    /// Rejects the next `n` deliveries.
    pub async fn set_fail_times(&self, n: u32) {
        *self.fail_times.write().await = n;
    }

    /// All deliveries accepted so far.
    pub async fn recorded_deliveries(&self) -> Vec<RecordedDelivery> {
        self.deliveries.read().await.clone()
    }

    /// Number of accepted deliveries.
    pub async fn delivery_count(&self) -> usize {
        self.deliveries.read().await.len()
    }

    async fn record(
        &self,
        destination: i64,
        file_name: &str,
        method: DeliveryMethod,
        data: Vec<u8>,
    ) -> Result<(), DeliveryError> {
        {
            let mut fail_times = self.fail_times.write().await;
            if *fail_times > 0 {
                *fail_times -= 1;
                return Err(DeliveryError::ApiError("mock sink rejection".to_string()));
            }
        }

        self.deliveries.write().await.push(RecordedDelivery {
            destination,
            file_name: file_name.to_string(),
            method,
            size_bytes: data.len(),
        });
        Ok(())
    }
}

#[async_trait]
impl DeliverySink for MockSink {
    async fn send_video(
        &self,
        destination: i64,
        file_name: &str,
        data: Vec<u8>,
    ) -> Result<(), DeliveryError> {
        self.record(destination, file_name, DeliveryMethod::Video, data)
            .await
    }

    async fn send_audio(
        &self,
        destination: i64,
        file_name: &str,
        data: Vec<u8>,
    ) -> Result<(), DeliveryError> {
        self.record(destination, file_name, DeliveryMethod::Audio, data)
            .await
    }
}
