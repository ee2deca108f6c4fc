//! Trait definitions for the delivery module.

use async_trait::async_trait;

use super::types::DeliveryError;

/// A sink that can deliver finished artifacts to a chat.
#[async_trait]
pub trait DeliverySink: Send + Sync {
    /// Delivers a video or animated clip.
    async fn send_video(
        &self,
        destination: i64,
        file_name: &str,
        data: Vec<u8>,
    ) -> Result<(), DeliveryError>;

    /// Delivers an audio track.
    async fn send_audio(
        &self,
        destination: i64,
        file_name: &str,
        data: Vec<u8>,
    ) -> Result<(), DeliveryError>;
}
