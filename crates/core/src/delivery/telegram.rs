//! Telegram Bot API client.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::config::BotConfig;

use super::traits::DeliverySink;
use super::types::{DeliveryError, Update};

/// Response envelope of every Bot API method.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// Chat-platform client over the Telegram Bot API.
pub struct TelegramClient {
    client: Client,
    config: BotConfig,
}

impl TelegramClient {
    /// Creates a new client from the bot configuration.
    ///
    /// Timeouts are applied per request: long polls get the poll timeout
    /// plus slack, uploads get the send timeout.
    pub fn new(config: BotConfig) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// URL of a Bot API method.
    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_url.trim_end_matches('/'),
            self.config.token,
            method
        )
    }

    fn map_error(e: reqwest::Error) -> DeliveryError {
        if e.is_timeout() {
            DeliveryError::Timeout
        } else if e.is_connect() {
            DeliveryError::ConnectionFailed(e.to_string())
        } else {
            DeliveryError::ApiError(e.to_string())
        }
    }

    /// Unwraps a Bot API response envelope.
    async fn unwrap_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, DeliveryError> {
        let status = response.status();
        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| DeliveryError::ApiError(format!("HTTP {status}: {e}")))?;

        if !envelope.ok {
            return Err(DeliveryError::ApiError(
                envelope
                    .description
                    .unwrap_or_else(|| format!("HTTP {status}")),
            ));
        }

        envelope
            .result
            .ok_or_else(|| DeliveryError::ApiError("missing result".to_string()))
    }

    /// Long-polls for inbound updates.
    ///
    /// Blocks up to the configured poll timeout and returns an empty list
    /// when nothing arrived.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>, DeliveryError> {
        let response = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[("offset", offset), ("timeout", self.config.poll_timeout_secs as i64)])
            .timeout(Duration::from_secs(self.config.poll_timeout_secs as u64 + 10))
            .send()
            .await
            .map_err(Self::map_error)?;

        Self::unwrap_envelope(response).await
    }

    /// Sends a plain text reply to a chat.
    pub async fn send_message(&self, destination: i64, text: &str) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&json!({ "chat_id": destination, "text": text }))
            .timeout(Duration::from_secs(self.config.send_timeout_secs as u64))
            .send()
            .await
            .map_err(Self::map_error)?;

        Self::unwrap_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }

    /// Uploads a file through a multipart Bot API method.
    async fn send_file(
        &self,
        method: &str,
        field: &str,
        destination: i64,
        file_name: &str,
        data: Vec<u8>,
    ) -> Result<(), DeliveryError> {
        debug!(
            "Uploading {} bytes as {} to chat {}",
            data.len(),
            file_name,
            destination
        );

        let part = Part::bytes(data).file_name(file_name.to_string());
        let form = Form::new()
            .text("chat_id", destination.to_string())
            .part(field.to_string(), part);

        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .timeout(Duration::from_secs(self.config.send_timeout_secs as u64))
            .send()
            .await
            .map_err(Self::map_error)?;

        Self::unwrap_envelope::<serde_json::Value>(response).await?;
        Ok(())
    }
}

#[async_trait]
impl DeliverySink for TelegramClient {
    async fn send_video(
        &self,
        destination: i64,
        file_name: &str,
        data: Vec<u8>,
    ) -> Result<(), DeliveryError> {
        self.send_file("sendVideo", "video", destination, file_name, data)
            .await
    }

    async fn send_audio(
        &self,
        destination: i64,
        file_name: &str,
        data: Vec<u8>,
    ) -> Result<(), DeliveryError> {
        self.send_file("sendAudio", "audio", destination, file_name, data)
            .await
    }
}
