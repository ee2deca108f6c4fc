//! Types for the delivery module.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur while talking to the chat platform.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("API error: {0}")]
    ApiError(String),
}

/// One inbound update from the long-poll surface.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

/// An inbound chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

/// The chat a message arrived from.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_update() {
        let json = r#"{
            "update_id": 10,
            "message": {
                "message_id": 3,
                "chat": { "id": 42, "type": "private" },
                "text": "/dl https://example.test/v1"
            }
        }"#;

        let update: Update = serde_json::from_str(json).unwrap();
        assert_eq!(update.update_id, 10);
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.text.as_deref(), Some("/dl https://example.test/v1"));
    }

    #[test]
    fn test_deserialize_update_without_message() {
        let update: Update = serde_json::from_str(r#"{"update_id": 11}"#).unwrap();
        assert!(update.message.is_none());
    }
}
