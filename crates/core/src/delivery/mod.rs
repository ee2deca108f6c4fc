//! Delivery module: the chat-platform sink and bot-surface client.
//!
//! The `DeliverySink` trait is what the relay scheduler talks to; the
//! Telegram client implements it over the Bot API and additionally
//! provides the long-poll and reply primitives the command dispatcher
//! needs.

mod telegram;
mod traits;
mod types;

pub use telegram::TelegramClient;
pub use traits::DeliverySink;
pub use types::{Chat, DeliveryError, Message, Update};
