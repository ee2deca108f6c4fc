//! Inbound command dispatcher.
//!
//! Long-polls the chat platform for commands and maps each one onto a
//! retrieval request or a resolver refresh. Every retrieval runs in its
//! own task; a failing request never touches the others.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use telegrab_core::{
    Fetcher, ProxyResolver, RetrievalError, RetrievalRequest, TelegramClient, TransformKind,
    Update,
};

const HELP_TEXT: &str = "Usage:\n\
/dl <url> - fetch a video\n\
/dlp <url> - fetch a video through the current proxy\n\
/mp3 <url> - fetch the audio track only\n\
/gif <url> - fetch a short silent clip\n\
/proxy [country] - refresh the outbound proxy\n\
/help - this message";

/// Delay before re-polling after a transport error.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// A parsed inbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Retrieve {
        url: String,
        kind: TransformKind,
        use_proxy: bool,
    },
    RefreshProxy {
        country: Option<String>,
    },
}

/// Parses one message text.
///
/// `None` means the text is not a command we know; `Some(Err(usage))`
/// means a known command with unusable arguments, answered with its usage
/// line.
fn parse_command(text: &str) -> Option<Result<Command, &'static str>> {
    let mut parts = text.split_whitespace();
    let head = parts.next()?;
    if !head.starts_with('/') {
        return None;
    }

    // Commands in group chats arrive as /dl@botname.
    let name = head[1..].split('@').next().unwrap_or_default();
    let arg = parts.next();

    let retrieve = |kind, use_proxy, usage| match arg {
        Some(url) => Ok(Command::Retrieve {
            url: url.to_string(),
            kind,
            use_proxy,
        }),
        None => Err(usage),
    };

    match name {
        "help" | "start" => Some(Ok(Command::Help)),
        "dl" => Some(retrieve(TransformKind::Video, false, "Usage: /dl <url>")),
        "dlp" => Some(retrieve(TransformKind::Video, true, "Usage: /dlp <url>")),
        "mp3" => Some(retrieve(TransformKind::Audio, false, "Usage: /mp3 <url>")),
        "gif" => Some(retrieve(TransformKind::Clip, false, "Usage: /gif <url>")),
        "proxy" => Some(Ok(Command::RefreshProxy {
            country: arg.map(str::to_string),
        })),
        _ => None,
    }
}

/// Maps inbound commands onto the core entry points.
pub struct Dispatcher {
    client: Arc<TelegramClient>,
    fetcher: Arc<Fetcher>,
    resolver: Arc<ProxyResolver>,
}

impl Dispatcher {
    /// Creates a new dispatcher.
    pub fn new(
        client: Arc<TelegramClient>,
        fetcher: Arc<Fetcher>,
        resolver: Arc<ProxyResolver>,
    ) -> Self {
        Self {
            client,
            fetcher,
            resolver,
        }
    }

    /// Long-poll loop. Runs until the surrounding task is dropped.
    pub async fn run(&self) {
        info!("Command dispatcher started");
        let mut offset: i64 = 0;

        loop {
            match self.client.get_updates(offset).await {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        self.handle_update(update);
                    }
                }
                Err(e) => {
                    warn!("Polling for updates failed: {}", e);
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                }
            }
        }
    }

    /// Handles one inbound update without blocking the poll loop.
    fn handle_update(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(text) = message.text else {
            return;
        };
        let chat_id = message.chat.id;

        match parse_command(&text) {
            None => {
                debug!("Ignoring non-command message from chat {}", chat_id);
            }
            Some(Err(usage)) => {
                self.reply(chat_id, usage.to_string());
            }
            Some(Ok(Command::Help)) => {
                self.reply(chat_id, HELP_TEXT.to_string());
            }
            Some(Ok(Command::RefreshProxy { country })) => {
                let country =
                    country.unwrap_or_else(|| self.resolver.default_country().to_string());
                self.resolver.refresh(&country);
                self.reply(
                    chat_id,
                    format!("Proxy address will be updated soon for country {country}"),
                );
            }
            Some(Ok(Command::Retrieve {
                url,
                kind,
                use_proxy,
            })) => {
                info!("Chat {} requested {:?} of {}", chat_id, kind, url);
                let fetcher = Arc::clone(&self.fetcher);
                let client = Arc::clone(&self.client);

                tokio::spawn(async move {
                    let request = RetrievalRequest {
                        source_url: url,
                        destination: chat_id,
                        kind,
                        use_proxy,
                    };

                    match fetcher.retrieve(request).await {
                        Ok(artifact) => {
                            info!(
                                "Artifact {:?} queued for chat {}",
                                artifact.file_name(),
                                chat_id
                            );
                        }
                        Err(
                            e @ (RetrievalError::InvalidInput { .. }
                            | RetrievalError::RetrievalFailed { .. }),
                        ) => {
                            if let Err(send_err) =
                                client.send_message(chat_id, &e.to_string()).await
                            {
                                warn!("Failed to report error to chat {}: {}", chat_id, send_err);
                            }
                        }
                        Err(e) => {
                            error!("Retrieval for chat {} failed internally: {}", chat_id, e);
                        }
                    }
                });
            }
        }
    }

    /// Sends a reply without blocking the poll loop.
    fn reply(&self, chat_id: i64, text: String) {
        let client = Arc::clone(&self.client);
        tokio::spawn(async move {
            if let Err(e) = client.send_message(chat_id, &text).await {
                warn!("Failed to reply to chat {}: {}", chat_id, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_help() {
        assert_eq!(parse_command("/help"), Some(Ok(Command::Help)));
        assert_eq!(parse_command("/start"), Some(Ok(Command::Help)));
    }

    #[test]
    fn test_parse_download() {
        assert_eq!(
            parse_command("/dl https://example.test/v1"),
            Some(Ok(Command::Retrieve {
                url: "https://example.test/v1".to_string(),
                kind: TransformKind::Video,
                use_proxy: false,
            }))
        );
    }

    #[test]
    fn test_parse_download_with_proxy() {
        assert_eq!(
            parse_command("/dlp https://example.test/v1"),
            Some(Ok(Command::Retrieve {
                url: "https://example.test/v1".to_string(),
                kind: TransformKind::Video,
                use_proxy: true,
            }))
        );
    }

    #[test]
    fn test_parse_transforms() {
        let Some(Ok(Command::Retrieve { kind, .. })) = parse_command("/mp3 https://x.test/a")
        else {
            panic!("expected retrieve");
        };
        assert_eq!(kind, TransformKind::Audio);

        let Some(Ok(Command::Retrieve { kind, .. })) = parse_command("/gif https://x.test/a")
        else {
            panic!("expected retrieve");
        };
        assert_eq!(kind, TransformKind::Clip);
    }

    #[test]
    fn test_parse_missing_argument_yields_usage() {
        assert_eq!(parse_command("/dl"), Some(Err("Usage: /dl <url>")));
        assert_eq!(parse_command("/mp3"), Some(Err("Usage: /mp3 <url>")));
    }

    #[test]
    fn test_parse_refresh_proxy() {
        assert_eq!(
            parse_command("/proxy DE"),
            Some(Ok(Command::RefreshProxy {
                country: Some("DE".to_string()),
            }))
        );
        assert_eq!(
            parse_command("/proxy"),
            Some(Ok(Command::RefreshProxy { country: None }))
        );
    }

    #[test]
    fn test_parse_strips_bot_mention() {
        assert_eq!(
            parse_command("/dl@telegrab_bot https://example.test/v1"),
            Some(Ok(Command::Retrieve {
                url: "https://example.test/v1".to_string(),
                kind: TransformKind::Video,
                use_proxy: false,
            }))
        );
    }

    #[test]
    fn test_parse_ignores_plain_text_and_unknown_commands() {
        assert_eq!(parse_command("hello there"), None);
        assert_eq!(parse_command("/selfdestruct"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("   "), None);
    }
}
