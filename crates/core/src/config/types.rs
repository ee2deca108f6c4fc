use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::extractor::ExtractorConfig;
use crate::fetcher::FetcherConfig;
use crate::proxy::ProxyConfig;
use crate::relay::RelayConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    /// Bot API token. Usually supplied via `TELEGRAB_BOT_TOKEN`.
    #[serde(default)]
    pub token: String,

    /// Base URL of the Bot API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Long-poll timeout for getUpdates in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u32,

    /// Timeout for a single upload to the chat platform in seconds.
    #[serde(default = "default_send_timeout")]
    pub send_timeout_secs: u32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: default_api_url(),
            poll_timeout_secs: default_poll_timeout(),
            send_timeout_secs: default_send_timeout(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u32 {
    30
}

fn default_send_timeout() -> u32 {
    120
}

/// HTTP server configuration (proxy resolver service)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Sanitized config for logging and API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub bot: SanitizedBotConfig,
    pub server: ServerConfig,
    pub extractor: ExtractorConfig,
    pub fetcher: FetcherConfig,
    pub relay: RelayConfig,
    pub proxy: ProxyConfig,
}

/// Sanitized bot config (token hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedBotConfig {
    pub api_url: String,
    pub token_configured: bool,
    pub poll_timeout_secs: u32,
    pub send_timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            bot: SanitizedBotConfig {
                api_url: config.bot.api_url.clone(),
                token_configured: !config.bot.token.is_empty(),
                poll_timeout_secs: config.bot.poll_timeout_secs,
                send_timeout_secs: config.bot.send_timeout_secs,
            },
            server: config.server.clone(),
            extractor: config.extractor.clone(),
            fetcher: config.fetcher.clone(),
            relay: config.relay.clone(),
            proxy: config.proxy.clone(),
        }
    }
}
