mod dispatcher;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use telegrab_core::{
    load_config, load_config_from_env, validate_config, Config, Extractor, Fetcher, HttpBroker,
    ProxyResolver, RelayScheduler, SanitizedConfig, TelegramClient, YtdlpExtractor,
};

use dispatcher::Dispatcher;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("telegrab {} starting", VERSION);

    let config = load_configuration()?;
    validate_config(&config).context("Configuration validation failed")?;

    if config.bot.token.is_empty() {
        bail!("Bot token is not configured; set TELEGRAB_BOT_TOKEN or bot.token in config.toml");
    }

    info!(
        "Configuration loaded: {}",
        serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default()
    );

    // Refuse to start without the external tools rather than failing on
    // the first request.
    let extractor = YtdlpExtractor::new(config.extractor.clone());
    extractor
        .validate()
        .await
        .context("Extractor validation failed")?;
    let extractor: Arc<dyn Extractor> = Arc::new(extractor);

    let broker = Arc::new(HttpBroker::new(config.proxy.clone()));
    let resolver = Arc::new(ProxyResolver::new(broker, config.proxy.clone()));

    // Prime the proxy slot so the first geo-blocked request has something
    // to fall back to.
    resolver.refresh_default();

    let client = Arc::new(TelegramClient::new(config.bot.clone()));

    let fetcher = Arc::new(Fetcher::new(
        config.fetcher.clone(),
        extractor,
        Arc::clone(&resolver),
    ));

    let scheduler = RelayScheduler::new(
        config.relay.clone(),
        fetcher.queue().clone(),
        Arc::clone(&client) as _,
    );
    scheduler.start().await;
    info!(
        "Relay scheduler started (every {}s)",
        config.relay.poll_interval_secs
    );

    let dispatcher = Dispatcher::new(Arc::clone(&client), fetcher, Arc::clone(&resolver));

    tokio::select! {
        _ = dispatcher.run() => {}
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    scheduler.stop().await;
    info!("telegrab stopped");

    Ok(())
}

/// Resolve and load the configuration.
///
/// `TELEGRAB_CONFIG` names an explicit file (missing it is an error). The
/// default `config.toml` is optional: without it the process runs on
/// environment variables and defaults alone.
fn load_configuration() -> Result<Config> {
    match std::env::var("TELEGRAB_CONFIG") {
        Ok(path) => {
            let path = PathBuf::from(path);
            info!("Loading configuration from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        Err(_) => {
            let path = PathBuf::from("config.toml");
            if path.exists() {
                info!("Loading configuration from {:?}", path);
                load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
            } else {
                info!("No config file found, using environment and defaults");
                load_config_from_env().context("Failed to load config from environment")
            }
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
