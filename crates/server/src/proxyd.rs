//! Standalone proxy resolver service.
//!
//! Exposes the resolver over HTTP for deployments that keep proxy
//! discovery out of the bot process: `GET /` returns the current proxy
//! address (possibly empty) and `GET /update?country=CC` triggers an
//! asynchronous refresh and returns immediately.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Query, State};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use telegrab_core::{
    load_config, load_config_from_env, validate_config, Config, HttpBroker, ProxyResolver,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Clone)]
struct AppState {
    resolver: Arc<ProxyResolver>,
}

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
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("telegrab-proxyd {} starting", VERSION);

    let config = load_configuration()?;
    validate_config(&config).context("Configuration validation failed")?;

    let broker = Arc::new(HttpBroker::new(config.proxy.clone()));
    let resolver = Arc::new(ProxyResolver::new(broker, config.proxy.clone()));

    info!(
        "Priming proxy slot for country {}",
        resolver.default_country()
    );
    resolver.refresh_default();

    let app = create_router(AppState { resolver });

    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting proxy resolver service on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("telegrab-proxyd stopped");
    Ok(())
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(current_proxy))
        .route("/update", get(trigger_update))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /` — the current proxy address, empty while discovery is pending.
async fn current_proxy(State(state): State<AppState>) -> String {
    let proxy = state.resolver.current_proxy().await;
    if proxy.is_empty() {
        info!("Proxy slot is empty, discovery still pending");
    }
    proxy
}

#[derive(Debug, Deserialize)]
struct UpdateParams {
    country: Option<String>,
}

/// `GET /update?country=CC` — fire-and-forget refresh, immediate ack.
async fn trigger_update(
    State(state): State<AppState>,
    Query(params): Query<UpdateParams>,
) -> String {
    let country = params
        .country
        .unwrap_or_else(|| state.resolver.default_country().to_string());
    state.resolver.refresh(&country);
    format!("Proxy address will be updated soon with country code {country}")
}

/// Resolve and load the configuration, mirroring the bot daemon.
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
