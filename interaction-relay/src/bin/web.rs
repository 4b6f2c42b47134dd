//! Interaction Relay Web Server - signed interaction webhook receiver.
//!
//! This binary provides a thin, fast web server that:
//! - Verifies Ed25519 signatures on inbound interactions
//! - Responds to pings and defers application commands
//! - Forwards redacted application commands to Pub/Sub in the background

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use relay::web::{router, AppState};
use relay::{Config, Publisher, PubsubRestSink};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Load configuration; a missing or invalid public key is fatal
    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        port = config.port,
        pubsub_configured = config.sink.is_complete(),
        pubsub_project = ?config.sink.project_id,
        pubsub_topic = ?config.sink.topic,
        pubsub_emulator_host = ?config.sink.emulator_host,
        publish_timeout_secs = config.sink.publish_timeout.as_secs(),
        "config_loaded"
    );

    let publisher = build_publisher(&config).await?;

    let state = AppState::new(config.clone(), publisher);
    let app = router::build(state);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown. In-flight publishes are not awaited.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Build the publisher, or a disabled one when the sink is not configured.
async fn build_publisher(config: &Config) -> Result<Publisher> {
    let Some(target) = config.sink.target() else {
        info!("pubsub_not_configured");
        return Ok(Publisher::disabled());
    };

    let client = reqwest::Client::builder()
        .timeout(config.sink.publish_timeout)
        .build()
        .context("Failed to create HTTP client")?;

    let sink = PubsubRestSink::from_target(client, target, config.sink.publish_timeout)
        .context("Invalid PUBSUB_EMULATOR_HOST")?;

    // Best effort: a fresh emulator has no topics.
    if let Err(e) = sink.ensure_topic(target.topic).await {
        warn!(topic = target.topic, error = %e, "pubsub_topic_bootstrap_failed");
    }

    info!(
        emulator_host = target.emulator_host,
        project = target.project_id,
        topic = target.topic,
        "pubsub_configured"
    );

    Ok(Publisher::new(
        Arc::new(sink),
        target.topic,
        config.sink.publish_timeout,
    ))
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "ctrl_c_handler_failed");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "sigterm_handler_failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
