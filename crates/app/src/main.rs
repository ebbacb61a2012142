//! paramsync service binary
//!
//! Polls the source table on a fixed interval, pushes changed parameter
//! values to the destination API and serves the recent-error log over HTTP.

mod logging;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use paramsync_core::{ErrorSink, SyncCycleConfig, SyncService};
use paramsync_domain::Config;
use paramsync_infra::{
    config, DestinationClient, ErrorLog, HttpClient, PgConnectionManager, PgParameterSource,
    SyncScheduler, SyncSchedulerConfig, TokenCache,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::logging::{init_logging, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    // .env may carry RUST_LOG / LOG_FORMAT, so it is read before logging starts
    let dotenv = dotenvy::dotenv();
    init_logging(LogFormat::from_env());
    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!(error = %e, "Ignoring unreadable .env file"),
    }

    let config = config::load().context("Failed to load configuration")?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        table = %config.database.table,
        destination = %config.api.base_url,
        interval_ms = config.sync.poll_interval_ms,
        "Starting paramsync"
    );

    run(config).await
}

async fn run(config: Config) -> Result<()> {
    let token_http = HttpClient::builder()
        .timeout(config.api.timeout())
        .build()
        .context("Failed to build token HTTP client")?;
    let tokens = Arc::new(TokenCache::new(token_http, config.auth.clone()));
    let destination = Arc::new(
        DestinationClient::from_config(tokens, &config.api, &config.sync)
            .context("Failed to build destination client")?,
    );

    let connections = Arc::new(PgConnectionManager::new(&config.database));
    let source = Arc::new(
        PgParameterSource::new(Arc::clone(&connections), &config.database)
            .context("Failed to build parameter source")?,
    );

    let errors = Arc::new(ErrorLog::new());
    let service = Arc::new(SyncService::new(
        source,
        destination,
        Arc::clone(&errors) as Arc<dyn ErrorSink>,
        SyncCycleConfig::from_config(&config.sync)?,
    ));

    let server_shutdown = CancellationToken::new();
    let server = serve_errors(config.server.port, errors, server_shutdown.clone()).await?;

    let mut scheduler = SyncScheduler::new(service, SyncSchedulerConfig::from_config(&config.sync));
    scheduler.start().await.context("Failed to start scheduler")?;

    wait_for_signal().await?;
    info!("Shutting down");

    if let Err(e) = scheduler.stop().await {
        warn!(error = %e, "Scheduler did not stop cleanly");
    }

    server_shutdown.cancel();
    match server.await {
        Ok(Ok(())) => debug!("Error endpoint stopped"),
        Ok(Err(e)) => error!(error = %e, "Error endpoint failed"),
        Err(e) => error!(error = %e, "Error endpoint task panicked"),
    }

    connections.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn serve_errors(
    port: u16,
    errors: Arc<ErrorLog>,
    shutdown: CancellationToken,
) -> Result<JoinHandle<std::io::Result<()>>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener =
        TcpListener::bind(addr).await.with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Error endpoint listening");

    let app = routes::router(errors);
    Ok(tokio::spawn(async move {
        axum::serve(listener, app).with_graceful_shutdown(shutdown.cancelled_owned()).await
    }))
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    tokio::select! {
        _ = sigterm.recv() => info!("SIGTERM received"),
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl+C")?;
            info!("SIGINT received");
        }
    }
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl+C")?;
    info!("Ctrl+C received");
    Ok(())
}
