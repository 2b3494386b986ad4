//! CryptoWeather Nexus - Entry Point
//!
//! Initializes configuration, logging, the dashboard store, the REST
//! providers, and the live feed. Runs until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml + validate
//! 2. Init tracing (JSON structured logging)
//! 3. Create the DashboardStore (single source of truth)
//! 4. Create REST providers (CoinGecko / OpenWeatherMap / NewsData)
//! 5. Spawn health server (/live + /ready)
//! 6. Start the feed supervisor (remote or simulated strategy,
//!    tick pipeline, weather alert simulator)
//! 7. Spawn the snapshot refresh loop
//! 8. Wait for SIGINT → graceful shutdown (stop feed → join → exit)

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use cryptoweather_nexus::adapters::api::{CoinGeckoClient, NewsDataClient, OpenWeatherClient};
use cryptoweather_nexus::adapters::feeds::FeedSupervisor;
use cryptoweather_nexus::config::{self, HealthConfig};
use cryptoweather_nexus::ports::clock::SystemClock;
use cryptoweather_nexus::store::DashboardStore;
use cryptoweather_nexus::usecases::RefreshLoop;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config = config::loader::load_config("config.toml")
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.dashboard.log_level)
            }),
        )
        .json()
        .init();

    info!(
        name = %config.dashboard.name,
        version = env!("CARGO_PKG_VERSION"),
        mode = ?config.feed.mode,
        assets = config.feed.assets.len(),
        "Starting CryptoWeather Nexus"
    );

    // ── 3. Shutdown signal channels ─────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);
    let (health_tx, health_rx) = watch::channel(true);

    // ── 4. Store and providers ──────────────────────────────
    let clock = Arc::new(SystemClock);
    let store = Arc::new(DashboardStore::new(clock.clone()));

    let crypto_provider = Arc::new(
        CoinGeckoClient::new(&config.providers).context("Failed to create CoinGecko client")?,
    );
    let weather_provider = Arc::new(
        OpenWeatherClient::new(&config.providers)
            .context("Failed to create OpenWeatherMap client")?,
    );
    let news_provider = Arc::new(
        NewsDataClient::new(&config.providers).context("Failed to create NewsData client")?,
    );

    // ── 5. Spawn health endpoints ───────────────────────────
    let health_handle = tokio::spawn(serve_health(health_rx, config.health.clone()));

    // ── 6. Start the live feed ──────────────────────────────
    let supervisor = FeedSupervisor::new(&config, Arc::clone(&store), clock);
    let feed_handle = supervisor.start();

    // ── 7. Spawn the snapshot refresh loop ──────────────────
    let asset_ids: Vec<String> = config.feed.assets.iter().map(|a| a.id.clone()).collect();
    let refresh = RefreshLoop::new(
        &config.refresh,
        asset_ids,
        Arc::clone(&store),
        crypto_provider,
        weather_provider,
        news_provider,
    );
    let refresh_shutdown = shutdown_tx.subscribe();
    let refresh_handle = tokio::spawn(async move {
        refresh.run(refresh_shutdown).await;
    });

    info!("All tasks spawned - dashboard core is running");

    // ── 8. Wait for SIGINT ──────────────────────────────────
    signal::ctrl_c().await.context("Failed to listen for SIGINT")?;
    info!("SIGINT received, initiating graceful shutdown");

    // Mark health as unhealthy (readiness probe → 503).
    let _ = health_tx.send(false);

    // Stop the feed: no further store mutations from the feed side.
    feed_handle.stop();
    let _ = shutdown_tx.send(());

    // Join feed tasks (up to 5s).
    for task in supervisor.take_tasks() {
        if tokio::time::timeout(std::time::Duration::from_secs(5), task)
            .await
            .is_err()
        {
            warn!("Feed task did not stop within 5s");
        }
    }

    // Join the refresh loop (up to 5s).
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), refresh_handle).await;

    // Stop the health server.
    health_handle.abort();

    info!(
        notifications = store.notifications().len(),
        unread = store.unread_count(),
        "Shutdown complete"
    );
    Ok(())
}

/// Serve health endpoints.
///
/// - `/live`  - Liveness probe: 200 if process is running
/// - `/ready` - Readiness probe: 503 during graceful shutdown
async fn serve_health(health_rx: watch::Receiver<bool>, config: HealthConfig) -> Result<()> {
    use axum::{extract::State, http::StatusCode, routing::get, Router};

    let app = Router::new()
        .route("/live", get(|| async { StatusCode::OK }))
        .route(
            "/ready",
            get(|State(rx): State<watch::Receiver<bool>>| async move {
                if *rx.borrow() {
                    StatusCode::OK
                } else {
                    StatusCode::SERVICE_UNAVAILABLE
                }
            }),
        )
        .with_state(health_rx);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!(addr = %config.bind_address, "Health server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
