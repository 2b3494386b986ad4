//! Price Feed Port - Live Tick Source Interface
//!
//! Defines the trait for streaming (asset, price) ticks into the
//! dashboard, plus the error taxonomy shared by feed adapters.
//! Implementors emit ticks via a broadcast channel; the tick pipeline
//! in `usecases::live_updates` is the single consumer that mutates
//! the store. Transport details never leak past this boundary.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::broadcast;

/// Lightweight asset identifier used at the ports boundary
/// (e.g. "bitcoin", "ethereum").
pub type AssetId = String;

/// A single price observation for a tracked asset.
#[derive(Debug, Clone)]
pub struct PriceTick {
    /// Tracked asset identifier.
    pub asset_id: AssetId,
    /// Observed price in USD.
    pub price: f64,
    /// Arrival timestamp (Unix ms).
    pub received_ms: u64,
}

/// Which live-feed strategy to run. Chosen once at startup from
/// config; never renegotiated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedMode {
    /// Subscribe to the upstream push feed, with backoff reconnect
    /// and a permanent polling fallback after the attempt cap.
    Remote,
    /// Locally generated ticks on a fixed timer.
    Simulated,
}

/// Errors raised inside feed adapters.
///
/// None of these are user-visible: transport errors trigger the
/// reconnect/fallback policy, poll errors are retried on the next
/// interval, and parse errors drop the offending message only.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Push-feed connect or message failure.
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// Polling fallback request failure.
    #[error("poll request failed: {0}")]
    Poll(#[from] reqwest::Error),

    /// Malformed tick payload.
    #[error("malformed tick payload: {0}")]
    Parse(#[from] serde_json::Error),

    /// A price field that did not parse as a number.
    #[error("unparseable price for {asset}: {raw:?}")]
    BadPrice { asset: String, raw: String },
}

/// Trait for live price tick sources.
///
/// Implementors own their transport (WebSocket, timer) and broadcast
/// `PriceTick` events. `run` drives the source until the shutdown
/// channel fires; it must not mutate application state itself.
#[async_trait]
pub trait LiveFeed: Send + Sync + 'static {
    /// Get a receiver for price ticks.
    fn subscribe(&self) -> broadcast::Receiver<PriceTick>;

    /// Run the feed until shutdown. Recovers from transport failure
    /// internally; returns `Err` only for unrecoverable conditions.
    async fn run(&self, shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()>;
}
