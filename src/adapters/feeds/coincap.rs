//! CoinCap Feed - Remote Live Price Strategy
//!
//! Subscribes to the CoinCap prices WebSocket for the tracked asset
//! set and broadcasts `PriceTick` events. Messages arrive as JSON
//! objects of `{ assetId: "price" }` fragments; keys outside the
//! tracked set are ignored, malformed payloads are logged and dropped
//! without disturbing the stream.
//!
//! Recovery: consecutive transport errors trigger exponential-backoff
//! reconnects (see `ReconnectPolicy`); once the attempt cap is
//! exhausted the feed permanently polls the same assets over REST at
//! a fixed interval. Poll failures are logged and retried on the next
//! interval tick. Nothing here is ever surfaced to the user.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite;
use tracing::{debug, info, instrument, warn};

use super::backoff::{FailureAction, ReconnectPolicy};
use crate::config::FeedConfig;
use crate::ports::clock::Clock;
use crate::ports::price_feed::{FeedError, LiveFeed, PriceTick};

/// One record from the REST polling fallback.
#[derive(Debug, Deserialize)]
struct PollAsset {
    id: String,
    #[serde(rename = "priceUsd")]
    price_usd: String,
}

/// Envelope of the REST polling response.
#[derive(Debug, Deserialize)]
struct PollResponse {
    data: Vec<PollAsset>,
}

/// CoinCap live price feed: WebSocket push with polling fallback.
pub struct CoinCapFeed {
    /// Broadcast sender for price ticks.
    tick_tx: broadcast::Sender<PriceTick>,
    /// Push feed endpoint including the tracked-asset query.
    ws_url: String,
    /// REST endpoint for the polling fallback.
    rest_url: String,
    /// Tracked asset ids; anything else in a payload is ignored.
    tracked: Vec<String>,
    /// Fixed polling interval after fallback.
    poll_interval: Duration,
    /// Backoff parameters for the reconnect policy.
    backoff_base: Duration,
    backoff_multiplier: f64,
    max_attempts: u32,
    http: reqwest::Client,
    clock: Arc<dyn Clock>,
}

impl CoinCapFeed {
    pub fn new(config: &FeedConfig, clock: Arc<dyn Clock>) -> Self {
        let (tick_tx, _) = broadcast::channel(4096);
        let tracked: Vec<String> = config.assets.iter().map(|a| a.id.clone()).collect();

        Self {
            tick_tx,
            ws_url: format!("{}?assets={}", config.ws_url, tracked.join(",")),
            rest_url: config.rest_url.clone(),
            tracked,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            backoff_multiplier: config.backoff_multiplier,
            max_attempts: config.max_reconnect_attempts,
            http: reqwest::Client::new(),
            clock,
        }
    }

    /// Parse one push-feed payload and broadcast ticks for tracked
    /// assets. Untracked keys are skipped. Fields are independent:
    /// an unparseable price drops that field only, so one bad value
    /// never suppresses the valid ticks beside it. A document that is
    /// not JSON at all is an error the caller logs and swallows.
    fn handle_message(&self, text: &str) -> Result<(), FeedError> {
        let prices: HashMap<String, String> = serde_json::from_str(text)?;

        for (asset_id, raw) in prices {
            if !self.tracked.contains(&asset_id) {
                continue;
            }
            match raw.parse::<f64>() {
                Ok(price) => self.emit(asset_id, price),
                Err(_) => {
                    let err = FeedError::BadPrice { asset: asset_id, raw };
                    warn!(error = %err, "Dropping unparseable price field");
                }
            }
        }
        Ok(())
    }

    fn emit(&self, asset_id: String, price: f64) {
        let tick = PriceTick {
            asset_id,
            price,
            received_ms: self.clock.now_ms(),
        };
        // Ignore if no receivers.
        let _ = self.tick_tx.send(tick);
    }

    /// Single connection session: stream until shutdown or error.
    async fn stream(
        &self,
        mut ws_stream: tokio_tungstenite::WebSocketStream<
            tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
        >,
        shutdown_rx: &mut broadcast::Receiver<()>,
    ) -> Result<(), FeedError> {
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received in CoinCap feed");
                    return Ok(());
                }
                msg = ws_stream.next() => {
                    match msg {
                        Some(Ok(tungstenite::Message::Text(text))) => {
                            if let Err(e) = self.handle_message(&text) {
                                warn!(error = %e, "Dropping malformed CoinCap message");
                            }
                        }
                        Some(Ok(tungstenite::Message::Ping(data))) => {
                            // Pong is handled automatically by tungstenite
                            debug!(len = data.len(), "CoinCap ping received");
                        }
                        Some(Ok(tungstenite::Message::Close(_))) => {
                            return Err(tungstenite::Error::ConnectionClosed.into());
                        }
                        Some(Err(e)) => return Err(e.into()),
                        None => return Err(tungstenite::Error::ConnectionClosed.into()),
                        _ => {}
                    }
                }
            }
        }
    }

    /// Fetch the tracked assets once over REST and broadcast ticks.
    async fn poll_once(&self) -> Result<(), FeedError> {
        let url = format!("{}?ids={}", self.rest_url, self.tracked.join(","));
        let body: PollResponse = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        self.emit_poll_records(body.data);
        Ok(())
    }

    fn emit_poll_records(&self, records: Vec<PollAsset>) {
        for record in records {
            if !self.tracked.contains(&record.id) {
                continue;
            }
            match record.price_usd.parse::<f64>() {
                Ok(price) => self.emit(record.id, price),
                Err(_) => warn!(
                    asset = %record.id,
                    raw = %record.price_usd,
                    "Dropping poll record with unparseable price"
                ),
            }
        }
    }

    /// Permanent polling loop, entered once the reconnect cap is
    /// exhausted. Runs until shutdown; never goes back to WebSocket.
    async fn poll_loop(&self, shutdown_rx: &mut broadcast::Receiver<()>) -> anyhow::Result<()> {
        let mut interval = tokio::time::interval(self.poll_interval);
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "CoinCap feed in polling fallback mode"
        );

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received in CoinCap poller");
                    return Ok(());
                }
                _ = interval.tick() => {
                    if let Err(e) = self.poll_once().await {
                        warn!(error = %e, "Poll request failed, retrying next interval");
                    }
                }
            }
        }
    }
}

#[async_trait]
impl LiveFeed for CoinCapFeed {
    fn subscribe(&self) -> broadcast::Receiver<PriceTick> {
        self.tick_tx.subscribe()
    }

    #[instrument(skip(self, shutdown_rx))]
    async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let mut policy =
            ReconnectPolicy::new(self.backoff_base, self.backoff_multiplier, self.max_attempts);

        info!(url = %self.ws_url, "Connecting to CoinCap WebSocket");

        loop {
            match connect_async(&self.ws_url).await {
                Ok((ws_stream, _)) => {
                    info!("CoinCap WebSocket connected");
                    policy.record_success();

                    match self.stream(ws_stream, &mut shutdown_rx).await {
                        Ok(()) => return Ok(()),
                        Err(e) => warn!(error = %e, "CoinCap WebSocket disconnected"),
                    }
                }
                Err(e) => warn!(error = %e, "CoinCap WebSocket connection failed"),
            }

            match policy.record_failure() {
                FailureAction::Retry(delay) => {
                    debug!(delay_ms = delay.as_millis() as u64, "Scheduling reconnect");
                    tokio::select! {
                        _ = shutdown_rx.recv() => return Ok(()),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                FailureAction::FallBack => {
                    warn!(
                        attempts = self.max_attempts,
                        "Reconnect cap exhausted, abandoning push feed"
                    );
                    return self.poll_loop(&mut shutdown_rx).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackedAsset;
    use crate::ports::clock::SystemClock;

    fn test_feed() -> CoinCapFeed {
        let config = FeedConfig {
            mode: crate::ports::price_feed::FeedMode::Remote,
            ws_url: "wss://ws.coincap.io/prices".into(),
            rest_url: "https://api.coincap.io/v2/assets".into(),
            tick_interval_secs: 5,
            poll_interval_secs: 10,
            backoff_base_ms: 1_000,
            backoff_multiplier: 2.0,
            max_reconnect_attempts: 5,
            sim_jitter_pct: 0.02,
            assets: vec![
                TrackedAsset {
                    id: "bitcoin".into(),
                    name: "Bitcoin".into(),
                    symbol: "BTC".into(),
                    baseline: 65_000.0,
                },
                TrackedAsset {
                    id: "ethereum".into(),
                    name: "Ethereum".into(),
                    symbol: "ETH".into(),
                    baseline: 3_500.0,
                },
            ],
        };
        CoinCapFeed::new(&config, Arc::new(SystemClock))
    }

    #[test]
    fn push_payload_emits_tracked_ticks_only() {
        let feed = test_feed();
        let mut rx = feed.subscribe();

        feed.handle_message(r#"{"bitcoin":"65001.5","dogecoin":"0.07"}"#)
            .unwrap();

        let tick = rx.try_recv().unwrap();
        assert_eq!(tick.asset_id, "bitcoin");
        assert!((tick.price - 65_001.5).abs() < f64::EPSILON);
        // dogecoin is not tracked: no second tick.
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn malformed_payload_is_an_error_not_a_panic() {
        let feed = test_feed();
        let mut rx = feed.subscribe();
        assert!(matches!(
            feed.handle_message("not json"),
            Err(FeedError::Parse(_))
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn bad_price_field_does_not_suppress_valid_fields() {
        let feed = test_feed();
        let mut rx = feed.subscribe();

        // Field independence must hold regardless of map iteration
        // order, so exercise the same mixed payload repeatedly.
        for _ in 0..64 {
            feed.handle_message(r#"{"bitcoin":"junk","ethereum":"3500.5"}"#)
                .unwrap();

            let tick = rx.try_recv().unwrap();
            assert_eq!(tick.asset_id, "ethereum");
            assert!((tick.price - 3_500.5).abs() < f64::EPSILON);
            // The bad bitcoin field is dropped alone: exactly one tick.
            assert!(rx.try_recv().is_err());
        }
    }

    #[test]
    fn poll_response_parses_and_emits() {
        let feed = test_feed();
        let mut rx = feed.subscribe();

        let body: PollResponse = serde_json::from_str(
            r#"{"data":[
                {"id":"bitcoin","priceUsd":"64999.9172"},
                {"id":"ethereum","priceUsd":"3501.04"},
                {"id":"solana","priceUsd":"140.2"}
            ]}"#,
        )
        .unwrap();
        feed.emit_poll_records(body.data);

        let first = rx.try_recv().unwrap();
        assert_eq!(first.asset_id, "bitcoin");
        let second = rx.try_recv().unwrap();
        assert_eq!(second.asset_id, "ethereum");
        // solana is untracked in this fixture.
        assert!(rx.try_recv().is_err());
    }
}
