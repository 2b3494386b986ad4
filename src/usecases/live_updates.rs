//! Live Update Pipeline - Tick Ingestion and Alerting
//!
//! The single consumer of the live feed's broadcast channel. Per
//! tick, in order: apply the price to the store, then evaluate the
//! movement against the previous price, then insert a PriceAlert on a
//! qualifying change. Ticks for a given asset are processed in
//! delivery order; nothing is reordered or coalesced.
//!
//! Once the feed handle's stop flag is set, every tick still in
//! flight is discarded before touching the store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::config::FeedConfig;
use crate::domain::alert::AlertEvaluator;
use crate::domain::notification::NotificationKind;
use crate::ports::price_feed::PriceTick;
use crate::store::DashboardStore;

/// Routes feed ticks into store mutations and alerts.
pub struct TickPipeline {
    store: Arc<DashboardStore>,
    evaluator: AlertEvaluator,
    /// Asset id → display name, from config.
    names: HashMap<String, String>,
    /// Shared with the feed handle; set by `stop()`.
    stopped: Arc<AtomicBool>,
}

impl TickPipeline {
    pub fn new(
        feed_config: &FeedConfig,
        evaluator: AlertEvaluator,
        store: Arc<DashboardStore>,
        stopped: Arc<AtomicBool>,
    ) -> Self {
        let names = feed_config
            .assets
            .iter()
            .map(|a| (a.id.clone(), a.name.clone()))
            .collect();

        Self {
            store,
            evaluator,
            names,
            stopped,
        }
    }

    /// Apply one tick: price update, then alert evaluation. Discarded
    /// wholesale if the pipeline has been stopped.
    pub fn apply(&self, tick: &PriceTick) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }

        let previous = self.store.update_price(&tick.asset_id, tick.price);

        // First tick for an asset: nothing to compare against.
        let Some(previous) = previous else { return };

        let name = self
            .names
            .get(&tick.asset_id)
            .cloned()
            .unwrap_or_else(|| tick.asset_id.clone());

        if let Some(message) = self.evaluator.evaluate(&name, previous, tick.price) {
            info!(asset = %tick.asset_id, price = tick.price, "Price alert");
            self.store
                .insert_notification(NotificationKind::PriceAlert, message);
        }
    }

    /// Consume ticks until shutdown or the feed channel closes.
    pub async fn run(
        &self,
        mut tick_rx: broadcast::Receiver<PriceTick>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) {
        info!(assets = self.names.len(), "Tick pipeline started");

        loop {
            tokio::select! {
                biased;
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received in tick pipeline");
                    return;
                }
                tick = tick_rx.recv() => {
                    match tick {
                        Ok(t) => self.apply(&t),
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(dropped = n, "Tick pipeline lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            info!("Feed channel closed");
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackedAsset;
    use crate::ports::price_feed::FeedMode;

    fn feed_config() -> FeedConfig {
        FeedConfig {
            mode: FeedMode::Simulated,
            ws_url: String::new(),
            rest_url: String::new(),
            tick_interval_secs: 5,
            poll_interval_secs: 10,
            backoff_base_ms: 1_000,
            backoff_multiplier: 2.0,
            max_reconnect_attempts: 5,
            sim_jitter_pct: 0.02,
            assets: vec![TrackedAsset {
                id: "bitcoin".into(),
                name: "Bitcoin".into(),
                symbol: "BTC".into(),
                baseline: 65_000.0,
            }],
        }
    }

    fn pipeline(stopped: Arc<AtomicBool>) -> (Arc<DashboardStore>, TickPipeline) {
        let store = Arc::new(DashboardStore::with_system_clock());
        let pipeline = TickPipeline::new(
            &feed_config(),
            AlertEvaluator::default(),
            Arc::clone(&store),
            stopped,
        );
        (store, pipeline)
    }

    fn tick(asset_id: &str, price: f64) -> PriceTick {
        PriceTick {
            asset_id: asset_id.into(),
            price,
            received_ms: 0,
        }
    }

    #[test]
    fn first_tick_seeds_without_alerting() {
        let (store, pipeline) = pipeline(Arc::new(AtomicBool::new(false)));
        pipeline.apply(&tick("bitcoin", 65_000.0));

        assert_eq!(store.crypto()[0].price, 65_000.0);
        assert!(store.notifications().is_empty());
    }

    #[test]
    fn significant_move_inserts_price_alert() {
        let (store, pipeline) = pipeline(Arc::new(AtomicBool::new(false)));
        pipeline.apply(&tick("bitcoin", 100.0));
        pipeline.apply(&tick("bitcoin", 101.5));

        let notifications = store.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::PriceAlert);
        assert_eq!(notifications[0].message, "Bitcoin price surged to $101.50!");
        assert_eq!(store.unread_count(), 1);
    }

    #[test]
    fn small_move_updates_price_silently() {
        let (store, pipeline) = pipeline(Arc::new(AtomicBool::new(false)));
        pipeline.apply(&tick("bitcoin", 100.0));
        pipeline.apply(&tick("bitcoin", 100.5));

        assert_eq!(store.crypto()[0].price, 100.5);
        assert!(store.notifications().is_empty());
    }

    #[test]
    fn repeated_volatility_alerts_every_time() {
        // No debounce window: every qualifying tick alerts.
        let (store, pipeline) = pipeline(Arc::new(AtomicBool::new(false)));
        pipeline.apply(&tick("bitcoin", 100.0));
        pipeline.apply(&tick("bitcoin", 102.0));
        pipeline.apply(&tick("bitcoin", 104.5));
        pipeline.apply(&tick("bitcoin", 102.0));

        assert_eq!(store.notifications().len(), 3);
    }

    #[test]
    fn stopped_pipeline_discards_ticks() {
        let stopped = Arc::new(AtomicBool::new(false));
        let (store, pipeline) = pipeline(Arc::clone(&stopped));
        pipeline.apply(&tick("bitcoin", 100.0));
        let before = store.mutation_count();

        stopped.store(true, Ordering::SeqCst);
        pipeline.apply(&tick("bitcoin", 200.0));
        pipeline.apply(&tick("bitcoin", 300.0));

        assert_eq!(store.mutation_count(), before);
        assert_eq!(store.crypto()[0].price, 100.0);
    }

    #[tokio::test]
    async fn run_consumes_from_broadcast_channel() {
        let (store, pipeline) = pipeline(Arc::new(AtomicBool::new(false)));
        let (tick_tx, tick_rx) = broadcast::channel(16);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let runner = tokio::spawn(async move { pipeline.run(tick_rx, shutdown_rx).await });

        tick_tx.send(tick("bitcoin", 100.0)).unwrap();
        tick_tx.send(tick("bitcoin", 103.0)).unwrap();

        // Let the pipeline drain the channel.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(store.crypto()[0].price, 103.0);
        assert_eq!(store.notifications().len(), 1);

        shutdown_tx.send(()).unwrap();
        runner.await.unwrap();
    }
}
