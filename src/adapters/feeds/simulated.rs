//! Simulated Feed - Timer-driven Local Price Strategy
//!
//! Stands in for the remote push feed when no upstream connectivity
//! is wanted (demos, development). Each tracked asset starts from a
//! randomized baseline and takes a bounded random walk: every tick
//! interval the price moves by a uniform ±2% (configurable) and a
//! `PriceTick` is broadcast, exactly like the remote strategy.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

use crate::config::FeedConfig;
use crate::ports::clock::Clock;
use crate::ports::price_feed::{LiveFeed, PriceTick};

/// Spread applied to the configured baseline at start (±5%).
const BASELINE_SPREAD: f64 = 0.05;

/// Locally generated price feed.
pub struct SimulatedFeed {
    tick_tx: broadcast::Sender<PriceTick>,
    /// (asset id, configured baseline price) pairs.
    assets: Vec<(String, f64)>,
    tick_interval: Duration,
    /// Maximum per-tick relative movement (0.02 = ±2%).
    jitter_pct: f64,
    clock: Arc<dyn Clock>,
}

impl SimulatedFeed {
    pub fn new(config: &FeedConfig, clock: Arc<dyn Clock>) -> Self {
        let (tick_tx, _) = broadcast::channel(4096);

        Self {
            tick_tx,
            assets: config
                .assets
                .iter()
                .map(|a| (a.id.clone(), a.baseline))
                .collect(),
            tick_interval: Duration::from_secs(config.tick_interval_secs),
            jitter_pct: config.sim_jitter_pct,
            clock,
        }
    }

    /// Randomized starting prices: baseline ± 5%.
    fn seed_prices(&self) -> Vec<(String, f64)> {
        let mut rng = rand::thread_rng();
        self.assets
            .iter()
            .map(|(id, baseline)| {
                let seeded =
                    baseline * rng.gen_range(1.0 - BASELINE_SPREAD..=1.0 + BASELINE_SPREAD);
                (id.clone(), seeded)
            })
            .collect()
    }

    /// Advance one synthetic price by a bounded random step.
    fn perturb(&self, price: f64) -> f64 {
        let step = rand::thread_rng().gen_range(-self.jitter_pct..=self.jitter_pct);
        price * (1.0 + step)
    }
}

#[async_trait]
impl LiveFeed for SimulatedFeed {
    fn subscribe(&self) -> broadcast::Receiver<PriceTick> {
        self.tick_tx.subscribe()
    }

    #[instrument(skip(self, shutdown_rx))]
    async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let mut prices = self.seed_prices();
        let mut interval = tokio::time::interval(self.tick_interval);
        // The immediate first tick only seeds the store.
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        info!(
            assets = prices.len(),
            interval_secs = self.tick_interval.as_secs(),
            "Simulated feed started"
        );

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received in simulated feed");
                    return Ok(());
                }
                _ = interval.tick() => {
                    for (asset_id, price) in &mut prices {
                        *price = self.perturb(*price);
                        debug!(asset = %asset_id, price = *price, "Simulated tick");
                        let _ = self.tick_tx.send(PriceTick {
                            asset_id: asset_id.clone(),
                            price: *price,
                            received_ms: self.clock.now_ms(),
                        });
                    }
                }
            }
        }
    }
}
