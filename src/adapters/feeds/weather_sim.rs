//! Weather Alert Simulator
//!
//! Synthesizes WeatherAlert notifications from a small canned pool on
//! a randomized 30-60 s interval. There is no real weather alert
//! upstream; this runs in both feed modes and shares the ledger
//! insert path with price alerts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument};

use crate::config::WeatherAlertConfig;
use crate::domain::notification::NotificationKind;
use crate::store::DashboardStore;

/// Canned alert pool, picked from uniformly.
const WEATHER_EVENTS: [&str; 5] = [
    "Heavy rain expected in London tomorrow",
    "Heat wave warning for Tokyo this weekend",
    "Snowstorm alert for New York area",
    "Strong winds expected in London tonight",
    "Air quality warning for Tokyo metropolitan area",
];

/// Timer-driven WeatherAlert producer.
pub struct WeatherAlertSimulator {
    store: Arc<DashboardStore>,
    min_interval: Duration,
    max_interval: Duration,
    /// Shared stop flag: once set, nothing more reaches the store
    /// even if a timer was already due.
    stopped: Arc<AtomicBool>,
}

impl WeatherAlertSimulator {
    pub fn new(
        config: &WeatherAlertConfig,
        store: Arc<DashboardStore>,
        stopped: Arc<AtomicBool>,
    ) -> Self {
        Self {
            store,
            min_interval: Duration::from_secs(config.min_interval_secs),
            max_interval: Duration::from_secs(config.max_interval_secs),
            stopped,
        }
    }

    fn next_delay(&self) -> Duration {
        if self.max_interval <= self.min_interval {
            return self.min_interval;
        }
        rand::thread_rng().gen_range(self.min_interval..=self.max_interval)
    }

    fn pick_event() -> &'static str {
        WEATHER_EVENTS[rand::thread_rng().gen_range(0..WEATHER_EVENTS.len())]
    }

    /// Run until shutdown, inserting one alert per randomized delay.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(
            min_secs = self.min_interval.as_secs(),
            max_secs = self.max_interval.as_secs(),
            "Weather alert simulator started"
        );

        loop {
            let delay = self.next_delay();
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received in weather simulator");
                    return;
                }
                _ = tokio::time::sleep(delay) => {
                    if self.stopped.load(Ordering::SeqCst) {
                        return;
                    }
                    let message = Self::pick_event();
                    debug!(message, "Simulated weather alert");
                    self.store
                        .insert_notification(NotificationKind::WeatherAlert, message.to_string());
                }
            }
        }
    }
}
