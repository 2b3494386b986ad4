//! Snapshot Refresh Loop
//!
//! Periodically refreshes the three dashboard collections from their
//! REST providers and replaces the store snapshots. Providers degrade
//! to mock records internally, so an iteration never fails; the loop
//! runs until shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::RefreshConfig;
use crate::ports::providers::{CryptoProvider, NewsProvider, WeatherProvider};
use crate::store::DashboardStore;

/// Periodic snapshot refresher.
pub struct RefreshLoop {
    store: Arc<DashboardStore>,
    crypto: Arc<dyn CryptoProvider>,
    weather: Arc<dyn WeatherProvider>,
    news: Arc<dyn NewsProvider>,
    interval: Duration,
    asset_ids: Vec<String>,
    cities: Vec<String>,
}

impl RefreshLoop {
    pub fn new(
        config: &RefreshConfig,
        asset_ids: Vec<String>,
        store: Arc<DashboardStore>,
        crypto: Arc<dyn CryptoProvider>,
        weather: Arc<dyn WeatherProvider>,
        news: Arc<dyn NewsProvider>,
    ) -> Self {
        Self {
            store,
            crypto,
            weather,
            news,
            interval: Duration::from_secs(config.interval_secs),
            asset_ids,
            cities: config.cities.clone(),
        }
    }

    /// Fetch all three snapshots and replace the store collections.
    pub async fn refresh_once(&self) {
        let crypto = self.crypto.fetch(&self.asset_ids).await;
        debug!(records = crypto.len(), "Crypto snapshot refreshed");
        self.store.set_crypto(crypto);

        let weather = self.weather.fetch(&self.cities).await;
        debug!(records = weather.len(), "Weather snapshot refreshed");
        self.store.set_weather(weather);

        let news = self.news.fetch().await;
        debug!(records = news.len(), "News snapshot refreshed");
        self.store.set_news(news);
    }

    /// Refresh immediately, then on every interval until shutdown.
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.interval);
        info!(
            interval_secs = self.interval.as_secs(),
            "Snapshot refresh loop started"
        );

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received in refresh loop");
                    return;
                }
                _ = interval.tick() => {
                    self.refresh_once().await;
                }
            }
        }
    }
}
