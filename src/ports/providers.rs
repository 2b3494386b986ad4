//! Provider Ports - Normalized REST Fetcher Interfaces
//!
//! The dashboard's snapshot data (crypto markets, city weather, news
//! headlines) comes from third-party REST APIs. These traits keep the
//! refresh loop ignorant of HTTP details; adapters map raw responses
//! into the domain record shapes and fall back to canned records on
//! failure, so a fetch never surfaces an error to the dashboard.

use async_trait::async_trait;

use crate::domain::model::{AssetPrice, CityWeather, NewsItem};

/// Crypto market snapshot source (CoinGecko in production).
#[async_trait]
pub trait CryptoProvider: Send + Sync + 'static {
    /// Fetch current market records for the given asset ids.
    async fn fetch(&self, ids: &[String]) -> Vec<AssetPrice>;
}

/// Current-weather source (OpenWeatherMap in production).
#[async_trait]
pub trait WeatherProvider: Send + Sync + 'static {
    /// Fetch current conditions for the given cities, one record per
    /// city (fallback record on per-city failure).
    async fn fetch(&self, cities: &[String]) -> Vec<CityWeather>;
}

/// Headline source (NewsData in production).
#[async_trait]
pub trait NewsProvider: Send + Sync + 'static {
    /// Fetch the latest crypto headlines.
    async fn fetch(&self) -> Vec<NewsItem>;
}
