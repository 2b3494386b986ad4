//! Core dashboard record types.
//!
//! Normalized shapes for the three aggregated data domains. These are
//! the records the REST provider adapters map raw API responses into,
//! and the only shapes the store ever holds. Plain serde structs with
//! f64 prices - precision beyond display needs is not a goal here.

use serde::{Deserialize, Serialize};

/// A tracked cryptocurrency market record.
///
/// `price` is the only field mutated in place (by the live feed via
/// `DashboardStore::update_price`); everything else is replaced
/// wholesale on snapshot refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetPrice {
    /// Asset identifier, e.g. "bitcoin". Immutable once created.
    pub id: String,
    /// Display name, e.g. "Bitcoin".
    pub name: String,
    /// Ticker symbol, upper-cased, e.g. "BTC".
    pub symbol: String,
    /// Latest price in USD.
    pub price: f64,
    /// 24-hour change percentage.
    pub change_24h: f64,
    /// Market capitalization in USD.
    pub market_cap: f64,
}

/// Current weather for a single tracked city.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityWeather {
    /// City name as configured, e.g. "London".
    pub city: String,
    /// Temperature in °C.
    pub temperature: f64,
    /// Relative humidity percentage.
    pub humidity: f64,
    /// Short conditions label, e.g. "Rainy".
    pub conditions: String,
    /// Upstream icon code, e.g. "10d".
    pub icon: String,
}

/// A single news headline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    /// Upstream article identifier.
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    /// Source identifier, e.g. "coindesk".
    pub source: String,
    /// Publication timestamp as reported upstream (RFC 3339-ish).
    pub published_at: String,
}
