//! Configuration Module - TOML-based Service Configuration
//!
//! Loads and validates configuration from `config.toml`. Endpoints,
//! tracked assets, intervals, and the alert threshold are all
//! externalized here - nothing is hardcoded in the domain layer.

pub mod loader;

use serde::Deserialize;

use crate::ports::price_feed::FeedMode;

/// Top-level service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Service identity and logging.
    pub dashboard: DashboardConfig,
    /// Live feed strategy and tracked assets.
    pub feed: FeedConfig,
    /// Price-alert rule parameters.
    #[serde(default)]
    pub alerts: AlertConfig,
    /// Weather alert simulator parameters.
    #[serde(default)]
    pub weather_alerts: WeatherAlertConfig,
    /// REST provider endpoints and keys.
    #[serde(default)]
    pub providers: ProviderConfig,
    /// Snapshot refresh loop parameters.
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// Health endpoint binding.
    #[serde(default)]
    pub health: HealthConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Human-readable service name.
    pub name: String,
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Live feed configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Remote push feed or local simulation. Fixed at startup.
    pub mode: FeedMode,
    /// Push feed endpoint; the tracked asset list is appended as a
    /// query parameter.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// REST endpoint for the post-exhaustion polling fallback.
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    /// Simulated strategy tick interval (seconds).
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
    /// Polling fallback interval (seconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// First reconnect delay (milliseconds).
    #[serde(default = "default_backoff_base")]
    pub backoff_base_ms: u64,
    /// Multiplier applied to the delay per attempt.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Consecutive failed attempts before the permanent fallback.
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
    /// Maximum simulated per-tick movement (0.02 = ±2%).
    #[serde(default = "default_jitter_pct")]
    pub sim_jitter_pct: f64,
    /// The fixed set of tracked assets.
    pub assets: Vec<TrackedAsset>,
}

/// One tracked asset.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackedAsset {
    /// Upstream asset id, e.g. "bitcoin".
    pub id: String,
    /// Display name used in alert messages, e.g. "Bitcoin".
    pub name: String,
    /// Ticker symbol, e.g. "BTC".
    pub symbol: String,
    /// Baseline price for the simulated strategy.
    #[serde(default = "default_baseline")]
    pub baseline: f64,
}

/// Price-alert rule configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    /// Relative change that must be strictly exceeded to alert.
    #[serde(default = "default_alert_threshold")]
    pub threshold: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            threshold: default_alert_threshold(),
        }
    }
}

/// Weather alert simulator configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherAlertConfig {
    /// Minimum seconds between simulated alerts.
    #[serde(default = "default_weather_min")]
    pub min_interval_secs: u64,
    /// Maximum seconds between simulated alerts.
    #[serde(default = "default_weather_max")]
    pub max_interval_secs: u64,
}

impl Default for WeatherAlertConfig {
    fn default() -> Self {
        Self {
            min_interval_secs: default_weather_min(),
            max_interval_secs: default_weather_max(),
        }
    }
}

/// REST provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// CoinGecko API base URL.
    #[serde(default = "default_coingecko_url")]
    pub coingecko_url: String,
    /// OpenWeatherMap API base URL.
    #[serde(default = "default_openweather_url")]
    pub openweather_url: String,
    /// OpenWeatherMap API key; mock weather data when absent.
    #[serde(default)]
    pub weather_api_key: Option<String>,
    /// NewsData API base URL.
    #[serde(default = "default_newsdata_url")]
    pub newsdata_url: String,
    /// NewsData API key; mock headlines when absent.
    #[serde(default)]
    pub news_api_key: Option<String>,
    /// News cache lifetime (seconds).
    #[serde(default = "default_news_cache")]
    pub news_cache_secs: u64,
    /// NewsData request budget for the process lifetime.
    #[serde(default = "default_news_credits")]
    pub news_credit_budget: u32,
    /// Request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            coingecko_url: default_coingecko_url(),
            openweather_url: default_openweather_url(),
            weather_api_key: None,
            newsdata_url: default_newsdata_url(),
            news_api_key: None,
            news_cache_secs: default_news_cache(),
            news_credit_budget: default_news_credits(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Snapshot refresh configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Seconds between full snapshot refreshes.
    #[serde(default = "default_refresh_interval")]
    pub interval_secs: u64,
    /// Cities tracked on the weather card.
    #[serde(default = "default_cities")]
    pub cities: Vec<String>,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_refresh_interval(),
            cities: default_cities(),
        }
    }
}

/// Health endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    /// Bind address for /live and /ready.
    #[serde(default = "default_health_addr")]
    pub bind_address: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            bind_address: default_health_addr(),
        }
    }
}

// Default value functions for serde

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ws_url() -> String {
    "wss://ws.coincap.io/prices".to_string()
}

fn default_rest_url() -> String {
    "https://api.coincap.io/v2/assets".to_string()
}

fn default_tick_interval() -> u64 {
    5
}

fn default_poll_interval() -> u64 {
    10
}

fn default_backoff_base() -> u64 {
    1_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_max_reconnect_attempts() -> u32 {
    5
}

fn default_jitter_pct() -> f64 {
    0.02
}

fn default_baseline() -> f64 {
    100.0
}

fn default_alert_threshold() -> f64 {
    0.01
}

fn default_weather_min() -> u64 {
    30
}

fn default_weather_max() -> u64 {
    60
}

fn default_coingecko_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_openweather_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_newsdata_url() -> String {
    "https://newsdata.io/api/1".to_string()
}

fn default_news_cache() -> u64 {
    600
}

fn default_news_credits() -> u32 {
    200
}

fn default_timeout() -> u64 {
    30
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_cities() -> Vec<String> {
    vec![
        "New York".to_string(),
        "London".to_string(),
        "Tokyo".to_string(),
    ]
}

fn default_health_addr() -> String {
    "0.0.0.0:9090".to_string()
}
