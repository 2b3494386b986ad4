//! CoinGecko Markets Client
//!
//! Fetches the markets snapshot for the tracked assets and maps it
//! into `AssetPrice` records. Any failure - network, status, decode -
//! is logged and answered with the canned fallback records, so the
//! refresh loop always has something to show.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::config::ProviderConfig;
use crate::domain::model::AssetPrice;
use crate::ports::providers::CryptoProvider;

/// One record from `/coins/markets`.
#[derive(Debug, Deserialize)]
struct MarketRecord {
    id: String,
    name: String,
    symbol: String,
    current_price: f64,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    market_cap: Option<f64>,
}

/// CoinGecko-backed crypto snapshot provider.
pub struct CoinGeckoClient {
    http: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.coingecko_url.clone(),
        })
    }

    async fn fetch_markets(&self, ids: &[String]) -> Result<Vec<AssetPrice>> {
        let url = format!(
            "{}/coins/markets?vs_currency=usd&ids={}&order=market_cap_desc\
             &per_page=100&page=1&sparkline=false&price_change_percentage=24h",
            self.base_url,
            ids.join(","),
        );

        let records: Vec<MarketRecord> = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Failed to decode CoinGecko response")?;

        Ok(records
            .into_iter()
            .map(|r| AssetPrice {
                id: r.id,
                name: r.name,
                symbol: r.symbol.to_uppercase(),
                price: r.current_price,
                change_24h: r.price_change_percentage_24h.unwrap_or(0.0),
                market_cap: r.market_cap.unwrap_or(0.0),
            })
            .collect())
    }
}

#[async_trait]
impl CryptoProvider for CoinGeckoClient {
    async fn fetch(&self, ids: &[String]) -> Vec<AssetPrice> {
        match self.fetch_markets(ids).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "CoinGecko fetch failed, serving mock records");
                mock_crypto()
            }
        }
    }
}

/// Canned markets snapshot served when the API is unreachable.
pub fn mock_crypto() -> Vec<AssetPrice> {
    vec![
        AssetPrice {
            id: "bitcoin".into(),
            name: "Bitcoin".into(),
            symbol: "BTC".into(),
            price: 65_000.0,
            change_24h: 2.5,
            market_cap: 1_250_000_000_000.0,
        },
        AssetPrice {
            id: "ethereum".into(),
            name: "Ethereum".into(),
            symbol: "ETH".into(),
            price: 3_500.0,
            change_24h: 1.8,
            market_cap: 420_000_000_000.0,
        },
        AssetPrice {
            id: "solana".into(),
            name: "Solana".into(),
            symbol: "SOL".into(),
            price: 140.0,
            change_24h: 3.2,
            market_cap: 60_000_000_000.0,
        },
    ]
}
