//! NewsData Headlines Client
//!
//! Fetches the latest crypto headlines with two guards around the
//! upstream's tight free-tier limits: a 10-minute in-memory cache and
//! a process-lifetime request budget. Cache hit, exhausted budget,
//! missing key, or any failure all degrade to the last cached or the
//! canned records.

use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::ProviderConfig;
use crate::domain::model::NewsItem;
use crate::ports::providers::NewsProvider;

#[derive(Debug, Deserialize)]
struct NewsResponse {
    results: Vec<NewsRecord>,
}

#[derive(Debug, Deserialize)]
struct NewsRecord {
    article_id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    link: String,
    #[serde(default)]
    source_id: Option<String>,
    #[serde(default)]
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Cache slot plus spent-credit accounting.
#[derive(Debug, Default)]
struct NewsCache {
    items: Option<Vec<NewsItem>>,
    fetched_at_ms: u64,
    credits_used: u32,
}

/// NewsData-backed headline provider.
pub struct NewsDataClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    cache_ms: u64,
    credit_budget: u32,
    cache: Mutex<NewsCache>,
}

impl NewsDataClient {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.newsdata_url.clone(),
            api_key: config.news_api_key.clone(),
            cache_ms: config.news_cache_secs * 1_000,
            credit_budget: config.news_credit_budget,
            cache: Mutex::new(NewsCache::default()),
        })
    }

    fn now_ms() -> u64 {
        u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
    }

    /// Cached items if still fresh, or `None` when a fetch is due.
    /// Reserves one credit when a fetch is allowed.
    fn check_cache(&self) -> Option<Vec<NewsItem>> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(items) = &cache.items {
            if Self::now_ms().saturating_sub(cache.fetched_at_ms) < self.cache_ms {
                debug!("Serving news from cache");
                return Some(items.clone());
            }
        }

        if cache.credits_used >= self.credit_budget {
            warn!(
                budget = self.credit_budget,
                "News credit budget exhausted, serving stale or mock records"
            );
            return Some(cache.items.clone().unwrap_or_else(mock_news));
        }

        cache.credits_used += 1;
        None
    }

    fn store_cache(&self, items: &[NewsItem]) {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache.items = Some(items.to_vec());
        cache.fetched_at_ms = Self::now_ms();
    }

    async fn fetch_latest(&self, api_key: &str) -> Result<Vec<NewsItem>> {
        let url = format!(
            "{}/news?apikey={}&q=cryptocurrency&language=en&category=business",
            self.base_url, api_key
        );

        let body: NewsResponse = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Failed to decode NewsData response")?;

        Ok(body
            .results
            .into_iter()
            .map(|r| NewsItem {
                id: r.article_id,
                title: r.title,
                description: r.description.unwrap_or_default(),
                url: r.link,
                source: r.source_id.unwrap_or_default(),
                published_at: r.pub_date.unwrap_or_default(),
            })
            .collect())
    }
}

#[async_trait]
impl NewsProvider for NewsDataClient {
    async fn fetch(&self) -> Vec<NewsItem> {
        let Some(api_key) = self.api_key.as_deref() else {
            info!("No news API key configured, serving mock records");
            return mock_news();
        };

        if let Some(cached) = self.check_cache() {
            return cached;
        }

        match self.fetch_latest(api_key).await {
            Ok(items) => {
                self.store_cache(&items);
                items
            }
            Err(e) => {
                warn!(error = %e, "News fetch failed, serving mock records");
                mock_news()
            }
        }
    }
}

/// Canned headlines served when the API is unavailable.
pub fn mock_news() -> Vec<NewsItem> {
    vec![
        NewsItem {
            id: "mock-1".into(),
            title: "Bitcoin Adoption Continues to Grow Among Institutional Investors".into(),
            description: "Major financial firms keep expanding their digital asset desks.".into(),
            url: "https://example.com/news/bitcoin-adoption".into(),
            source: "mock".into(),
            published_at: "2024-01-01T00:00:00Z".into(),
        },
        NewsItem {
            id: "mock-2".into(),
            title: "Ethereum Upgrade Promises Lower Transaction Fees".into(),
            description: "The next protocol release targets rollup data costs.".into(),
            url: "https://example.com/news/ethereum-upgrade".into(),
            source: "mock".into(),
            published_at: "2024-01-01T00:00:00Z".into(),
        },
        NewsItem {
            id: "mock-3".into(),
            title: "Regulators Weigh New Framework for Stablecoins".into(),
            description: "Draft legislation would set reserve and audit requirements.".into(),
            url: "https://example.com/news/stablecoin-framework".into(),
            source: "mock".into(),
            published_at: "2024-01-01T00:00:00Z".into(),
        },
    ]
}
