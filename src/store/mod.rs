//! Dashboard State Store - Single Source of Truth
//!
//! Owns every collection the display surfaces read: crypto markets,
//! city weather, news headlines, favorites, and the notification
//! ledger. Producers (live feed pipeline, weather simulator, refresh
//! loop) never hold references into store memory; they submit
//! mutations through the methods here.
//!
//! Every mutation is one synchronous read-modify-write inside a
//! single lock acquisition, so a mutation can never observe another
//! one half-applied. All methods are cheap and non-blocking; callers
//! on tokio tasks hold no lock across an await point.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tracing::debug;

use crate::domain::model::{AssetPrice, CityWeather, NewsItem};
use crate::domain::notification::{Notification, NotificationKind, NotificationLedger};
use crate::ports::clock::{Clock, SystemClock};

/// Toggle-only favorites sets for cities and crypto assets.
#[derive(Debug, Default)]
struct Favorites {
    cities: HashSet<String>,
    cryptos: HashSet<String>,
}

/// The dashboard's single source of truth.
pub struct DashboardStore {
    crypto: RwLock<Vec<AssetPrice>>,
    weather: RwLock<Vec<CityWeather>>,
    news: RwLock<Vec<NewsItem>>,
    favorites: RwLock<Favorites>,
    notifications: Mutex<NotificationLedger>,
    clock: Arc<dyn Clock>,
    /// Bumped by every mutating method. Lets tests verify that a
    /// stopped feed produces zero further mutations.
    mutations: AtomicU64,
}

impl DashboardStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            crypto: RwLock::new(Vec::new()),
            weather: RwLock::new(Vec::new()),
            news: RwLock::new(Vec::new()),
            favorites: RwLock::new(Favorites::default()),
            notifications: Mutex::new(NotificationLedger::new()),
            clock,
            mutations: AtomicU64::new(0),
        }
    }

    /// Store backed by the production wall clock.
    pub fn with_system_clock() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    // ── Live price path ─────────────────────────────────────

    /// Apply a price tick for `asset_id`, returning the previous
    /// price. First tick for an asset upserts a minimal record and
    /// returns `None` (the caller skips alert evaluation then).
    pub fn update_price(&self, asset_id: &str, price: f64) -> Option<f64> {
        let mut crypto = self.crypto.write().unwrap_or_else(|e| e.into_inner());
        self.mutations.fetch_add(1, Ordering::Relaxed);

        if let Some(asset) = crypto.iter_mut().find(|a| a.id == asset_id) {
            let previous = asset.price;
            asset.price = price;
            return Some(previous);
        }

        debug!(asset = asset_id, price, "First tick for asset, seeding record");
        crypto.push(AssetPrice {
            id: asset_id.to_string(),
            name: asset_id.to_string(),
            symbol: String::new(),
            price,
            change_24h: 0.0,
            market_cap: 0.0,
        });
        None
    }

    /// Display name for an asset, falling back to its id.
    pub fn asset_name(&self, asset_id: &str) -> Option<String> {
        let crypto = self.crypto.read().unwrap_or_else(|e| e.into_inner());
        crypto.iter().find(|a| a.id == asset_id).map(|a| a.name.clone())
    }

    // ── Notification ledger ─────────────────────────────────

    /// Append a notification (unread, newest-first) and return its id.
    pub fn insert_notification(&self, kind: NotificationKind, message: String) -> String {
        let mut ledger = self.notifications.lock().unwrap_or_else(|e| e.into_inner());
        self.mutations.fetch_add(1, Ordering::Relaxed);
        ledger.insert(kind, message, self.clock.now_ms())
    }

    /// Mark one notification read; idempotent for unknown/read ids.
    pub fn mark_read(&self, id: &str) -> bool {
        let mut ledger = self.notifications.lock().unwrap_or_else(|e| e.into_inner());
        self.mutations.fetch_add(1, Ordering::Relaxed);
        ledger.mark_read(id)
    }

    /// Mark every notification read.
    pub fn mark_all_read(&self) {
        let mut ledger = self.notifications.lock().unwrap_or_else(|e| e.into_inner());
        self.mutations.fetch_add(1, Ordering::Relaxed);
        ledger.mark_all_read();
    }

    /// Snapshot of the ledger, newest first.
    pub fn notifications(&self) -> Vec<Notification> {
        let ledger = self.notifications.lock().unwrap_or_else(|e| e.into_inner());
        ledger.items().to_vec()
    }

    pub fn unread_count(&self) -> usize {
        let ledger = self.notifications.lock().unwrap_or_else(|e| e.into_inner());
        ledger.unread_count()
    }

    // ── Favorites ───────────────────────────────────────────

    /// Toggle a city in the favorites set; returns the new membership.
    pub fn toggle_favorite_city(&self, city: &str) -> bool {
        let mut favorites = self.favorites.write().unwrap_or_else(|e| e.into_inner());
        self.mutations.fetch_add(1, Ordering::Relaxed);
        if favorites.cities.remove(city) {
            false
        } else {
            favorites.cities.insert(city.to_string());
            true
        }
    }

    /// Toggle a crypto asset in the favorites set; returns the new
    /// membership.
    pub fn toggle_favorite_crypto(&self, asset_id: &str) -> bool {
        let mut favorites = self.favorites.write().unwrap_or_else(|e| e.into_inner());
        self.mutations.fetch_add(1, Ordering::Relaxed);
        if favorites.cryptos.remove(asset_id) {
            false
        } else {
            favorites.cryptos.insert(asset_id.to_string());
            true
        }
    }

    pub fn is_favorite_city(&self, city: &str) -> bool {
        let favorites = self.favorites.read().unwrap_or_else(|e| e.into_inner());
        favorites.cities.contains(city)
    }

    pub fn is_favorite_crypto(&self, asset_id: &str) -> bool {
        let favorites = self.favorites.read().unwrap_or_else(|e| e.into_inner());
        favorites.cryptos.contains(asset_id)
    }

    // ── Snapshot refresh ────────────────────────────────────

    /// Replace the crypto collection with a fresh REST snapshot.
    /// A live tick arriving later simply overwrites the price again.
    pub fn set_crypto(&self, records: Vec<AssetPrice>) {
        let mut crypto = self.crypto.write().unwrap_or_else(|e| e.into_inner());
        self.mutations.fetch_add(1, Ordering::Relaxed);
        *crypto = records;
    }

    pub fn set_weather(&self, records: Vec<CityWeather>) {
        let mut weather = self.weather.write().unwrap_or_else(|e| e.into_inner());
        self.mutations.fetch_add(1, Ordering::Relaxed);
        *weather = records;
    }

    pub fn set_news(&self, records: Vec<NewsItem>) {
        let mut news = self.news.write().unwrap_or_else(|e| e.into_inner());
        self.mutations.fetch_add(1, Ordering::Relaxed);
        *news = records;
    }

    // ── Read accessors for display surfaces ─────────────────

    pub fn crypto(&self) -> Vec<AssetPrice> {
        self.crypto.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn weather(&self) -> Vec<CityWeather> {
        self.weather.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn news(&self) -> Vec<NewsItem> {
        self.news.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Total mutating calls applied so far.
    pub fn mutation_count(&self) -> u64 {
        self.mutations.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> DashboardStore {
        DashboardStore::with_system_clock()
    }

    #[test]
    fn update_price_returns_previous() {
        let store = store();
        assert_eq!(store.update_price("bitcoin", 65_000.0), None);
        assert_eq!(store.update_price("bitcoin", 66_000.0), Some(65_000.0));
        assert_eq!(store.crypto()[0].price, 66_000.0);
    }

    #[test]
    fn update_price_in_snapshot_record() {
        let store = store();
        store.set_crypto(vec![AssetPrice {
            id: "ethereum".into(),
            name: "Ethereum".into(),
            symbol: "ETH".into(),
            price: 3_500.0,
            change_24h: 1.8,
            market_cap: 420e9,
        }]);

        assert_eq!(store.update_price("ethereum", 3_600.0), Some(3_500.0));
        assert_eq!(store.asset_name("ethereum").as_deref(), Some("Ethereum"));
    }

    #[test]
    fn favorites_toggle_both_ways() {
        let store = store();
        assert!(store.toggle_favorite_city("London"));
        assert!(store.is_favorite_city("London"));
        assert!(!store.toggle_favorite_city("London"));
        assert!(!store.is_favorite_city("London"));

        assert!(store.toggle_favorite_crypto("bitcoin"));
        assert!(!store.toggle_favorite_crypto("bitcoin"));
        assert!(!store.is_favorite_crypto("bitcoin"));
    }

    #[test]
    fn notification_flow_keeps_unread_invariant() {
        let store = store();
        let id = store.insert_notification(NotificationKind::PriceAlert, "a".into());
        store.insert_notification(NotificationKind::WeatherAlert, "b".into());
        assert_eq!(store.unread_count(), 2);

        assert!(store.mark_read(&id));
        assert_eq!(store.unread_count(), 1);
        // Idempotent.
        assert!(!store.mark_read(&id));
        assert_eq!(store.unread_count(), 1);

        store.mark_all_read();
        assert_eq!(store.unread_count(), 0);
        assert!(store.notifications().iter().all(|n| n.read));
    }

    #[test]
    fn mutation_count_tracks_writes() {
        let store = store();
        let before = store.mutation_count();
        store.update_price("bitcoin", 1.0);
        store.insert_notification(NotificationKind::PriceAlert, "x".into());
        store.mark_all_read();
        assert_eq!(store.mutation_count(), before + 3);

        // Reads do not count.
        let _ = store.crypto();
        let _ = store.unread_count();
        assert_eq!(store.mutation_count(), before + 3);
    }
}
