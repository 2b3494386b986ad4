//! Integration Tests - End-to-end Pipeline Testing
//!
//! Exercises the feed supervisor, tick pipeline, weather simulator,
//! and refresh loop against the real store, with tokio's paused clock
//! standing in for wall time and mockall standing in for the REST
//! providers.

use std::sync::Arc;
use std::time::Duration;

use mockall::mock;

use cryptoweather_nexus::adapters::feeds::FeedSupervisor;
use cryptoweather_nexus::config::loader::parse_config;
use cryptoweather_nexus::config::AppConfig;
use cryptoweather_nexus::domain::model::{AssetPrice, CityWeather, NewsItem};
use cryptoweather_nexus::domain::notification::NotificationKind;
use cryptoweather_nexus::ports::clock::SystemClock;
use cryptoweather_nexus::ports::providers::{CryptoProvider, NewsProvider, WeatherProvider};
use cryptoweather_nexus::store::DashboardStore;
use cryptoweather_nexus::usecases::RefreshLoop;

fn simulated_config() -> AppConfig {
    parse_config(
        r#"
        [dashboard]
        name = "nexus-test"

        [feed]
        mode = "simulated"
        tick_interval_secs = 5

        [[feed.assets]]
        id = "bitcoin"
        name = "Bitcoin"
        symbol = "BTC"
        baseline = 65000.0

        [[feed.assets]]
        id = "ethereum"
        name = "Ethereum"
        symbol = "ETH"
        baseline = 3500.0
        "#,
    )
    .expect("test config must parse")
}

fn new_store() -> Arc<DashboardStore> {
    Arc::new(DashboardStore::with_system_clock())
}

#[tokio::test(start_paused = true)]
async fn simulated_feed_populates_the_store() {
    let config = simulated_config();
    let store = new_store();
    let supervisor = FeedSupervisor::new(&config, Arc::clone(&store), Arc::new(SystemClock));

    let _handle = supervisor.start();

    // Three tick intervals of simulated time.
    tokio::time::sleep(Duration::from_secs(16)).await;

    let crypto = store.crypto();
    assert_eq!(crypto.len(), 2, "both tracked assets seeded");
    for asset in &crypto {
        // Seeded at baseline ±5% and walked ±2% per tick: still well
        // inside a ±20% envelope after three ticks.
        let baseline = if asset.id == "bitcoin" { 65_000.0 } else { 3_500.0 };
        assert!(
            (asset.price - baseline).abs() / baseline < 0.2,
            "{} drifted implausibly: {}",
            asset.id,
            asset.price
        );
    }

    // The ledger invariant holds whatever alerts fired.
    let notifications = store.notifications();
    let unread = notifications.iter().filter(|n| !n.read).count();
    assert_eq!(store.unread_count(), unread);
}

#[tokio::test(start_paused = true)]
async fn start_is_idempotent() {
    let config = simulated_config();
    let store = new_store();
    let supervisor = FeedSupervisor::new(&config, Arc::clone(&store), Arc::new(SystemClock));

    let first = supervisor.start();
    let second = supervisor.start();

    // One strategy task, one pipeline task, one weather simulator,
    // regardless of how many times start() was called.
    assert_eq!(supervisor.take_tasks().len(), 3);

    // Both handles control the same instance.
    first.stop();
    assert!(second.is_stopped());
}

#[tokio::test(start_paused = true)]
async fn stop_freezes_the_store() {
    let config = simulated_config();
    let store = new_store();
    let supervisor = FeedSupervisor::new(&config, Arc::clone(&store), Arc::new(SystemClock));

    let handle = supervisor.start();
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert!(store.mutation_count() > 0, "feed produced mutations");

    handle.stop();
    // Idempotent.
    handle.stop();

    // Let every task observe the shutdown broadcast.
    for task in supervisor.take_tasks() {
        task.await.expect("task must exit cleanly");
    }

    let frozen = store.mutation_count();
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(
        store.mutation_count(),
        frozen,
        "no mutations may land after stop()"
    );
}

#[tokio::test(start_paused = true)]
async fn weather_alerts_flow_into_the_shared_ledger() {
    let config = simulated_config();
    let store = new_store();
    let supervisor = FeedSupervisor::new(&config, Arc::clone(&store), Arc::new(SystemClock));

    let handle = supervisor.start();

    // Two maximum weather intervals guarantee at least two alerts.
    tokio::time::sleep(Duration::from_secs(121)).await;

    let weather_alerts: Vec<_> = store
        .notifications()
        .into_iter()
        .filter(|n| n.kind == NotificationKind::WeatherAlert)
        .collect();
    assert!(
        weather_alerts.len() >= 2,
        "expected >= 2 weather alerts, got {}",
        weather_alerts.len()
    );

    // Read-state tracking spans both alert kinds.
    let total = store.notifications().len();
    assert_eq!(store.unread_count(), total);
    store.mark_read(&weather_alerts[0].id);
    assert_eq!(store.unread_count(), total - 1);
    store.mark_all_read();
    assert_eq!(store.unread_count(), 0);

    handle.stop();
}

// ---- Mock providers for the refresh loop ----

mock! {
    pub Crypto {}

    #[async_trait::async_trait]
    impl CryptoProvider for Crypto {
        async fn fetch(&self, ids: &[String]) -> Vec<AssetPrice>;
    }
}

mock! {
    pub Weather {}

    #[async_trait::async_trait]
    impl WeatherProvider for Weather {
        async fn fetch(&self, cities: &[String]) -> Vec<CityWeather>;
    }
}

mock! {
    pub News {}

    #[async_trait::async_trait]
    impl NewsProvider for News {
        async fn fetch(&self) -> Vec<NewsItem>;
    }
}

#[tokio::test]
async fn refresh_loop_queries_each_provider_once_per_pass() {
    let store = new_store();

    let mut crypto = MockCrypto::new();
    crypto.expect_fetch().times(1).returning(|ids| {
        ids.iter()
            .map(|id| AssetPrice {
                id: id.clone(),
                name: id.clone(),
                symbol: String::new(),
                price: 1.0,
                change_24h: 0.0,
                market_cap: 0.0,
            })
            .collect()
    });

    let mut weather = MockWeather::new();
    weather.expect_fetch().times(1).returning(|_| vec![]);

    let mut news = MockNews::new();
    news.expect_fetch().times(1).returning(Vec::new);

    let refresh = RefreshLoop::new(
        &cryptoweather_nexus::config::RefreshConfig::default(),
        vec!["bitcoin".into()],
        Arc::clone(&store),
        Arc::new(crypto),
        Arc::new(weather),
        Arc::new(news),
    );

    refresh.refresh_once().await;
    assert_eq!(store.crypto().len(), 1);
}
