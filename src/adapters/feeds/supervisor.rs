//! Feed Supervisor - Lifecycle Management for the Live Feed
//!
//! Owns the chosen feed strategy plus its co-scheduled tasks (tick
//! pipeline, weather alert simulator) and coordinates their lifetime:
//!
//! - `start()` is guarded by an atomic flag, so concurrent or repeat
//!   calls never spawn a second set of connections or timers.
//! - The returned `FeedHandle::stop()` is idempotent, and after it
//!   returns no tick, reconnect, poll result, or simulated alert is
//!   applied to the store: shutdown is broadcast to every task and a
//!   shared stop flag gates each mutation, so in-flight work finishes
//!   but its result is discarded.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

use super::coincap::CoinCapFeed;
use super::simulated::SimulatedFeed;
use super::weather_sim::WeatherAlertSimulator;
use crate::config::AppConfig;
use crate::domain::alert::AlertEvaluator;
use crate::ports::clock::Clock;
use crate::ports::price_feed::{FeedMode, LiveFeed};
use crate::store::DashboardStore;
use crate::usecases::live_updates::TickPipeline;

/// Handle to a running feed; cheap to clone.
#[derive(Clone)]
pub struct FeedHandle {
    shutdown_tx: broadcast::Sender<()>,
    stopped: Arc<AtomicBool>,
}

impl FeedHandle {
    /// Stop the feed and everything it scheduled. Repeated calls are
    /// no-ops. Once this returns, no further store mutations can come
    /// from the feed side.
    pub fn stop(&self) {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        // Receivers may already be gone if tasks exited on their own.
        let _ = self.shutdown_tx.send(());
        info!("Feed handle stopped");
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Supervises the live feed strategy and its derived tasks.
pub struct FeedSupervisor {
    feed: Arc<dyn LiveFeed>,
    pipeline: Arc<TickPipeline>,
    weather: Arc<WeatherAlertSimulator>,
    shutdown_tx: broadcast::Sender<()>,
    stopped: Arc<AtomicBool>,
    /// Set by the first `start()`; later calls reuse the handle.
    started: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl FeedSupervisor {
    /// Build the supervisor for the configured strategy. Nothing runs
    /// until `start()`.
    pub fn new(config: &AppConfig, store: Arc<DashboardStore>, clock: Arc<dyn Clock>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(4);
        let stopped = Arc::new(AtomicBool::new(false));

        let feed: Arc<dyn LiveFeed> = match config.feed.mode {
            FeedMode::Remote => Arc::new(CoinCapFeed::new(&config.feed, Arc::clone(&clock))),
            FeedMode::Simulated => Arc::new(SimulatedFeed::new(&config.feed, Arc::clone(&clock))),
        };

        let pipeline = Arc::new(TickPipeline::new(
            &config.feed,
            AlertEvaluator::new(config.alerts.threshold),
            Arc::clone(&store),
            Arc::clone(&stopped),
        ));

        let weather = Arc::new(WeatherAlertSimulator::new(
            &config.weather_alerts,
            store,
            Arc::clone(&stopped),
        ));

        Self {
            feed,
            pipeline,
            weather,
            shutdown_tx,
            stopped,
            started: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Start the feed, the tick pipeline, and the weather simulator.
    ///
    /// Idempotent: only the first call spawns anything; every call
    /// returns a handle to the same running instance.
    #[instrument(skip(self))]
    pub fn start(&self) -> FeedHandle {
        let handle = self.handle();

        if self.started.swap(true, Ordering::SeqCst) {
            warn!("Feed already started, returning existing handle");
            return handle;
        }

        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());

        // The pipeline subscribes before the feed task runs, so no
        // tick can be broadcast without a consumer.
        let tick_rx = self.feed.subscribe();

        {
            let pipeline = Arc::clone(&self.pipeline);
            let shutdown_rx = self.shutdown_tx.subscribe();
            tasks.push(tokio::spawn(async move {
                pipeline.run(tick_rx, shutdown_rx).await;
            }));
        }

        {
            let feed = Arc::clone(&self.feed);
            let shutdown_rx = self.shutdown_tx.subscribe();
            tasks.push(tokio::spawn(async move {
                match feed.run(shutdown_rx).await {
                    Ok(()) => info!("Live feed exited normally"),
                    Err(e) => error!(error = %e, "Live feed failed"),
                }
            }));
        }

        // Always active, both feed modes.
        {
            let weather = Arc::clone(&self.weather);
            let shutdown_rx = self.shutdown_tx.subscribe();
            tasks.push(tokio::spawn(async move {
                weather.run(shutdown_rx).await;
            }));
        }

        info!(tasks = tasks.len(), "Feed tasks spawned");
        handle
    }

    /// Handle for the supervised feed (valid before `start()` too).
    pub fn handle(&self) -> FeedHandle {
        FeedHandle {
            shutdown_tx: self.shutdown_tx.clone(),
            stopped: Arc::clone(&self.stopped),
        }
    }

    /// Take ownership of the spawned task handles, for joining on
    /// shutdown.
    pub fn take_tasks(&self) -> Vec<JoinHandle<()>> {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::take(&mut *tasks)
    }
}
