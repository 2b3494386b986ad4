//! Live Feed Adapters - Real-time Price Streaming
//!
//! Provides the two interchangeable live-feed strategies plus their
//! lifecycle management:
//! - CoinCap: upstream WebSocket push feed with backoff reconnect and
//!   a permanent REST polling fallback
//! - Simulated: timer-driven local random walk
//! - Weather simulator: canned WeatherAlert producer
//! - Supervisor: idempotent start/stop with shared stop-flag discard

pub mod backoff;
pub mod coincap;
pub mod simulated;
pub mod supervisor;
pub mod weather_sim;

pub use coincap::CoinCapFeed;
pub use simulated::SimulatedFeed;
pub use supervisor::{FeedHandle, FeedSupervisor};
pub use weather_sim::WeatherAlertSimulator;
