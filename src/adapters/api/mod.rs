//! REST Provider Adapters
//!
//! reqwest-backed implementations of the provider ports. Each maps a
//! third-party API response into the normalized record shapes and
//! degrades to canned mock records on failure - a fetch never
//! surfaces an error past the port boundary.

pub mod crypto;
pub mod news;
pub mod weather;

pub use crypto::CoinGeckoClient;
pub use news::NewsDataClient;
pub use weather::OpenWeatherClient;
