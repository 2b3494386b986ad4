//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Transport-facing implementations of the ports:
//! - `feeds`: live price strategies, weather simulator, supervisor
//! - `api`: REST snapshot providers (CoinGecko, OpenWeatherMap,
//!   NewsData) with mock fallback

pub mod api;
pub mod feeds;
