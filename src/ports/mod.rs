//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) that the domain/usecases layer
//! requires from the outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `LiveFeed`: real-time price tick streaming
//! - `Clock`: injectable time source
//! - Providers: normalized REST fetchers (crypto, weather, news)

pub mod clock;
pub mod price_feed;
pub mod providers;
