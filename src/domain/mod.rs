//! Domain layer - Core business logic and models.
//!
//! Pure dashboard logic: record shapes, the price-alert rule, and the
//! notification ledger. No transport or runtime dependencies here
//! (hexagonal architecture inner ring); everything is testable in
//! isolation.

pub mod alert;
pub mod model;
pub mod notification;

// Re-export core types for convenience
pub use alert::AlertEvaluator;
pub use model::{AssetPrice, CityWeather, NewsItem};
pub use notification::{Notification, NotificationKind, NotificationLedger};
