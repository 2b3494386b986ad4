//! Use Cases Layer - Application Orchestration
//!
//! Wires ports and domain logic together:
//! - `live_updates`: tick ingestion → store mutation → alerting
//! - `refresh`: periodic REST snapshot refresh

pub mod live_updates;
pub mod refresh;

pub use live_updates::TickPipeline;
pub use refresh::RefreshLoop;
