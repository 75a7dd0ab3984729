//! Display orchestrator.
//!
//! Owns the feed cache, the refresh scheduler and the render loop:
//! - **Scheduler**: one task per feed, writing into the cache
//! - **Render loop**: one task ticking the panel rotator and the ticker, then
//!   handing a [`DisplaySnapshot`](crate::display::DisplaySnapshot) to the sink

mod config;
mod context;
mod runner;
mod types;

pub use config::DisplayConfig;
pub use context::DisplayContext;
pub use runner::DisplayOrchestrator;
pub use types::{OrchestratorError, OrchestratorStatus};
