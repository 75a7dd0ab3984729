//! Types for the display orchestrator.

use serde::Serialize;
use thiserror::Error;

use crate::cache::CategoryOverview;
use crate::rotator::Panel;
use crate::scheduler::{SchedulerError, SchedulerStatus};

/// Errors that can occur while starting or stopping the display.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Scheduler error.
    #[error("scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("orchestrator already running")]
    AlreadyRunning,

    #[error("orchestrator not running")]
    NotRunning,
}

/// Current status of the orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatus {
    /// Whether the render loop is running.
    pub running: bool,
    /// Panel on screen in the latest frame.
    pub active_panel: Option<Panel>,
    /// Ticker generation in the latest frame.
    pub ticker_generation: u64,
    /// Frames rendered since start.
    pub frames_rendered: u64,
    pub scheduler: SchedulerStatus,
    pub cache: Vec<CategoryOverview>,
}
