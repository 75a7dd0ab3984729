//! Types for the refresh scheduler.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::feed::FeedCategory;

/// Errors returned by scheduler lifecycle calls.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    /// A second source was registered for the same category.
    #[error("a source is already registered for {0}")]
    DuplicateCategory(FeedCategory),

    /// The cache has no slot for this category.
    #[error("category {0} is not tracked by the cache")]
    UntrackedCategory(FeedCategory),

    /// Refresh interval or timeout was zero.
    #[error("invalid schedule for {category}: {reason}")]
    InvalidSchedule {
        category: FeedCategory,
        reason: String,
    },

    #[error("scheduler already running")]
    AlreadyRunning,

    #[error("scheduler not running")]
    NotRunning,
}

/// Refresh bookkeeping for one feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedStatus {
    pub category: FeedCategory,
    /// Name of the source serving this feed.
    pub source: String,
    pub interval_secs: u64,
    pub consecutive_failures: u32,
    pub total_successes: u64,
    pub total_failures: u64,
    pub last_error: Option<String>,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_success_at: Option<DateTime<Utc>>,
    pub next_attempt_at: Option<DateTime<Utc>>,
}

impl FeedStatus {
    pub(crate) fn new(category: FeedCategory, source: &str, interval_secs: u64) -> Self {
        Self {
            category,
            source: source.to_string(),
            interval_secs,
            consecutive_failures: 0,
            total_successes: 0,
            total_failures: 0,
            last_error: None,
            last_attempt_at: None,
            last_success_at: None,
            next_attempt_at: None,
        }
    }
}

/// Snapshot of the scheduler for status endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    /// One entry per registered feed, in display order.
    pub feeds: Vec<FeedStatus>,
}
