//! Refresh scheduler: one independent fetch loop per feed.
//!
//! Each registered source is fetched immediately on start, then every
//! refresh interval. Failures back off according to the feed's
//! [`RetryPolicy`] and never affect other feeds or the cached snapshot.

mod config;
mod runner;
mod types;

pub use config::RetryPolicy;
pub use runner::{RefreshScheduler, DEFAULT_FETCH_TIMEOUT};
pub use types::{FeedStatus, SchedulerError, SchedulerStatus};
