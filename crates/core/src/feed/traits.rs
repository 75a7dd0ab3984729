//! Trait definitions for feed sources.

use async_trait::async_trait;

use super::error::FetchFailure;
use super::types::{FeedCategory, FeedPayload};

/// A fetcher for one upstream data category.
///
/// Implementations perform a single attempt per call; retrying and backoff
/// are the scheduler's job.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Returns the name of this source implementation.
    fn name(&self) -> &str;

    /// The category every successful fetch belongs to.
    fn category(&self) -> FeedCategory;

    /// Fetch the latest payload.
    async fn fetch(&self) -> Result<FeedPayload, FetchFailure>;
}
