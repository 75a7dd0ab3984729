//! Latest-snapshot cache with per-category staleness.

mod store;
mod types;

pub use store::FeedCache;
pub use types::{
    CacheError, CategoryOverview, FeedSnapshot, SnapshotView, StalenessThresholds,
};
