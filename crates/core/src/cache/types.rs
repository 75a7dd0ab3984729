//! Snapshot and freshness types for the feed cache.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::feed::{FeedCategory, FeedPayload, Staleness};

/// Age boundaries for one category.
///
/// Younger than `aging_after` is fresh, younger than `stale_after` is aging,
/// anything older is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StalenessThresholds {
    pub aging_after: Duration,
    pub stale_after: Duration,
}

impl StalenessThresholds {
    pub fn new(aging_after: Duration, stale_after: Duration) -> Self {
        Self {
            aging_after,
            stale_after,
        }
    }

    /// Classify a snapshot age. A negative age (clock skew) counts as fresh.
    pub fn classify(&self, age: chrono::Duration) -> Staleness {
        let Ok(age) = age.to_std() else {
            return Staleness::Fresh;
        };
        if age < self.aging_after {
            Staleness::Fresh
        } else if age < self.stale_after {
            Staleness::Aging
        } else {
            Staleness::Stale
        }
    }
}

/// The last successfully fetched payload for a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedSnapshot {
    pub category: FeedCategory,
    pub payload: FeedPayload,
    /// When the payload was fetched. Strictly increasing per category.
    pub fetched_at: DateTime<Utc>,
    /// Number of successful writes to this category, starting at 1.
    pub revision: u64,
}

impl FeedSnapshot {
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.fetched_at
    }
}

/// What a reader sees for one category at a given instant.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotView {
    Present {
        snapshot: Arc<FeedSnapshot>,
        staleness: Staleness,
    },
    /// Never fetched successfully.
    Absent,
}

impl SnapshotView {
    pub fn is_present(&self) -> bool {
        matches!(self, SnapshotView::Present { .. })
    }

    pub fn snapshot(&self) -> Option<&Arc<FeedSnapshot>> {
        match self {
            SnapshotView::Present { snapshot, .. } => Some(snapshot),
            SnapshotView::Absent => None,
        }
    }

    pub fn staleness(&self) -> Option<Staleness> {
        match self {
            SnapshotView::Present { staleness, .. } => Some(*staleness),
            SnapshotView::Absent => None,
        }
    }
}

/// Per-category summary for status endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryOverview {
    pub category: FeedCategory,
    /// `None` when the category was never fetched.
    pub staleness: Option<Staleness>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub age_secs: Option<i64>,
    pub revision: u64,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("payload for {actual} cannot be stored under {expected}")]
    CategoryMismatch {
        expected: FeedCategory,
        actual: FeedCategory,
    },

    #[error("category {0} is not tracked by this cache")]
    UnknownCategory(FeedCategory),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> StalenessThresholds {
        StalenessThresholds::new(Duration::from_secs(300), Duration::from_secs(600))
    }

    #[test]
    fn test_classify_boundaries() {
        let t = thresholds();
        assert_eq!(t.classify(chrono::Duration::seconds(0)), Staleness::Fresh);
        assert_eq!(t.classify(chrono::Duration::seconds(299)), Staleness::Fresh);
        assert_eq!(t.classify(chrono::Duration::seconds(300)), Staleness::Aging);
        assert_eq!(t.classify(chrono::Duration::seconds(599)), Staleness::Aging);
        assert_eq!(t.classify(chrono::Duration::seconds(600)), Staleness::Stale);
        assert_eq!(t.classify(chrono::Duration::days(3)), Staleness::Stale);
    }

    #[test]
    fn test_negative_age_is_fresh() {
        let t = thresholds();
        assert_eq!(t.classify(chrono::Duration::seconds(-30)), Staleness::Fresh);
    }

    #[test]
    fn test_equal_thresholds_skip_aging() {
        let t = StalenessThresholds::new(Duration::from_secs(60), Duration::from_secs(60));
        assert_eq!(t.classify(chrono::Duration::seconds(59)), Staleness::Fresh);
        assert_eq!(t.classify(chrono::Duration::seconds(60)), Staleness::Stale);
    }
}
