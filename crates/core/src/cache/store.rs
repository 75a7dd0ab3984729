//! In-memory, per-category feed cache.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use super::types::{
    CacheError, CategoryOverview, FeedSnapshot, SnapshotView, StalenessThresholds,
};
use crate::config::FeedsConfig;
use crate::feed::{FeedCategory, FeedPayload, Staleness};

type SnapshotCell = Option<Arc<FeedSnapshot>>;

struct Slot {
    tx: watch::Sender<SnapshotCell>,
    thresholds: StalenessThresholds,
}

/// Holds the latest snapshot per category.
///
/// Each category is a `watch` channel: writers replace the whole snapshot in
/// one step, readers never observe a partial update, and the ticker can wait
/// for changes to the alert and headline categories. Failed fetches never
/// touch the cache, so the previous snapshot simply ages.
pub struct FeedCache {
    slots: HashMap<FeedCategory, Slot>,
}

impl FeedCache {
    /// Create a cache for the given categories. Categories not listed are
    /// unknown to this cache: reads return nothing and writes are rejected.
    pub fn new(thresholds: HashMap<FeedCategory, StalenessThresholds>) -> Self {
        let slots = thresholds
            .into_iter()
            .map(|(category, thresholds)| {
                let (tx, _rx) = watch::channel(None);
                (category, Slot { tx, thresholds })
            })
            .collect();
        Self { slots }
    }

    /// Create a cache for every category using configured thresholds.
    pub fn from_config(feeds: &FeedsConfig) -> Self {
        Self::new(
            FeedCategory::ALL
                .into_iter()
                .map(|category| (category, feeds.settings(category).thresholds()))
                .collect(),
        )
    }

    /// Latest snapshot for a category, if one was ever stored.
    pub fn get(&self, category: FeedCategory) -> Option<Arc<FeedSnapshot>> {
        self.slots.get(&category)?.tx.borrow().clone()
    }

    /// Replace the snapshot for `category`.
    ///
    /// `fetched_at` is forced to be strictly later than the previous
    /// snapshot's so that readers can order snapshots even when the wall
    /// clock steps backwards.
    pub fn put(
        &self,
        category: FeedCategory,
        payload: FeedPayload,
        fetched_at: DateTime<Utc>,
    ) -> Result<Arc<FeedSnapshot>, CacheError> {
        if payload.category() != category {
            return Err(CacheError::CategoryMismatch {
                expected: category,
                actual: payload.category(),
            });
        }
        let slot = self
            .slots
            .get(&category)
            .ok_or(CacheError::UnknownCategory(category))?;

        let mut stored = None;
        slot.tx.send_modify(|current| {
            let (fetched_at, revision) = match current.as_deref() {
                Some(prev) if fetched_at <= prev.fetched_at => (
                    prev.fetched_at + chrono::Duration::microseconds(1),
                    prev.revision + 1,
                ),
                Some(prev) => (fetched_at, prev.revision + 1),
                None => (fetched_at, 1),
            };
            let snapshot = Arc::new(FeedSnapshot {
                category,
                payload,
                fetched_at,
                revision,
            });
            *current = Some(Arc::clone(&snapshot));
            stored = Some(snapshot);
        });

        let snapshot = stored.ok_or(CacheError::UnknownCategory(category))?;
        debug!(
            category = %category,
            revision = snapshot.revision,
            fetched_at = %snapshot.fetched_at,
            "Cache updated"
        );
        Ok(snapshot)
    }

    /// Classify a snapshot against its category's thresholds.
    pub fn staleness_of(&self, snapshot: &FeedSnapshot, now: DateTime<Utc>) -> Staleness {
        match self.slots.get(&snapshot.category) {
            Some(slot) => slot.thresholds.classify(snapshot.age(now)),
            None => Staleness::Stale,
        }
    }

    /// The snapshot for `category` together with its staleness at `now`.
    pub fn view(&self, category: FeedCategory, now: DateTime<Utc>) -> SnapshotView {
        match self.get(category) {
            Some(snapshot) => {
                let staleness = self.staleness_of(&snapshot, now);
                SnapshotView::Present {
                    snapshot,
                    staleness,
                }
            }
            None => SnapshotView::Absent,
        }
    }

    /// Change notifications for one category. The receiver starts with the
    /// current value marked as seen.
    pub fn subscribe(&self, category: FeedCategory) -> Option<watch::Receiver<SnapshotCell>> {
        self.slots.get(&category).map(|slot| slot.tx.subscribe())
    }

    pub fn thresholds(&self, category: FeedCategory) -> Option<StalenessThresholds> {
        self.slots.get(&category).map(|slot| slot.thresholds)
    }

    /// Summary of every known category, in display order.
    pub fn overview(&self, now: DateTime<Utc>) -> Vec<CategoryOverview> {
        FeedCategory::ALL
            .into_iter()
            .filter(|category| self.slots.contains_key(category))
            .map(|category| match self.view(category, now) {
                SnapshotView::Present {
                    snapshot,
                    staleness,
                } => CategoryOverview {
                    category,
                    staleness: Some(staleness),
                    fetched_at: Some(snapshot.fetched_at),
                    age_secs: Some(snapshot.age(now).num_seconds()),
                    revision: snapshot.revision,
                },
                SnapshotView::Absent => CategoryOverview {
                    category,
                    staleness: None,
                    fetched_at: None,
                    age_secs: None,
                    revision: 0,
                },
            })
            .collect()
    }
}
