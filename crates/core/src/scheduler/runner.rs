//! Refresh scheduler implementation.
//!
//! Every feed runs in its own task:
//! - fetch immediately, then sleep for the refresh interval on success
//! - on failure, keep the cached snapshot and sleep for the backoff delay
//! - shutdown interrupts both the sleep and an in-flight fetch

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheError, FeedCache, FeedSnapshot};
use crate::feed::{FeedCategory, FeedSource, FetchFailure};
use crate::metrics;

use super::config::RetryPolicy;
use super::types::{FeedStatus, SchedulerError, SchedulerStatus};

/// Fetch deadline used by [`RefreshScheduler::register`].
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// A source and its schedule.
#[derive(Clone)]
struct FeedRegistration {
    category: FeedCategory,
    source: Arc<dyn FeedSource>,
    interval: Duration,
    timeout: Duration,
    retry: RetryPolicy,
}

type StatusMap = Arc<RwLock<HashMap<FeedCategory, FeedStatus>>>;

/// Keeps every registered feed's cache slot refreshed.
pub struct RefreshScheduler {
    cache: Arc<FeedCache>,
    feeds: Vec<FeedRegistration>,

    // Runtime state
    running: Arc<AtomicBool>,
    statuses: StatusMap,
    handles: Mutex<Vec<JoinHandle<()>>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl RefreshScheduler {
    pub fn new(cache: Arc<FeedCache>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            cache,
            feeds: Vec::new(),
            running: Arc::new(AtomicBool::new(false)),
            statuses: Arc::new(RwLock::new(HashMap::new())),
            handles: Mutex::new(Vec::new()),
            shutdown_tx,
        }
    }

    /// Register a source with the default fetch timeout.
    pub fn register(
        &mut self,
        source: Arc<dyn FeedSource>,
        interval: Duration,
        retry: RetryPolicy,
    ) -> Result<(), SchedulerError> {
        self.register_with_timeout(source, interval, DEFAULT_FETCH_TIMEOUT, retry)
    }

    /// Register a source. At most one source per category.
    pub fn register_with_timeout(
        &mut self,
        source: Arc<dyn FeedSource>,
        interval: Duration,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<(), SchedulerError> {
        let category = source.category();

        if self.running.load(Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyRunning);
        }
        if self.feeds.iter().any(|f| f.category == category) {
            return Err(SchedulerError::DuplicateCategory(category));
        }
        if self.cache.thresholds(category).is_none() {
            return Err(SchedulerError::UntrackedCategory(category));
        }
        if interval.is_zero() || timeout.is_zero() {
            return Err(SchedulerError::InvalidSchedule {
                category,
                reason: "refresh interval and timeout must be greater than zero".to_string(),
            });
        }

        debug!(
            category = %category,
            source = source.name(),
            interval_secs = interval.as_secs(),
            "Registered feed source"
        );

        // No loop is running, so the lock is uncontended.
        if let Ok(mut statuses) = self.statuses.try_write() {
            statuses.insert(
                category,
                FeedStatus::new(category, source.name(), interval.as_secs()),
            );
        }

        self.feeds.push(FeedRegistration {
            category,
            source,
            interval,
            timeout,
            retry,
        });
        Ok(())
    }

    /// Categories with a registered source, in registration order.
    pub fn categories(&self) -> Vec<FeedCategory> {
        self.feeds.iter().map(|f| f.category).collect()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Spawn one refresh loop per registered feed.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!(feeds = self.feeds.len(), "Starting refresh scheduler");

        let mut handles = self.handles.lock().await;
        for feed in &self.feeds {
            handles.push(self.spawn_feed_loop(feed.clone()));
        }
        metrics::FEEDS_RUNNING.set(self.feeds.len() as i64);

        Ok(())
    }

    /// Stop every loop, waiting up to `grace` before aborting stragglers.
    pub async fn stop(&self, grace: Duration) -> Result<(), SchedulerError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping refresh scheduler");

        // Signal shutdown to all loops
        let _ = self.shutdown_tx.send(());

        let handles: Vec<JoinHandle<()>> = self.handles.lock().await.drain(..).collect();
        let aborts: Vec<_> = handles.iter().map(|h| h.abort_handle()).collect();

        if tokio::time::timeout(grace, join_all(handles)).await.is_err() {
            warn!(
                grace_ms = grace.as_millis() as u64,
                "Feed loops did not stop within grace period, aborting"
            );
            for abort in aborts {
                abort.abort();
            }
        }

        metrics::FEEDS_RUNNING.set(0);
        info!("Refresh scheduler stopped");
        Ok(())
    }

    /// Current refresh bookkeeping for every registered feed.
    pub async fn status(&self) -> SchedulerStatus {
        let statuses = self.statuses.read().await;
        let mut feeds: Vec<FeedStatus> = statuses.values().cloned().collect();
        feeds.sort_by_key(|s| s.category);

        SchedulerStatus {
            running: self.is_running(),
            feeds,
        }
    }

    fn spawn_feed_loop(&self, feed: FeedRegistration) -> JoinHandle<()> {
        let cache = Arc::clone(&self.cache);
        let statuses = Arc::clone(&self.statuses);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let category = feed.category;
            info!(category = %category, source = feed.source.name(), "Feed loop started");

            let mut consecutive_failures: u32 = 0;
            loop {
                let attempt = tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    result = Self::fetch_once(&feed, &cache) => result,
                };

                let delay = match attempt {
                    Ok(snapshot) => {
                        if consecutive_failures > 0 {
                            info!(
                                category = %category,
                                after_failures = consecutive_failures,
                                "Feed recovered"
                            );
                        }
                        consecutive_failures = 0;
                        Self::record_success(&statuses, &snapshot, feed.interval).await;
                        feed.interval
                    }
                    Err(failure) => {
                        consecutive_failures = consecutive_failures.saturating_add(1);
                        let delay = feed.retry.delay_after_failure(consecutive_failures);
                        warn!(
                            category = %category,
                            error = %failure,
                            consecutive_failures,
                            retry_in_ms = delay.as_millis() as u64,
                            "Feed fetch failed, keeping cached snapshot"
                        );
                        Self::record_failure(&statuses, category, &failure, consecutive_failures, delay)
                            .await;
                        delay
                    }
                };

                metrics::CONSECUTIVE_FAILURES
                    .with_label_values(&[category.as_str()])
                    .set(consecutive_failures as i64);

                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            info!(category = %category, "Feed loop stopped");
        })
    }

    /// One bounded fetch; a successful payload is written to the cache.
    async fn fetch_once(
        feed: &FeedRegistration,
        cache: &FeedCache,
    ) -> Result<Arc<FeedSnapshot>, FetchFailure> {
        let started = Instant::now();
        let result = match tokio::time::timeout(feed.timeout, feed.source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(FetchFailure::Timeout {
                timeout_secs: feed.timeout.as_secs(),
            }),
        };

        let label = feed.category.as_str();
        metrics::FETCH_DURATION
            .with_label_values(&[label])
            .observe(started.elapsed().as_secs_f64());

        let stored = result.and_then(|payload| {
            cache
                .put(feed.category, payload, Utc::now())
                .map_err(|e| match e {
                    CacheError::CategoryMismatch { expected, actual } => {
                        FetchFailure::CategoryMismatch { expected, actual }
                    }
                    other => FetchFailure::parse(other.to_string()),
                })
        });

        let result_label = match &stored {
            Ok(_) => "success",
            Err(failure) => failure.kind(),
        };
        metrics::FETCH_ATTEMPTS
            .with_label_values(&[label, result_label])
            .inc();

        stored
    }

    async fn record_success(statuses: &StatusMap, snapshot: &FeedSnapshot, interval: Duration) {
        let mut statuses = statuses.write().await;
        if let Some(status) = statuses.get_mut(&snapshot.category) {
            let now = Utc::now();
            status.consecutive_failures = 0;
            status.total_successes += 1;
            status.last_error = None;
            status.last_attempt_at = Some(now);
            status.last_success_at = Some(snapshot.fetched_at);
            status.next_attempt_at = chrono::Duration::from_std(interval)
                .ok()
                .map(|d| now + d);
        }
    }

    async fn record_failure(
        statuses: &StatusMap,
        category: FeedCategory,
        failure: &FetchFailure,
        consecutive_failures: u32,
        delay: Duration,
    ) {
        let mut statuses = statuses.write().await;
        if let Some(status) = statuses.get_mut(&category) {
            let now = Utc::now();
            status.consecutive_failures = consecutive_failures;
            status.total_failures += 1;
            status.last_error = Some(failure.to_string());
            status.last_attempt_at = Some(now);
            status.next_attempt_at = chrono::Duration::from_std(delay).ok().map(|d| now + d);
        }
    }
}
