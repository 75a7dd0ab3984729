//! Mock feed source for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::feed::{FeedCategory, FeedPayload, FeedSource, FetchFailure};

type Outcome = Result<FeedPayload, FetchFailure>;

/// Mock implementation of the FeedSource trait.
///
/// Provides controllable behavior for testing:
/// - Scripted outcomes consumed one per fetch, in order
/// - A fallback outcome once the script runs out
/// - Simulated fetch latency
/// - Call counting
///
/// # Example
///
/// ```rust,ignore
/// use weatharr_core::testing::{fixtures, MockFeedSource};
///
/// let source = MockFeedSource::new(FeedCategory::Radar)
///     .with_outcomes(vec![Err(FetchFailure::network("refused"))])
///     .with_fallback(Ok(fixtures::radar()));
///
/// // First fetch fails, every later one succeeds
/// ```
#[derive(Debug)]
pub struct MockFeedSource {
    name: String,
    category: FeedCategory,
    script: Mutex<VecDeque<Outcome>>,
    fallback: Mutex<Option<Outcome>>,
    delay: Mutex<Duration>,
    calls: AtomicUsize,
}

impl MockFeedSource {
    /// A source with no script and no fallback: every fetch fails with a
    /// network error until configured otherwise.
    pub fn new(category: FeedCategory) -> Self {
        Self {
            name: format!("mock-{}", category),
            category,
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(None),
            delay: Mutex::new(Duration::ZERO),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_outcomes(self, outcomes: Vec<Outcome>) -> Self {
        self.lock_script().extend(outcomes);
        self
    }

    pub fn with_fallback(self, outcome: Outcome) -> Self {
        self.set_fallback(outcome);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.set_delay(delay);
        self
    }

    /// Queue an outcome after any already scripted.
    pub fn push_outcome(&self, outcome: Outcome) {
        self.lock_script().push_back(outcome);
    }

    pub fn set_fallback(&self, outcome: Outcome) {
        *self.fallback.lock().unwrap_or_else(|e| e.into_inner()) = Some(outcome);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap_or_else(|e| e.into_inner()) = delay;
    }

    /// Number of fetches started so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Wait until at least `n` fetches have started. Returns `false` on
    /// timeout.
    pub async fn wait_for_calls(&self, n: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.call_count() < n {
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        true
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<Outcome>> {
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_outcome(&self) -> Outcome {
        if let Some(outcome) = self.lock_script().pop_front() {
            return outcome;
        }
        self.fallback
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .unwrap_or_else(|| Err(FetchFailure::network("mock source has no outcome configured")))
    }
}

#[async_trait]
impl FeedSource for MockFeedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> FeedCategory {
        self.category
    }

    async fn fetch(&self) -> Result<FeedPayload, FetchFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap_or_else(|e| e.into_inner());
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.next_outcome()
    }
}
