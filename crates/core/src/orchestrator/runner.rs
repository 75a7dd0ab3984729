//! Display orchestrator implementation.
//!
//! Runs the refresh scheduler and a render loop side by side:
//! - Scheduler: one task per feed, each on its own timer
//! - Render loop: fixed-interval ticks that never wait on a fetch

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::cache::FeedCache;
use crate::config::Config;
use crate::display::{DisplaySink, DisplaySnapshot, LatestSnapshotSink};
use crate::feed::FeedSource;
use crate::metrics;
use crate::rotator::RotationConfig;
use crate::scheduler::{RefreshScheduler, RetryPolicy};
use crate::ticker::TickerConfig;

use super::config::DisplayConfig;
use super::context::DisplayContext;
use super::types::{OrchestratorError, OrchestratorStatus};

/// Top-level runtime: cache, scheduler, rotator, ticker and sink.
pub struct DisplayOrchestrator {
    config: DisplayConfig,
    rotation: RotationConfig,
    ticker: TickerConfig,
    cache: Arc<FeedCache>,
    scheduler: RefreshScheduler,
    sink: Arc<dyn DisplaySink>,
    latest: Arc<LatestSnapshotSink>,

    // Runtime state
    running: Arc<AtomicBool>,
    frames_rendered: Arc<AtomicU64>,
    render_handle: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl DisplayOrchestrator {
    /// Create an orchestrator around an already populated scheduler.
    pub fn new(
        config: DisplayConfig,
        rotation: RotationConfig,
        ticker: TickerConfig,
        cache: Arc<FeedCache>,
        scheduler: RefreshScheduler,
        sink: Arc<dyn DisplaySink>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            rotation,
            ticker,
            cache,
            scheduler,
            sink,
            latest: Arc::new(LatestSnapshotSink::new()),
            running: Arc::new(AtomicBool::new(false)),
            frames_rendered: Arc::new(AtomicU64::new(0)),
            render_handle: Mutex::new(None),
            shutdown_tx,
        }
    }

    /// Build the cache and scheduler from configuration and register every
    /// source with its category's interval, timeout and the shared retry
    /// policy.
    pub fn from_config(
        config: &Config,
        sources: Vec<Arc<dyn FeedSource>>,
        sink: Arc<dyn DisplaySink>,
    ) -> Result<Self, OrchestratorError> {
        let cache = Arc::new(FeedCache::from_config(&config.feeds));
        let scheduler = build_scheduler(Arc::clone(&cache), &config.feeds, &config.retry, sources)?;

        Ok(Self::new(
            config.display.clone(),
            config.rotation.clone(),
            config.ticker.clone(),
            cache,
            scheduler,
            sink,
        ))
    }

    pub fn cache(&self) -> &Arc<FeedCache> {
        &self.cache
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// The last frame handed to the sink.
    pub fn latest_snapshot(&self) -> Option<DisplaySnapshot> {
        self.latest.latest()
    }

    /// Start fetching and rendering.
    pub async fn start(&self) -> Result<(), OrchestratorError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(OrchestratorError::AlreadyRunning);
        }

        info!(
            render_interval_ms = self.config.render_interval().as_millis() as u64,
            sink = self.sink.name(),
            "Starting display orchestrator"
        );

        if let Err(e) = self.scheduler.start().await {
            self.running.store(false, Ordering::SeqCst);
            return Err(e.into());
        }

        let handle = self.spawn_render_loop();
        *self.render_handle.lock().await = Some(handle);

        info!("Display orchestrator started");
        Ok(())
    }

    /// Stop rendering and fetching, waiting at most the configured grace
    /// period for each before aborting.
    pub async fn stop(&self) -> Result<(), OrchestratorError> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(OrchestratorError::NotRunning);
        }

        info!("Stopping display orchestrator");

        // Signal shutdown to the render loop
        let _ = self.shutdown_tx.send(());

        let grace = self.config.shutdown_grace();
        self.scheduler.stop(grace).await?;

        if let Some(handle) = self.render_handle.lock().await.take() {
            let abort = handle.abort_handle();
            if tokio::time::timeout(grace, handle).await.is_err() {
                warn!("Render loop did not stop within grace period, aborting");
                abort.abort();
            }
        }

        info!("Display orchestrator stopped");
        Ok(())
    }

    /// Get current orchestrator status.
    pub async fn status(&self) -> OrchestratorStatus {
        let latest = self.latest.latest();

        OrchestratorStatus {
            running: self.is_running(),
            active_panel: latest.as_ref().map(|s| s.active_panel),
            ticker_generation: latest.as_ref().map(|s| s.ticker_generation).unwrap_or(0),
            frames_rendered: self.frames_rendered.load(Ordering::Relaxed),
            scheduler: self.scheduler.status().await,
            cache: self.cache.overview(Utc::now()),
        }
    }

    /// Spawn the render loop task.
    fn spawn_render_loop(&self) -> JoinHandle<()> {
        let mut context = DisplayContext::new(
            Arc::clone(&self.cache),
            self.rotation.clone(),
            self.ticker.clone(),
            Instant::now(),
        );
        let sink = Arc::clone(&self.sink);
        let latest = Arc::clone(&self.latest);
        let frames_rendered = Arc::clone(&self.frames_rendered);
        let render_interval = self.config.render_interval();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            info!("Render loop started");

            let mut interval = tokio::time::interval(render_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut sink_failing = false;

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Render loop received shutdown signal");
                        break;
                    }
                    _ = interval.tick() => {
                        let snapshot = context.render_tick(Instant::now(), Utc::now());
                        // The latest-frame sink cannot fail.
                        let _ = latest.present(&snapshot);
                        frames_rendered.fetch_add(1, Ordering::Relaxed);

                        match sink.present(&snapshot) {
                            Ok(()) => {
                                metrics::RENDER_TICKS.with_label_values(&["ok"]).inc();
                                if sink_failing {
                                    info!(sink = sink.name(), "Display sink recovered");
                                    sink_failing = false;
                                }
                            }
                            Err(e) => {
                                metrics::RENDER_TICKS.with_label_values(&["sink_error"]).inc();
                                if sink_failing {
                                    debug!(sink = sink.name(), error = %e, "Display sink still failing");
                                } else {
                                    warn!(sink = sink.name(), error = %e, "Display sink failed, continuing");
                                    sink_failing = true;
                                }
                            }
                        }
                    }
                }
            }

            info!("Render loop stopped");
        })
    }
}

fn build_scheduler(
    cache: Arc<FeedCache>,
    feeds: &crate::config::FeedsConfig,
    retry: &RetryPolicy,
    sources: Vec<Arc<dyn FeedSource>>,
) -> Result<RefreshScheduler, OrchestratorError> {
    let mut scheduler = RefreshScheduler::new(cache);
    for source in sources {
        let settings = feeds.settings(source.category());
        scheduler.register_with_timeout(
            source,
            settings.refresh_interval(),
            settings.fetch_timeout(),
            retry.clone(),
        )?;
    }
    Ok(scheduler)
}
