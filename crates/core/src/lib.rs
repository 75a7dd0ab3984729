pub mod cache;
pub mod config;
pub mod display;
pub mod feed;
pub mod metrics;
pub mod orchestrator;
pub mod rotator;
pub mod scheduler;
pub mod sources;
pub mod testing;
pub mod ticker;

pub use cache::{CacheError, CategoryOverview, FeedCache, FeedSnapshot, SnapshotView};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use display::{
    DisplayError, DisplaySink, DisplaySnapshot, LatestSnapshotSink, PanelStaleness,
    TracingDisplaySink,
};
pub use feed::{FeedCategory, FeedPayload, FeedSource, FetchFailure, Staleness};
pub use orchestrator::{
    DisplayConfig, DisplayContext, DisplayOrchestrator, OrchestratorError, OrchestratorStatus,
};
pub use rotator::{MissingPanelPolicy, Panel, PanelRotator, RotationConfig};
pub use scheduler::{FeedStatus, RefreshScheduler, RetryPolicy, SchedulerError, SchedulerStatus};
pub use sources::{build_sources, NwsClient, NwsError, RssHeadlineSource};
pub use ticker::{TickerCompositor, TickerConfig};
