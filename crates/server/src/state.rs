use std::sync::Arc;
use weatharr_core::{Config, DisplayOrchestrator, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<DisplayOrchestrator>,
}

impl AppState {
    pub fn new(config: Config, orchestrator: Arc<DisplayOrchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn orchestrator(&self) -> &DisplayOrchestrator {
        self.orchestrator.as_ref()
    }
}
