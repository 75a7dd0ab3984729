use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use weatharr_core::{
    build_sources, config::config_path, load_config, validate_config, DisplayOrchestrator,
    DisplaySink, TracingDisplaySink,
};
use weatharr_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Config path: first argument, then WEATHARR_CONFIG, then ./config.toml
    let explicit = std::env::args_os().nth(1).map(PathBuf::from);
    let config_path = config_path(explicit.as_deref());

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "Station: {} ({:.4}, {:.4})",
        config.station.name, config.station.latitude, config.station.longitude
    );
    info!("Headline feeds configured: {}", config.headlines.rss_urls.len());

    // Create feed sources
    let sources = build_sources(&config).context("Failed to create feed sources")?;
    info!("Created {} feed sources", sources.len());

    // Create and start the display orchestrator
    let sink: Arc<dyn DisplaySink> = Arc::new(TracingDisplaySink);
    let orchestrator = Arc::new(
        DisplayOrchestrator::from_config(&config, sources, sink)
            .context("Failed to create display orchestrator")?,
    );
    orchestrator
        .start()
        .await
        .context("Failed to start display orchestrator")?;

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), Arc::clone(&orchestrator)));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    orchestrator
        .stop()
        .await
        .context("Failed to stop display orchestrator")?;
    info!("Display orchestrator stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
