use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{display, feeds, handlers, middleware::metrics_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Display
        .route("/display", get(display::get_display))
        .route("/display/status", get(display::get_status))
        // Feeds
        .route("/feeds", get(feeds::list_feeds))
        .route("/feeds/radar/image", get(feeds::get_radar_image))
        .route("/feeds/{category}", get(feeds::get_feed));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
