//! Feed API handlers.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use weatharr_core::{
    FeedCategory, FeedPayload, FeedSnapshot, FeedStatus, SnapshotView, Staleness,
};

use super::handlers::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

/// One feed's refresh state merged with its cache state.
#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub category: FeedCategory,
    /// `None` when the category was never fetched.
    pub staleness: Option<Staleness>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub age_secs: Option<i64>,
    pub revision: u64,
    /// `None` when no source is registered for the category.
    pub refresh: Option<FeedStatus>,
}

/// A cached snapshot and how old it is.
#[derive(Debug, Serialize)]
pub struct FeedSnapshotResponse {
    pub staleness: Staleness,
    pub snapshot: Arc<FeedSnapshot>,
}

#[derive(Debug, Serialize)]
pub struct FeedsResponse {
    pub running: bool,
    pub feeds: Vec<FeedResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

/// All feeds in category order.
pub async fn list_feeds(State(state): State<Arc<AppState>>) -> Json<FeedsResponse> {
    let orchestrator = state.orchestrator();
    let scheduler = orchestrator.scheduler().status().await;
    let overview = orchestrator.cache().overview(Utc::now());

    let feeds = overview
        .into_iter()
        .map(|entry| FeedResponse {
            category: entry.category,
            staleness: entry.staleness,
            fetched_at: entry.fetched_at,
            age_secs: entry.age_secs,
            revision: entry.revision,
            refresh: scheduler
                .feeds
                .iter()
                .find(|f| f.category == entry.category)
                .cloned(),
        })
        .collect();

    Json(FeedsResponse {
        running: scheduler.running,
        feeds,
    })
}

/// The cached snapshot for one category, with its staleness.
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
    Path(category): Path<FeedCategory>,
) -> impl IntoResponse {
    match state.orchestrator().cache().view(category, Utc::now()) {
        SnapshotView::Present {
            snapshot,
            staleness,
        } => Json(FeedSnapshotResponse {
            staleness,
            snapshot,
        })
        .into_response(),
        SnapshotView::Absent => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new(format!("No data yet for {}", category)),
        )
            .into_response(),
    }
}

/// Raw radar image bytes as last fetched.
pub async fn get_radar_image(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.orchestrator().cache().get(FeedCategory::Radar);
    match snapshot.as_deref().map(|s| &s.payload) {
        Some(FeedPayload::Radar(image)) => (
            [(header::CONTENT_TYPE, image.content_type.clone())],
            image.bytes.clone(),
        )
            .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("No radar image yet"),
        )
            .into_response(),
    }
}
