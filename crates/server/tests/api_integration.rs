//! API integration tests against an in-process router.

mod common;

use axum::http::StatusCode;
use weatharr_core::FeedCategory;

use common::{fixtures, TestFixture};

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new(&[]).await;

    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");

    fixture.shutdown().await;
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new(&[]).await;

    let response = fixture.get("/api/v1/config").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["station"]["name"], "Test Station");
    assert_eq!(response.body["headline_feeds_configured"], 1);
    assert_eq!(response.body["feeds"].as_array().unwrap().len(), 9);

    let text = serde_json::to_string(&response.body).unwrap();
    assert!(!text.contains("ops@example.com"));
    assert!(!text.contains("news.example.com"));

    fixture.shutdown().await;
}

#[tokio::test]
async fn test_display_returns_latest_frame() {
    let fixture = TestFixture::new(&[
        FeedCategory::CurrentConditions,
        FeedCategory::Radar,
        FeedCategory::Alerts,
    ])
    .await;

    let response = fixture.get("/api/v1/display").await;
    assert_status!(response, StatusCode::OK);
    assert!(response.body["active_panel"].is_string());
    assert_eq!(response.body["ticker_generation"], 1);
    assert!(response.body["ticker_text"]
        .as_str()
        .unwrap()
        .contains("Heat Advisory"));

    let status = fixture.get("/api/v1/display/status").await;
    assert_status!(status, StatusCode::OK);
    assert_eq!(status.body["running"], true);

    fixture.shutdown().await;
    assert!(!fixture.sink.frames().is_empty());
}

#[tokio::test]
async fn test_feeds_merge_refresh_and_cache_state() {
    let fixture = TestFixture::new(&[FeedCategory::Radar]).await;

    let response = fixture.get("/api/v1/feeds").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["running"], true);

    let feeds = response.body["feeds"].as_array().unwrap();
    assert_eq!(feeds.len(), 9);

    let radar = feeds.iter().find(|f| f["category"] == "radar").unwrap();
    assert_eq!(radar["staleness"], "fresh");
    assert_eq!(radar["refresh"]["source"], "mock-radar");
    assert_eq!(radar["refresh"]["total_successes"], 1);

    let alerts = feeds.iter().find(|f| f["category"] == "alerts").unwrap();
    assert!(alerts["staleness"].is_null());
    assert!(alerts["refresh"].is_null());

    fixture.shutdown().await;
}

#[tokio::test]
async fn test_single_feed() {
    let fixture = TestFixture::new(&[FeedCategory::CurrentConditions]).await;

    let response = fixture.get("/api/v1/feeds/current_conditions").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["staleness"], "fresh");
    assert_eq!(response.body["snapshot"]["revision"], 1);
    assert_eq!(
        response.body["snapshot"]["payload"]["kind"],
        "current_conditions"
    );

    let missing = fixture.get("/api/v1/feeds/text_forecast").await;
    assert_status!(missing, StatusCode::NOT_FOUND);

    let unknown = fixture.get("/api/v1/feeds/sunshine").await;
    assert!(unknown.status.is_client_error());

    fixture.shutdown().await;
}

#[tokio::test]
async fn test_radar_image_bytes() {
    let fixture = TestFixture::new(&[FeedCategory::Radar]).await;

    let response = fixture.get("/api/v1/feeds/radar/image").await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.content_type.as_deref(), Some("image/png"));

    let expected = match fixtures::radar() {
        weatharr_core::FeedPayload::Radar(image) => image.bytes,
        _ => unreachable!(),
    };
    assert_eq!(response.bytes, expected);

    fixture.shutdown().await;
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let fixture = TestFixture::new(&[FeedCategory::Radar]).await;

    let response = fixture.get("/metrics").await;
    assert_status!(response, StatusCode::OK);
    let text = String::from_utf8(response.bytes).unwrap();
    assert!(text.contains("weatharr_display_running 1"));
    assert!(text.contains("weatharr_fetch_attempts_total"));
    assert!(text.contains("weatharr_render_ticks_total"));

    fixture.shutdown().await;
}
