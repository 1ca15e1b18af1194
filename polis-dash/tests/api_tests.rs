//! Integration tests for polis-dash HTTP endpoints
//!
//! Tests cover:
//! - Health endpoint
//! - Dashboard page and query-parameter pre-fill
//! - Form run: validation message, success message, rendered output
//! - JSON run: summary, cache reuse, failure propagation

mod helpers;

use axum::http::StatusCode;
use helpers::*;
use polis_common::config::{DashboardConfig, PlotBackend};
use polis_dash::{build_router, AppState};
use serde_json::json;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

fn setup_app(config: DashboardConfig, source: Arc<FakeSource>) -> axum::Router {
    build_router(AppState::new(config, source))
}

fn default_app(statements: usize) -> (axum::Router, Arc<FakeSource>) {
    let source = Arc::new(FakeSource::new(camp_dataset(statements)));
    (setup_app(DashboardConfig::default(), source.clone()), source)
}

// =============================================================================
// Health and static assets
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = default_app(4);
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "polis-dash");
    assert!(body["version"].is_string());
    assert!(body["git_hash"].is_string());
    assert_eq!(body["plot_backend"], "interactive");
    assert_eq!(body["cached_reports"], 0);
    assert_eq!(body["progress_subscribers"], 0);
}

#[tokio::test]
async fn test_health_counts_cached_reports() {
    let (app, _) = default_app(6);
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/run",
            json!({"report": "https://pol.is/report/abc123"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/health")).await.unwrap();
    let body = body_json(response.into_body()).await;
    assert_eq!(body["cached_reports"], 1);
}

#[tokio::test]
async fn test_app_js_served() {
    let (app, _) = default_app(4);
    let response = app.oneshot(get("/static/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/javascript"
    );

    // Subscribes with the run token before the form is sent
    let script = body_text(response.into_body()).await;
    assert!(script.contains("preventDefault"));
    assert!(script.contains("/events?run="));
    assert!(script.contains("'ConnectionStatus'"));
}

#[tokio::test]
async fn test_events_require_run_token() {
    let (app, _) = default_app(4);
    let response = app.oneshot(get("/events")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_events_stream_for_run_token() {
    let (app, _) = default_app(4);
    let response = app.oneshot(get("/events?run=abc123")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "text/event-stream");
}

// =============================================================================
// Dashboard page
// =============================================================================

#[tokio::test]
async fn test_index_uses_default_report_url() {
    let (app, _) = default_app(4);
    let response = app.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains(r#"value="https://pol.is/report/r4zdxrdscmukmkakmbz3k""#));
    assert!(html.contains(r#"name="lang""#));
    assert!(html.contains(r#"name="run_token" type="hidden""#));
    assert!(html.contains("Run analysis"));
}

#[tokio::test]
async fn test_index_prefilled_from_query() {
    let (app, _) = default_app(4);
    let response = app
        .oneshot(get("/?report=https%3A%2F%2Fpol.is%2Freport%2Fabc123&lang=fr"))
        .await
        .unwrap();

    let html = body_text(response.into_body()).await;
    assert!(html.contains(r#"value="https://pol.is/report/abc123""#));
    assert!(html.contains(r#"maxlength="2" value="fr""#));
}

#[tokio::test]
async fn test_prefill_and_translation_can_be_disabled() {
    let config = DashboardConfig {
        query_prefill: false,
        translation_enabled: false,
        ..DashboardConfig::default()
    };
    let app = setup_app(config, Arc::new(FakeSource::new(camp_dataset(4))));
    let response = app
        .oneshot(get("/?report=https%3A%2F%2Fpol.is%2Freport%2Fabc123&lang=fr"))
        .await
        .unwrap();

    let html = body_text(response.into_body()).await;
    assert!(!html.contains("report/abc123"));
    assert!(!html.contains(r#"name="lang""#));
}

// =============================================================================
// Form run
// =============================================================================

#[tokio::test]
async fn test_blank_url_shows_validation_message_only() {
    let (app, source) = default_app(4);
    let response = app
        .oneshot(post_form("/run", "report=+++&lang="))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains(r#"<div class="notice error">Please enter a Pol.is report URL.</div>"#));
    assert!(!html.contains("Statement Map"));
    assert!(!html.contains("statement-map"));
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_run_renders_map_and_inspection() {
    let (app, source) = default_app(12);
    let response = app
        .oneshot(post_form(
            "/run",
            "report=https%3A%2F%2Fpol.is%2Freport%2Fabc123&lang=&run_token=f00d",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response.into_body()).await;
    assert!(html.contains("Loaded report with 12 statements"));
    assert!(html.contains("<h2>Statement Map</h2>"));
    assert!(html.contains(r#"<iframe class="statement-map""#));
    assert!(html.contains("Inspect derived variables"));
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_static_backend_renders_image() {
    let config = DashboardConfig {
        plot_backend: PlotBackend::Static,
        ..DashboardConfig::default()
    };
    let app = setup_app(config, Arc::new(FakeSource::new(camp_dataset(8))));
    let response = app
        .oneshot(post_form("/run", "report=https%3A%2F%2Fpol.is%2Freport%2Fabc123"))
        .await
        .unwrap();

    let html = body_text(response.into_body()).await;
    assert!(html.contains("data:image/svg+xml;base64,"));
}

#[tokio::test]
async fn test_unreachable_report_is_generic_failure() {
    let (app, _) = default_app(4);
    let response = app
        .oneshot(post_form("/run", "report=https%3A%2F%2Fdown.invalid%2Freport%2Fx"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "SOURCE_ERROR");
}

// =============================================================================
// JSON run
// =============================================================================

#[tokio::test]
async fn test_json_run_summary() {
    let (app, _) = default_app(12);
    let response = app
        .oneshot(post_json(
            "/api/run",
            json!({"report": "https://pol.is/report/abc123", "lang": "fr"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "completed");
    assert_eq!(body["statements"], 12);
    assert_eq!(body["zoom_levels"], 3);
    assert_eq!(body["message"], "Loaded report with 12 statements");
    assert_eq!(body["top_labels"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_json_run_rejected() {
    let (app, source) = default_app(4);
    let response = app
        .oneshot(post_json("/api/run", json!({"report": ""})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "rejected");
    assert_eq!(body["message"], "Please enter a Pol.is report URL.");
    assert!(body.get("statements").is_none());
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_repeated_runs_share_cache() {
    let (app, source) = default_app(6);
    let request = json!({"report": "https://pol.is/report/abc123", "lang": "fr"});

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json("/api/run", request.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    assert_eq!(source.calls(), 1);

    // Different language is a different report identity
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/run",
            json!({"report": "https://pol.is/report/abc123", "lang": "de"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_failed_load_retried_on_next_run() {
    let (app, source) = default_app(4);
    let request = json!({"report": "https://down.invalid/report/x"});

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json("/api/run", request.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_invalid_language_is_bad_request() {
    let (app, source) = default_app(4);
    let response = app
        .oneshot(post_json(
            "/api/run",
            json!({"report": "https://pol.is/report/abc123", "lang": "f"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(source.calls(), 0);
}
