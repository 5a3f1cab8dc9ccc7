//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket game sessions at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static dashboard pages from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        .route("/ws", get(ws::ws_upgrade))
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/games", get(http::http_list_games))
        // Checklists (completion sets)
        .route(
            "/api/v1/checklists/:namespace",
            get(http::http_get_checklist).delete(http::http_clear_checklist),
        )
        .route("/api/v1/checklists/:namespace/items/:item", put(http::http_put_checklist_item))
        .route(
            "/api/v1/checklists/:namespace/items/:item/toggle",
            post(http::http_toggle_checklist_item),
        )
        // Partnership dashboard
        .route("/api/v1/dashboard/:partnership", get(http::http_get_dashboard))
        .route(
            "/api/v1/dashboard/:partnership/action-items/:item",
            patch(http::http_patch_action_item),
        )
        .route("/api/v1/engagement", post(http::http_post_engagement))
        // Partner profiles
        .route("/api/v1/partners", get(http::http_list_partners))
        .route("/api/v1/partners/:slug", get(http::http_get_partner))
        .route("/api/v1/partners/:slug/tip", get(http::http_get_partner_tip))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .fallback_service(static_service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::WorkshopConfig;
    use crate::state::tests::test_settings;

    const CONFIG: &str = r#"
[[dashboard.records]]
[dashboard.records.organization]
id = "lincoln-usd"
name = "Lincoln Unified"

[[dashboard.records.action_items]]
id = "kickoff"
title = "Kickoff meeting"
category = "Onboarding"
priority = "high"
status = "completed"
sort_order = 1

[[dashboard.records.action_items]]
id = "observe"
title = "First classroom observation"
category = "Coaching"
status = "pending"
sort_order = 2

[[dashboard.records.metrics]]
name = "attendance"
value = 0.92
recorded_at = "2024-10-01T00:00:00Z"

[[partners]]
slug = "lincoln"
name = "Lincoln Unified"
tips = ["Greet every student by name.", "Post the schedule where everyone can see it."]
"#;

    fn app() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        let cfg: WorkshopConfig = toml::from_str(CONFIG).unwrap();
        let state = AppState::build(cfg, test_settings(dir.path().to_path_buf()));
        (dir, build_router(Arc::new(state)))
    }

    async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let req = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(v) => req
                .header("content-type", "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, value)
    }

    #[tokio::test]
    async fn health_and_games() {
        let (_dir, app) = app();
        let (status, body) = call(&app, Method::GET, "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);

        let (status, body) = call(&app, Method::GET, "/api/v1/games", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(4));
        assert_eq!(body[0]["kind"], "timed_qa");
    }

    #[tokio::test]
    async fn checklist_round_trip() {
        let (_dir, app) = app();
        let (status, body) = call(&app, Method::GET, "/api/v1/checklists/onboarding", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["done"], json!([]));

        let (status, body) = call(
            &app,
            Method::PUT,
            "/api/v1/checklists/onboarding/items/sign-mou",
            Some(json!({ "done": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["done"], json!(["sign-mou"]));

        let (_, body) = call(&app, Method::POST, "/api/v1/checklists/onboarding/items/kickoff/toggle", None).await;
        assert_eq!(body["done"], json!(["kickoff", "sign-mou"]));

        let (_, body) = call(&app, Method::GET, "/api/v1/checklists/onboarding", None).await;
        assert_eq!(body["done"], json!(["kickoff", "sign-mou"]));

        let (_, body) = call(&app, Method::DELETE, "/api/v1/checklists/onboarding", None).await;
        assert_eq!(body["done"], json!([]));
    }

    #[tokio::test]
    async fn checklist_rejects_bad_namespace() {
        let (_dir, app) = app();
        let (status, body) = call(&app, Method::GET, "/api/v1/checklists/bad.name", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn dashboard_view_and_status_update() {
        let (_dir, app) = app();
        let (status, body) = call(&app, Method::GET, "/api/v1/dashboard/lincoln-usd", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["completion_percent"], 50);
        assert_eq!(body["action_items"][0]["id"], "kickoff");
        assert_eq!(body["latest_metrics"][0]["name"], "attendance");

        let (status, body) = call(&app, Method::GET, "/api/v1/dashboard/lincoln-usd?status=pending", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action_items"].as_array().map(Vec::len), Some(1));

        let (status, body) = call(
            &app,
            Method::PATCH,
            "/api/v1/dashboard/lincoln-usd/action-items/observe",
            Some(json!({ "status": "completed" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "completed");

        let (_, body) = call(&app, Method::GET, "/api/v1/dashboard/lincoln-usd", None).await;
        assert_eq!(body["completion_percent"], 100);
    }

    #[tokio::test]
    async fn dashboard_unknown_ids_are_not_found() {
        let (_dir, app) = app();
        let (status, body) = call(&app, Method::GET, "/api/v1/dashboard/nowhere", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");

        let (status, _) = call(
            &app,
            Method::PATCH,
            "/api/v1/dashboard/lincoln-usd/action-items/missing",
            Some(json!({ "status": "paused" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn engagement_beacon_is_accepted() {
        let (_dir, app) = app();
        let (status, _) = call(
            &app,
            Method::POST,
            "/api/v1/engagement",
            Some(json!({ "tab": "overview", "elapsed_ms": 1200 })),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn partner_profile_and_tip_rotation() {
        let (_dir, app) = app();
        let (_, body) = call(&app, Method::GET, "/api/v1/partners", None).await;
        assert_eq!(body[0]["slug"], "lincoln");

        let (status, body) = call(&app, Method::GET, "/api/v1/partners/lincoln", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Lincoln Unified");

        let (_, body) = call(&app, Method::GET, "/api/v1/partners/lincoln/tip?index=3", None).await;
        assert_eq!(body["tip"], "Post the schedule where everyone can see it.");

        let (status, _) = call(&app, Method::GET, "/api/v1/partners/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
