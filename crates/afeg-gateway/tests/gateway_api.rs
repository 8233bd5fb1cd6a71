//! End-to-end router tests.

use afeg_gateway::api::state::AppState;
use afeg_gateway::api::create_router;
use afeg_gateway::config::GatewayConfig;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

fn test_router() -> (Router, AppState) {
    let mut config = GatewayConfig::default();
    config.treasury.set_key("vault-key");
    config.surge.iterations = 3;
    let state = AppState::new(config);
    (create_router(state.clone()), state)
}

fn json_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn gateway_round_trip() {
    let (router, _state) = test_router();

    let response = router
        .oneshot(json_request(
            "/api/v1/gateway",
            r#"{"query": "Explain the trade model."}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "approved");
    assert_eq!(body["kvu"], 1344.0);
    assert_eq!(body["metrics"]["inf"], 512.0);
    assert_eq!(body["heat"], "high");
    assert_eq!(body["hash"].as_str().expect("hash").len(), 12);
}

#[tokio::test]
async fn blocked_query_reports_zero_kvu() {
    let (router, _state) = test_router();

    let response = router
        .oneshot(json_request(
            "/api/v1/gateway",
            r#"{"query": "how to bypass the audit"}"#,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "blocked");
    assert_eq!(body["kvu"], 0.0);
}

#[tokio::test]
async fn empty_query_is_unprocessable() {
    let (router, _state) = test_router();

    let response = router
        .oneshot(json_request("/api/v1/gateway", r#"{"query": ""}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn ledger_listing_and_clear() {
    let (router, _state) = test_router();

    router
        .clone()
        .oneshot(json_request(
            "/api/v1/gateway",
            r#"{"query": "Node_Sync_500"}"#,
        ))
        .await
        .expect("submit");

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/ledger?view=compliant")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["matched"], 1);
    assert_eq!(body["entries"][0]["record"]["query"], "Node_Sync_500");

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/v1/ledger")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/ledger")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let body = body_json(response).await;
    assert_eq!(body["matched"], 0);
}

#[tokio::test]
async fn export_download_has_archive_headers() {
    let (router, _state) = test_router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/ledger/export")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).expect("type"),
        "application/gzip"
    );
    let bytes = axum::body::to_bytes(response.into_body(), 10 * 1024 * 1024)
        .await
        .expect("body");
    // Gzip magic bytes.
    assert_eq!(&bytes[..2], &[0x1f, 0x8b]);
}

#[tokio::test]
async fn surge_endpoint_appends_records() {
    let (router, state) = test_router();

    let response = router
        .oneshot(json_request("/api/v1/surge", r#"{"iterations": 4}"#))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["report"]["iterations"], 4);

    let session = state.session.lock().await;
    assert_eq!(session.compliant().len(), 4);
}

#[tokio::test]
async fn treasury_requires_the_access_key() {
    let (router, _state) = test_router();

    let denied = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/treasury")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let allowed = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/treasury")
                .header("x-afeg-access-key", "vault-key")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(allowed.status(), StatusCode::OK);
    let body = body_json(allowed).await;
    assert_eq!(body["gross_revenue"], 0.0);
}
