use std::env;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use deal_ingest::{
    router::deal_routes,
    services::{
        deal_importer::DealImporter, deal_store::DealStore, deal_validator::DealValidator,
    },
    AppState,
};
use sea_orm::{Database, DatabaseConnection, DbErr};
use serde_json::Value;
use tower::ServiceExt;

/// Set up test database connection
/// Uses TEST_DATABASE_URL environment variable or falls back to default
#[allow(dead_code)]
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let database_url = env::var("TEST_DATABASE_URL").unwrap_or_else(|_| {
        "postgresql://deal_user@localhost:5432/deals_test".to_string()
    });

    Database::connect(&database_url).await
}

/// Router over the deal routes backed by `store`
#[allow(dead_code)]
pub fn build_test_router(store: Arc<dyn DealStore>) -> Router {
    let importer = DealImporter::new(store, DealValidator::new());

    deal_routes().with_state(AppState {
        importer: Arc::new(importer),
    })
}

/// Send a request and decode the JSON response body
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = body.map(|json| json.to_string()).unwrap_or_default();

    send_raw(app, method, uri, &body).await
}

/// Like [`send`], with the request body passed through as written
#[allow(dead_code)]
pub async fn send_raw(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let body = Body::from(body.to_string());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}
