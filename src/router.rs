//! Application router
//!
//! Shared by `main.rs` and the integration tests so both see the same routes.

use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handlers::deal::{check_duplicate, import_deals, import_deals_report, save_deal};
use crate::AppState;

/// Deal routes without middleware
pub fn deal_routes() -> Router<AppState> {
    Router::new()
        .route("/api/deals/save", post(save_deal))
        .route("/api/deals/import", post(import_deals))
        .route("/api/deals/import/report", post(import_deals_report))
        .route(
            "/api/deals/check-duplicate/{deal_unique_id}",
            get(check_duplicate),
        )
}

pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(hello))
        .merge(deal_routes())
        .layer(build_cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn hello() -> &'static str {
    "Deal ingest service"
}

fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
}
