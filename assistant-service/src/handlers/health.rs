use axum::{response::IntoResponse, Json};
use serde_json::json;

/// Liveness probe. The service holds no connections, so it is healthy once serving.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "assistant-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus scrape endpoint.
pub async fn metrics() -> impl IntoResponse {
    crate::services::metrics::get_metrics()
}
