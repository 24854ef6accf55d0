use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::json;

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "NOT_FOUND").into_response()
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}
