use axum::{http::StatusCode, Json};

use crate::api::HealthResponse;

/// GET /health
pub async fn health_check() -> Result<Json<HealthResponse>, StatusCode> {
    Ok(Json(HealthResponse {
        message: "OK".into(),
    }))
}

/// GET /
pub async fn index() -> &'static str {
    "FAQ API is running"
}
