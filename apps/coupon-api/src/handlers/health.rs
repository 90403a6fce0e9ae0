//! Liveness endpoint backed by a store health check.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::response::ApiResponse;
use crate::AppState;

/// Health payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: bool,
    pub schema_current: bool,
    pub version: &'static str,
    pub server_time: DateTime<Utc>,
}

/// `GET /health` answers 503 when the store is unreachable or its schema is
/// not fully migrated.
pub async fn health(State(state): State<Arc<AppState>>) -> ApiResponse<HealthStatus> {
    let db = state.db.health().await;

    let (status, label, message) = if db.is_healthy() {
        (StatusCode::OK, "serving", "Service healthy")
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "not_serving",
            "Database unhealthy",
        )
    };

    ApiResponse::new(
        status,
        HealthStatus {
            status: label,
            database: db.reachable,
            schema_current: db.schema_current,
            version: env!("CARGO_PKG_VERSION"),
            server_time: Utc::now(),
        },
        message,
    )
}
