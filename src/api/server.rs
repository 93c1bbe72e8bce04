use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::AppState;

/// GET /api/health - 健康检查
pub async fn health_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    match state.store.count().await {
        Ok(count) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
                "buildTime": env!("CERTREG_BUILD_TIME"),
                "certificates": count,
            })),
        ),
        Err(e) => {
            tracing::error!("Health check could not reach the certificate store: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "error",
                    "message": "Certificate store unavailable",
                    "error": e.to_string(),
                })),
            )
        }
    }
}
