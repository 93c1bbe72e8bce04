pub mod certificates;
pub mod server;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::models::MessageBody;
use crate::state::AppState;

/// Handler error: status plus a `{"message": ...}` body
pub type ApiError = (StatusCode, Json<Value>);

fn message(status: StatusCode, text: &str, error: Option<String>) -> ApiError {
    let body = MessageBody {
        message: text.to_string(),
        error,
    };
    (status, Json(json!(body)))
}

pub fn not_found(text: &str) -> ApiError {
    message(StatusCode::NOT_FOUND, text, None)
}

pub fn bad_request(text: &str, error: impl std::fmt::Display) -> ApiError {
    message(StatusCode::BAD_REQUEST, text, Some(error.to_string()))
}

pub fn server_error(text: &str, error: impl std::fmt::Display) -> ApiError {
    message(StatusCode::INTERNAL_SERVER_ERROR, text, Some(error.to_string()))
}

/// Build the application router / 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(server::health_check))
        .route("/api/certificates", get(certificates::lookup))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
