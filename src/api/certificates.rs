use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use super::{bad_request, not_found, server_error, ApiError};
use crate::query::{Filter, LookupParams};
use crate::state::AppState;

const NOT_FOUND_MESSAGE: &str = "Certificate not found";

/// GET /api/certificates - 证书查询
///
/// - `id`: single record object, or 404
/// - `certificateNumber`: array holding that record, or 404
/// - `search` / `holder` / nothing: array, possibly empty
pub async fn lookup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LookupParams>,
) -> Result<Json<Value>, ApiError> {
    let filter = Filter::from_params(&params).map_err(|e| {
        tracing::warn!("Rejected lookup query: {}", e);
        bad_request("Search term could not be processed", e)
    })?;

    match filter {
        Filter::ById(id) => {
            let certificate = state.store.find_by_id(&id).await.map_err(|e| {
                tracing::error!("Certificate lookup by id {} failed: {}", id, e);
                server_error("Failed to fetch certificate", e)
            })?;
            match certificate {
                Some(certificate) => Ok(Json(json!(certificate))),
                None => Err(not_found(NOT_FOUND_MESSAGE)),
            }
        }
        Filter::ByCertificateNumber(number) => {
            let certificate = state.store.find_by_certificate_number(&number).await.map_err(|e| {
                tracing::error!("Certificate lookup by number {} failed: {}", number, e);
                server_error("Failed to fetch certificate", e)
            })?;
            match certificate {
                Some(certificate) => Ok(Json(json!([certificate]))),
                None => Err(not_found(NOT_FOUND_MESSAGE)),
            }
        }
        Filter::Text(clauses) => {
            for clause in &clauses {
                tracing::debug!("Search clause {} over {} fields", clause.pattern.as_str(), clause.fields.len());
            }
            let certificates = state.store.search(&clauses).await.map_err(|e| {
                tracing::error!("Certificate search failed: {}", e);
                server_error("Failed to fetch certificates", e)
            })?;
            Ok(Json(json!(certificates)))
        }
    }
}
