//! API route definitions.

use axum::{Json, Router, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::AppState;
use saldo_shared::AppError;

pub mod close_runs;
pub mod health;
pub mod journal_entries;
pub mod periods;
pub mod reconciliation;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(journal_entries::routes())
        .merge(periods::routes())
        .merge(close_runs::routes())
        .merge(reconciliation::routes())
}

/// Opaque 500 response; details stay in the logs.
pub(crate) fn internal_error_response() -> axum::response::Response {
    let err = AppError::Internal("An error occurred".to_string());
    (
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({
            "error": err.error_code().to_lowercase(),
            "message": "An error occurred"
        })),
    )
        .into_response()
}
