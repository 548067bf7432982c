//! Close-run routes: execute a procedure, list the run log.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::internal_error_response;
use saldo_core::close::{CloseRunError, RunType};
use saldo_db::entities::close_runs;
use saldo_db::repositories::close_run::{CloseRunRepository, CloseRunStoreError};

/// Creates the close-run routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/{company_id}/periods/{period_id}/close-runs",
            post(run_procedure),
        )
        .route(
            "/companies/{company_id}/periods/{period_id}/close-runs",
            get(list_runs),
        )
}

/// Request body for executing a close procedure.
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    /// Procedure name: "recurring", "allocations", or "fx_reval".
    pub run_type: String,
    /// Procedure-specific parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response for a close run.
#[derive(Debug, Serialize)]
pub struct CloseRunResponse {
    /// Run ID.
    pub id: Uuid,
    /// Procedure executed.
    pub run_type: String,
    /// Structured outcome: posted count and per-item errors.
    pub payload: serde_json::Value,
    /// When the run executed.
    pub executed_at: chrono::DateTime<chrono::FixedOffset>,
}

impl CloseRunResponse {
    fn from_model(model: close_runs::Model) -> Self {
        let run_type = RunType::from(model.run_type).to_string();
        Self {
            id: model.id,
            run_type,
            payload: model.payload,
            executed_at: model.executed_at,
        }
    }
}

/// POST `/companies/{company_id}/periods/{period_id}/close-runs` - Execute.
async fn run_procedure(
    State(state): State<AppState>,
    Path((company_id, period_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<RunRequest>,
) -> impl IntoResponse {
    let Ok(run_type) = RunType::from_str(&payload.run_type) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "unknown_run_type",
                "message": "Run type must be one of: recurring, allocations, fx_reval"
            })),
        )
            .into_response();
    };

    let repo = CloseRunRepository::new((*state.db).clone());

    match repo
        .execute(company_id, period_id, run_type, payload.params)
        .await
    {
        Ok(run) => {
            info!(
                company_id = %company_id,
                period_id = %period_id,
                run_type = %run_type,
                run_id = %run.id,
                "Close procedure executed"
            );
            (
                StatusCode::CREATED,
                Json(json!(CloseRunResponse::from_model(run))),
            )
                .into_response()
        }
        Err(e) => close_run_error_response(&e),
    }
}

/// GET `/companies/{company_id}/periods/{period_id}/close-runs` - Run log.
async fn list_runs(
    State(state): State<AppState>,
    Path((company_id, period_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = CloseRunRepository::new((*state.db).clone());

    match repo.list_runs(company_id, period_id).await {
        Ok(runs) => {
            let response: Vec<CloseRunResponse> =
                runs.into_iter().map(CloseRunResponse::from_model).collect();
            (StatusCode::OK, Json(json!({ "runs": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list close runs");
            internal_error_response()
        }
    }
}

// Helper functions

fn close_run_error_response(err: &CloseRunStoreError) -> axum::response::Response {
    match err {
        CloseRunStoreError::Run(run_err) => {
            let status = StatusCode::from_u16(run_err.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = match run_err {
                // Carry the prior run's identity so UIs can show
                // "already ran" rather than "you made a mistake".
                CloseRunError::AlreadyRun { run_id } => json!({
                    "error": "already_run",
                    "message": run_err.to_string(),
                    "run_id": run_id
                }),
                _ => json!({
                    "error": run_err.error_code().to_lowercase(),
                    "message": run_err.to_string()
                }),
            };
            (status, Json(body)).into_response()
        }
        CloseRunStoreError::PeriodNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "period_not_found",
                "message": "Period not found"
            })),
        )
            .into_response(),
        CloseRunStoreError::Payload(e) => {
            error!(error = %e, "Failed to serialize run payload");
            internal_error_response()
        }
        CloseRunStoreError::Database(e) => {
            error!(error = %e, "Failed to execute close run");
            internal_error_response()
        }
    }
}
