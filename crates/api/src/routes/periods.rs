//! Period lifecycle and close-checklist routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::internal_error_response;
use saldo_core::period::ChecklistItem;
use saldo_db::entities::periods;
use saldo_db::repositories::period::{CreateCalendarInput, PeriodRepository, PeriodStoreError};

/// Checklist template applied when the caller does not supply one.
const DEFAULT_CHECKLIST: [&str; 4] = [
    "Reconcile bank accounts",
    "Post recurring journals",
    "Run cost allocations",
    "Revalue foreign balances",
];

/// Creates the period routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/companies/{company_id}/periods", get(list_periods))
        .route("/companies/{company_id}/periods", post(create_calendar))
        .route(
            "/companies/{company_id}/periods/{period_id}",
            get(get_period),
        )
        .route(
            "/companies/{company_id}/periods/{period_id}/start-close",
            post(start_close),
        )
        .route(
            "/companies/{company_id}/periods/{period_id}/complete-close",
            post(complete_close),
        )
        .route(
            "/companies/{company_id}/periods/{period_id}/checklist/{item_id}",
            patch(toggle_checklist_item),
        )
}

/// Request body for creating a period calendar.
#[derive(Debug, Deserialize)]
pub struct CreateCalendarRequest {
    /// First day of the calendar (YYYY-MM-DD).
    pub start_date: NaiveDate,
    /// Last day of the calendar (YYYY-MM-DD).
    pub end_date: NaiveDate,
    /// Optional checklist template; a default close checklist is used
    /// when absent.
    pub checklist: Option<Vec<String>>,
}

/// Request body for toggling a checklist item.
#[derive(Debug, Deserialize)]
pub struct ToggleChecklistRequest {
    /// New completion state.
    pub completed: bool,
}

/// Response for a period.
#[derive(Debug, Serialize)]
pub struct PeriodResponse {
    /// Period ID.
    pub id: Uuid,
    /// Period label (e.g., "2024-01").
    pub label: String,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Status: open, locked, closing, or closed.
    pub status: String,
    /// When the period closed, if it has.
    pub closed_at: Option<chrono::DateTime<chrono::FixedOffset>>,
}

impl PeriodResponse {
    fn from_model(model: periods::Model) -> Self {
        let status = saldo_core::period::PeriodStatus::from(model.status).to_string();
        Self {
            id: model.id,
            label: model.label,
            start_date: model.start_date,
            end_date: model.end_date,
            status,
            closed_at: model.closed_at,
        }
    }
}

/// Response for a checklist item.
#[derive(Debug, Serialize)]
pub struct ChecklistItemResponse {
    /// Item ID.
    pub id: Uuid,
    /// Task title.
    pub title: String,
    /// Whether the task is done.
    pub completed: bool,
    /// Display order.
    pub sort_order: i16,
}

impl ChecklistItemResponse {
    fn from_domain(item: ChecklistItem) -> Self {
        Self {
            id: item.id.into_inner(),
            title: item.title,
            completed: item.completed,
            sort_order: item.sort_order,
        }
    }
}

/// GET `/companies/{company_id}/periods` - List periods in calendar order.
async fn list_periods(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PeriodRepository::new((*state.db).clone());

    match repo.list(company_id).await {
        Ok(periods) => {
            let response: Vec<PeriodResponse> =
                periods.into_iter().map(PeriodResponse::from_model).collect();
            (StatusCode::OK, Json(json!({ "periods": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list periods");
            internal_error_response()
        }
    }
}

/// POST `/companies/{company_id}/periods` - Create a monthly period calendar.
async fn create_calendar(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<CreateCalendarRequest>,
) -> impl IntoResponse {
    let repo = PeriodRepository::new((*state.db).clone());

    let checklist = payload.checklist.unwrap_or_else(|| {
        DEFAULT_CHECKLIST.iter().map(ToString::to_string).collect()
    });

    let input = CreateCalendarInput {
        company_id,
        start_date: payload.start_date,
        end_date: payload.end_date,
        checklist,
    };

    match repo.create_calendar(input).await {
        Ok(created) => {
            info!(
                company_id = %company_id,
                periods = created.len(),
                "Period calendar created"
            );
            let response: Vec<PeriodResponse> =
                created.into_iter().map(PeriodResponse::from_model).collect();
            (StatusCode::CREATED, Json(json!({ "periods": response }))).into_response()
        }
        Err(e) => period_error_response(&e, "create period calendar"),
    }
}

/// GET `/companies/{company_id}/periods/{period_id}` - Period with checklist.
async fn get_period(
    State(state): State<AppState>,
    Path((company_id, period_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = PeriodRepository::new((*state.db).clone());

    let period = match repo.find_by_id(company_id, period_id).await {
        Ok(Some(period)) => period,
        Ok(None) => return period_not_found_response(),
        Err(e) => {
            error!(error = %e, "Database error finding period");
            return internal_error_response();
        }
    };

    match repo.checklist(period_id).await {
        Ok(items) => {
            let checklist: Vec<ChecklistItemResponse> = items
                .into_iter()
                .map(ChecklistItemResponse::from_domain)
                .collect();
            (
                StatusCode::OK,
                Json(json!({
                    "period": PeriodResponse::from_model(period),
                    "checklist": checklist
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Database error loading checklist");
            internal_error_response()
        }
    }
}

/// POST `/companies/{company_id}/periods/{period_id}/start-close` - Lock the period.
async fn start_close(
    State(state): State<AppState>,
    Path((company_id, period_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = PeriodRepository::new((*state.db).clone());

    match repo.start_close(company_id, period_id).await {
        Ok(period) => {
            info!(company_id = %company_id, period_id = %period_id, "Period close started");
            (
                StatusCode::OK,
                Json(json!(PeriodResponse::from_model(period))),
            )
                .into_response()
        }
        Err(e) => period_error_response(&e, "start close"),
    }
}

/// POST `/companies/{company_id}/periods/{period_id}/complete-close` - Close the period.
async fn complete_close(
    State(state): State<AppState>,
    Path((company_id, period_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = PeriodRepository::new((*state.db).clone());

    match repo.complete_close(company_id, period_id).await {
        Ok(period) => {
            info!(company_id = %company_id, period_id = %period_id, "Period closed");
            (
                StatusCode::OK,
                Json(json!(PeriodResponse::from_model(period))),
            )
                .into_response()
        }
        Err(e) => period_error_response(&e, "complete close"),
    }
}

/// PATCH `/companies/{company_id}/periods/{period_id}/checklist/{item_id}` - Toggle an item.
async fn toggle_checklist_item(
    State(state): State<AppState>,
    Path((company_id, period_id, item_id)): Path<(Uuid, Uuid, Uuid)>,
    Json(payload): Json<ToggleChecklistRequest>,
) -> impl IntoResponse {
    let repo = PeriodRepository::new((*state.db).clone());

    match repo
        .toggle_checklist_item(company_id, period_id, item_id, payload.completed)
        .await
    {
        Ok(item) => {
            info!(
                company_id = %company_id,
                period_id = %period_id,
                item_id = %item_id,
                completed = payload.completed,
                "Checklist item toggled"
            );
            (
                StatusCode::OK,
                Json(json!(ChecklistItemResponse::from_domain(item))),
            )
                .into_response()
        }
        Err(e) => period_error_response(&e, "toggle checklist item"),
    }
}

// Helper functions

fn period_error_response(err: &PeriodStoreError, action: &str) -> axum::response::Response {
    match err {
        PeriodStoreError::Lifecycle(lifecycle) => {
            let status = StatusCode::from_u16(lifecycle.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = match lifecycle {
                saldo_core::period::PeriodError::ChecklistIncomplete { missing_count } => json!({
                    "error": "checklist_incomplete",
                    "message": lifecycle.to_string(),
                    "missing_count": missing_count
                }),
                _ => json!({
                    "error": lifecycle.error_code().to_lowercase(),
                    "message": lifecycle.to_string()
                }),
            };
            (status, Json(body)).into_response()
        }
        PeriodStoreError::PeriodNotFound(_) => period_not_found_response(),
        PeriodStoreError::ItemNotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "item_not_found",
                "message": "Checklist item not found"
            })),
        )
            .into_response(),
        PeriodStoreError::InvalidDateRange => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_date_range",
                "message": "Start date must be before end date"
            })),
        )
            .into_response(),
        PeriodStoreError::OverlappingPeriods(label) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "overlapping_periods",
                "message": format!("Period range overlaps existing period: {label}")
            })),
        )
            .into_response(),
        PeriodStoreError::Database(e) => {
            error!(error = %e, "Failed to {action}");
            internal_error_response()
        }
    }
}

fn period_not_found_response() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "period_not_found",
            "message": "Period not found"
        })),
    )
        .into_response()
}
