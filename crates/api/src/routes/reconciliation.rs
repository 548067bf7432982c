//! Reconciliation routes: candidate lookup, match commit.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::internal_error_response;
use saldo_core::reconciliation::{Payment, ReconciliationError};
use saldo_db::repositories::reconciliation::{ReconciliationRepository, ReconciliationStoreError};

/// Creates the reconciliation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/{company_id}/bank-transactions/{transaction_id}/reconciliation-candidates",
            get(find_candidates),
        )
        .route(
            "/companies/{company_id}/bank-transactions/{transaction_id}/reconcile",
            post(reconcile),
        )
}

/// Request body for committing a reconciliation.
#[derive(Debug, Deserialize)]
pub struct ReconcileRequest {
    /// Payment to link; absent for transactions with no payment
    /// counterpart (e.g. bank fees).
    pub payment_id: Option<Uuid>,
}

/// Response for a candidate payment.
#[derive(Debug, Serialize)]
pub struct CandidateResponse {
    /// Payment ID.
    pub id: Uuid,
    /// Payment amount.
    pub amount: rust_decimal::Decimal,
    /// Payment method.
    pub method: String,
    /// External reference, if any.
    pub reference: Option<String>,
    /// Date the payment was received or issued.
    pub received_on: chrono::NaiveDate,
}

impl CandidateResponse {
    fn from_domain(payment: Payment) -> Self {
        Self {
            id: payment.id.into_inner(),
            amount: payment.amount,
            method: payment.method,
            reference: payment.reference,
            received_on: payment.received_on,
        }
    }
}

/// GET `.../bank-transactions/{transaction_id}/reconciliation-candidates`
///
/// Candidates are within one cent of the transaction amount, closest
/// amount first, then closest date.
async fn find_candidates(
    State(state): State<AppState>,
    Path((company_id, transaction_id)): Path<(Uuid, Uuid)>,
) -> impl IntoResponse {
    let repo = ReconciliationRepository::new((*state.db).clone());

    match repo.find_candidates(company_id, transaction_id).await {
        Ok(candidates) => {
            let response: Vec<CandidateResponse> = candidates
                .into_iter()
                .map(CandidateResponse::from_domain)
                .collect();
            (StatusCode::OK, Json(json!({ "candidates": response }))).into_response()
        }
        Err(e) => reconciliation_error_response(&e),
    }
}

/// POST `.../bank-transactions/{transaction_id}/reconcile` - Commit a match.
async fn reconcile(
    State(state): State<AppState>,
    Path((company_id, transaction_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<ReconcileRequest>,
) -> impl IntoResponse {
    let repo = ReconciliationRepository::new((*state.db).clone());

    match repo
        .reconcile(company_id, transaction_id, payload.payment_id)
        .await
    {
        Ok(matched) => {
            info!(
                company_id = %company_id,
                transaction_id = %transaction_id,
                payment_id = ?payload.payment_id,
                "Transaction reconciled"
            );
            (
                StatusCode::CREATED,
                Json(json!({
                    "id": matched.id,
                    "transaction_id": matched.transaction_id,
                    "payment_id": matched.payment_id,
                    "created_at": matched.created_at
                })),
            )
                .into_response()
        }
        Err(e) => reconciliation_error_response(&e),
    }
}

// Helper functions

fn reconciliation_error_response(err: &ReconciliationStoreError) -> axum::response::Response {
    match err {
        ReconciliationStoreError::Reconciliation(rec_err) => {
            let status = StatusCode::from_u16(rec_err.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let error = match rec_err {
                ReconciliationError::AlreadyReconciled(_) => "already_reconciled",
                ReconciliationError::TransactionNotFound(_) => "transaction_not_found",
            };
            (
                status,
                Json(json!({
                    "error": error,
                    "message": rec_err.to_string()
                })),
            )
                .into_response()
        }
        ReconciliationStoreError::PaymentNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "payment_not_found",
                "message": format!("Payment not found: {id}")
            })),
        )
            .into_response(),
        ReconciliationStoreError::Database(e) => {
            error!(error = %e, "Reconciliation failed");
            internal_error_response()
        }
    }
}
