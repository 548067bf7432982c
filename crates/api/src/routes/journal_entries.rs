//! Journal entry routes: balance validation, auto-balancing, posting.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::AppState;
use crate::routes::internal_error_response;
use saldo_core::ledger::{
    EntrySource, JournalEntryInput, JournalLine, LedgerError, auto_balance, validate_lines,
};
use saldo_db::repositories::journal::{JournalError, JournalRepository};
use saldo_shared::types::{AccountId, CompanyId};

/// Creates the journal entry routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/companies/{company_id}/journal-entries/validate",
            post(validate_entry),
        )
        .route(
            "/companies/{company_id}/journal-entries/auto-balance",
            post(auto_balance_entry),
        )
        .route("/companies/{company_id}/journal-entries", post(post_entry))
}

/// One journal line in a request body.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineBody {
    /// Account reference (may be absent on draft lines).
    pub account_id: Option<Uuid>,
    /// Debit amount; defaults to zero.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount; defaults to zero.
    #[serde(default)]
    pub credit: Decimal,
    /// Optional line memo.
    pub memo: Option<String>,
}

impl LineBody {
    fn into_domain(self) -> JournalLine {
        JournalLine {
            account_id: self.account_id.map(AccountId::from_uuid),
            debit: self.debit,
            credit: self.credit,
            memo: self.memo,
        }
    }

    fn from_domain(line: JournalLine) -> Self {
        Self {
            account_id: line.account_id.map(AccountId::into_inner),
            debit: line.debit,
            credit: line.credit,
            memo: line.memo,
        }
    }
}

/// Request body for validate and auto-balance.
#[derive(Debug, Deserialize)]
pub struct LinesRequest {
    /// The draft lines.
    pub lines: Vec<LineBody>,
}

/// Request body for posting an entry.
#[derive(Debug, Deserialize)]
pub struct PostEntryRequest {
    /// Economic date of the entry.
    pub entry_date: NaiveDate,
    /// Ledger date; determines the accounting period.
    pub posting_date: NaiveDate,
    /// Entry description.
    pub description: String,
    /// Optional reference number.
    pub reference: Option<String>,
    /// Optional memo.
    pub memo: Option<String>,
    /// The journal lines.
    pub lines: Vec<LineBody>,
}

/// POST `/companies/{company_id}/journal-entries/validate` - Balance verdict.
///
/// Never fails: any input yields totals and a signed difference.
async fn validate_entry(
    Path(_company_id): Path<Uuid>,
    Json(payload): Json<LinesRequest>,
) -> impl IntoResponse {
    let lines: Vec<JournalLine> = payload.lines.into_iter().map(LineBody::into_domain).collect();
    let totals = validate_lines(&lines);

    (
        StatusCode::OK,
        Json(json!({
            "balanced": totals.balanced,
            "total_debit": totals.total_debit,
            "total_credit": totals.total_credit,
            "difference": totals.difference
        })),
    )
}

/// POST `/companies/{company_id}/journal-entries/auto-balance` - Patch lines.
async fn auto_balance_entry(
    Path(_company_id): Path<Uuid>,
    Json(payload): Json<LinesRequest>,
) -> impl IntoResponse {
    let lines: Vec<JournalLine> = payload.lines.into_iter().map(LineBody::into_domain).collect();

    match auto_balance(lines) {
        Ok(patched) => {
            let lines: Vec<LineBody> = patched.into_iter().map(LineBody::from_domain).collect();
            (StatusCode::OK, Json(json!({ "lines": lines }))).into_response()
        }
        Err(err) => ledger_error_response(&err),
    }
}

/// POST `/companies/{company_id}/journal-entries` - Post an entry.
async fn post_entry(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(payload): Json<PostEntryRequest>,
) -> impl IntoResponse {
    let repo = JournalRepository::new((*state.db).clone());

    let input = JournalEntryInput {
        company_id: CompanyId::from_uuid(company_id),
        entry_date: payload.entry_date,
        posting_date: payload.posting_date,
        description: payload.description,
        reference: payload.reference,
        memo: payload.memo,
        lines: payload
            .lines
            .into_iter()
            .map(LineBody::into_domain)
            .collect(),
        source: EntrySource::Manual,
    };

    match repo.post_entry(input).await {
        Ok(posted) => {
            info!(
                company_id = %company_id,
                entry_id = %posted.entry.id,
                period_id = %posted.entry.period_id,
                "Journal entry posted"
            );
            (
                StatusCode::CREATED,
                Json(json!({ "entry_id": posted.entry.id })),
            )
                .into_response()
        }
        Err(JournalError::Ledger(err)) => ledger_error_response(&err),
        Err(JournalError::Database(err)) => {
            error!(error = %err, "Failed to post journal entry");
            internal_error_response()
        }
    }
}

/// Maps a `LedgerError` to its API response.
fn ledger_error_response(err: &LedgerError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = match err {
        LedgerError::Unbalanced { difference, .. } => json!({
            "error": err.error_code().to_lowercase(),
            "message": err.to_string(),
            "difference": difference
        }),
        _ => json!({
            "error": err.error_code().to_lowercase(),
            "message": err.to_string()
        }),
    };
    (status, Json(body)).into_response()
}
