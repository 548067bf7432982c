//! Close-run executor and append-only run log.
//!
//! Guarantees at-most-one successful run per (company, period, run type):
//! a prior run short-circuits with `AlreadyRun`, and the UNIQUE index on
//! the run log backstops concurrent duplicates. Procedure postings share
//! the run row's database transaction, so a loser's postings roll back
//! with its run row.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use saldo_core::close::{
    AllocationParams, CloseRunError, FxRevalParams, RecurringTemplate, RunOutcome, RunType,
    TemplateLine, build_allocation_entry, build_revaluation_entry, due_templates,
    instantiate_template,
};
use saldo_core::period::Period;
use saldo_shared::types::{CloseRunId, CompanyId, RecurringTemplateId};

use crate::entities::{close_runs, periods, recurring_templates};
use crate::repositories::journal::{JournalError, JournalRepository};
use crate::repositories::period::to_domain;

/// Error types for close-run operations.
#[derive(Debug, thiserror::Error)]
pub enum CloseRunStoreError {
    /// Precondition or idempotency failure from the core taxonomy.
    #[error(transparent)]
    Run(#[from] CloseRunError),

    /// Period not found in the caller's company scope.
    #[error("Period not found: {0}")]
    PeriodNotFound(Uuid),

    /// Run payload failed to serialize.
    #[error("Payload serialization error: {0}")]
    Payload(#[from] serde_json::Error),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Close-run repository and executor.
#[derive(Debug, Clone)]
pub struct CloseRunRepository {
    db: DatabaseConnection,
}

impl CloseRunRepository {
    /// Creates a new close-run repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Executes a close procedure against a locked/closing period.
    ///
    /// Individual posting failures are captured in the run's payload and
    /// do not abort the batch; exactly one run row is appended on
    /// completion.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRun` when a run for this (company, period, run
    /// type) already exists, `PeriodNotLocked` outside the close window,
    /// parameter errors for malformed params, or a database error.
    pub async fn execute(
        &self,
        company_id: Uuid,
        period_id: Uuid,
        run_type: RunType,
        params: serde_json::Value,
    ) -> Result<close_runs::Model, CloseRunStoreError> {
        let period = periods::Entity::find_by_id(period_id)
            .filter(periods::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?
            .ok_or(CloseRunStoreError::PeriodNotFound(period_id))?;

        let domain_period = to_domain(&period);
        if !domain_period.status.in_close_window() {
            return Err(CloseRunError::PeriodNotLocked {
                status: domain_period.status,
            }
            .into());
        }

        if let Some(existing) = self.find_run(company_id, period_id, run_type).await? {
            return Err(CloseRunError::AlreadyRun {
                run_id: CloseRunId::from_uuid(existing.id),
            }
            .into());
        }

        let txn = self.db.begin().await?;
        let journal = JournalRepository::new(self.db.clone());

        let outcome = match run_type {
            RunType::Recurring => {
                self.run_recurring(&txn, &journal, &period, &domain_period)
                    .await?
            }
            RunType::Allocations => {
                let params: AllocationParams = serde_json::from_value(params)
                    .map_err(|e| CloseRunError::InvalidParams(e.to_string()))?;
                self.run_allocations(&txn, &journal, &period, &domain_period, &params)
                    .await?
            }
            RunType::FxReval => {
                let params: FxRevalParams = serde_json::from_value(params)
                    .map_err(|e| CloseRunError::InvalidParams(e.to_string()))?;
                self.run_fx_reval(&txn, &journal, &period, &domain_period, &params)
                    .await?
            }
        };

        let run = close_runs::ActiveModel {
            id: Set(Uuid::now_v7()),
            company_id: Set(company_id),
            period_id: Set(period_id),
            run_type: Set(run_type.into()),
            payload: Set(serde_json::to_value(&outcome)?),
            executed_at: Set(chrono::Utc::now().into()),
        };

        match run.insert(&txn).await {
            Ok(model) => {
                txn.commit().await?;
                info!(
                    company_id = %company_id,
                    period_id = %period_id,
                    run_type = %run_type,
                    posted = outcome.posted_count,
                    errors = outcome.errors.len(),
                    "Close run executed"
                );
                Ok(model)
            }
            Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                // Concurrent duplicate: the winner's row is committed, our
                // postings roll back with the transaction.
                txn.rollback().await.ok();
                warn!(
                    company_id = %company_id,
                    period_id = %period_id,
                    run_type = %run_type,
                    "Concurrent close run lost the idempotency race"
                );
                let existing = self
                    .find_run(company_id, period_id, run_type)
                    .await?
                    .ok_or(CloseRunStoreError::Database(err))?;
                Err(CloseRunError::AlreadyRun {
                    run_id: CloseRunId::from_uuid(existing.id),
                }
                .into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Lists the period's runs in execution order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_runs(
        &self,
        company_id: Uuid,
        period_id: Uuid,
    ) -> Result<Vec<close_runs::Model>, CloseRunStoreError> {
        let runs = close_runs::Entity::find()
            .filter(close_runs::Column::CompanyId.eq(company_id))
            .filter(close_runs::Column::PeriodId.eq(period_id))
            .order_by_asc(close_runs::Column::ExecutedAt)
            .all(&self.db)
            .await?;
        Ok(runs)
    }

    /// Finds a specific run, if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_run(
        &self,
        company_id: Uuid,
        period_id: Uuid,
        run_type: RunType,
    ) -> Result<Option<close_runs::Model>, CloseRunStoreError> {
        let run = close_runs::Entity::find()
            .filter(close_runs::Column::CompanyId.eq(company_id))
            .filter(close_runs::Column::PeriodId.eq(period_id))
            .filter(
                close_runs::Column::RunType
                    .eq(crate::entities::sea_orm_active_enums::CloseRunType::from(run_type)),
            )
            .one(&self.db)
            .await?;
        Ok(run)
    }

    /// Posts one concrete entry per active recurring template.
    async fn run_recurring(
        &self,
        txn: &DatabaseTransaction,
        journal: &JournalRepository,
        period: &periods::Model,
        domain_period: &Period,
    ) -> Result<RunOutcome, CloseRunStoreError> {
        let templates = self.load_templates(period.company_id).await?;
        let mut outcome = RunOutcome::default();

        for template in due_templates(&templates) {
            let entry = instantiate_template(template, domain_period);
            match journal.insert_validated(txn, &entry, period).await {
                Ok(_) => outcome.record_posted(),
                Err(JournalError::Ledger(err)) => {
                    outcome.record_error(template.name.clone(), err.error_code(), err.to_string());
                }
                Err(JournalError::Database(err)) => return Err(err.into()),
            }
        }

        Ok(outcome)
    }

    /// Posts the period's cost allocation entry.
    async fn run_allocations(
        &self,
        txn: &DatabaseTransaction,
        journal: &JournalRepository,
        period: &periods::Model,
        domain_period: &Period,
        params: &AllocationParams,
    ) -> Result<RunOutcome, CloseRunStoreError> {
        let entry = build_allocation_entry(params, domain_period)?;
        let mut outcome = RunOutcome::default();

        match journal.insert_validated(txn, &entry, period).await {
            Ok(_) => outcome.record_posted(),
            Err(JournalError::Ledger(err)) => {
                outcome.record_error("allocation", err.error_code(), err.to_string());
            }
            Err(JournalError::Database(err)) => return Err(err.into()),
        }

        Ok(outcome)
    }

    /// Posts the period-end FX revaluation entry, if anything moved.
    async fn run_fx_reval(
        &self,
        txn: &DatabaseTransaction,
        journal: &JournalRepository,
        period: &periods::Model,
        domain_period: &Period,
        params: &FxRevalParams,
    ) -> Result<RunOutcome, CloseRunStoreError> {
        let mut outcome = RunOutcome::default();

        let Some(entry) = build_revaluation_entry(params, domain_period) else {
            return Ok(outcome);
        };

        match journal.insert_validated(txn, &entry, period).await {
            Ok(_) => outcome.record_posted(),
            Err(JournalError::Ledger(err)) => {
                outcome.record_error("fx_reval", err.error_code(), err.to_string());
            }
            Err(JournalError::Database(err)) => return Err(err.into()),
        }

        Ok(outcome)
    }

    /// Loads and deserializes the company's recurring templates.
    async fn load_templates(
        &self,
        company_id: Uuid,
    ) -> Result<Vec<RecurringTemplate>, CloseRunStoreError> {
        let rows = recurring_templates::Entity::find()
            .filter(recurring_templates::Column::CompanyId.eq(company_id))
            .order_by_asc(recurring_templates::Column::Name)
            .all(&self.db)
            .await?;

        let mut templates = Vec::with_capacity(rows.len());
        for row in rows {
            let lines: Vec<TemplateLine> = match serde_json::from_value(row.lines.clone()) {
                Ok(lines) => lines,
                Err(err) => {
                    // A malformed template must not poison the batch; it
                    // surfaces as inactive with a warning.
                    warn!(template = %row.name, error = %err, "Skipping malformed recurring template");
                    continue;
                }
            };
            templates.push(RecurringTemplate {
                id: RecurringTemplateId::from_uuid(row.id),
                company_id: CompanyId::from_uuid(row.company_id),
                name: row.name,
                memo: row.memo,
                active: row.active,
                lines,
            });
        }

        Ok(templates)
    }
}
