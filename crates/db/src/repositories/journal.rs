//! Journal repository for posting validated entries.
//!
//! Every entry, manual or close-run sourced, passes the core posting gate
//! here before the header and lines are inserted in one database
//! transaction.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use std::collections::HashSet;
use uuid::Uuid;

use saldo_core::ledger::{JournalEntryInput, LedgerError, validate_for_posting};
use saldo_shared::types::AccountId;

use crate::entities::{accounts, journal_entries, journal_lines, periods};
use crate::repositories::period::to_domain;

/// Error types for journal operations.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    /// Validation or posting-gate failure from the core validator.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// A persisted journal entry with its lines.
#[derive(Debug, Clone)]
pub struct PostedEntry {
    /// Entry header.
    pub entry: journal_entries::Model,
    /// Entry lines in posting order.
    pub lines: Vec<journal_lines::Model>,
}

/// Journal repository.
#[derive(Debug, Clone)]
pub struct JournalRepository {
    db: DatabaseConnection,
}

impl JournalRepository {
    /// Creates a new journal repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a journal entry.
    ///
    /// Resolves the period from the posting date, runs the posting gate
    /// (balance, line shape, account existence, period status), then
    /// inserts header and lines atomically.
    ///
    /// # Errors
    ///
    /// Returns a `LedgerError` for validation and period-gate failures, or
    /// a database error.
    pub async fn post_entry(&self, input: JournalEntryInput) -> Result<PostedEntry, JournalError> {
        let period = self
            .find_posting_period(&input)
            .await?
            .ok_or(LedgerError::NoPeriodForDate(input.posting_date))?;

        let txn = self.db.begin().await?;
        let posted = self.insert_validated(&txn, &input, &period).await?;
        txn.commit().await?;

        Ok(posted)
    }

    /// Finds the period covering the entry's posting date.
    async fn find_posting_period(
        &self,
        input: &JournalEntryInput,
    ) -> Result<Option<periods::Model>, JournalError> {
        let period = periods::Entity::find()
            .filter(periods::Column::CompanyId.eq(input.company_id.into_inner()))
            .filter(periods::Column::StartDate.lte(input.posting_date))
            .filter(periods::Column::EndDate.gte(input.posting_date))
            .one(&self.db)
            .await?;
        Ok(period)
    }

    /// Validates and inserts an entry on an existing connection.
    ///
    /// Used by the close-run executor so its postings share the run's
    /// database transaction.
    pub(crate) async fn insert_validated<C: ConnectionTrait>(
        &self,
        conn: &C,
        input: &JournalEntryInput,
        period: &periods::Model,
    ) -> Result<PostedEntry, JournalError> {
        let known_accounts = self.load_known_accounts(conn, input).await?;
        let domain_period = to_domain(period);

        validate_for_posting(input, domain_period.status, |account_id: AccountId| {
            known_accounts.contains(&account_id.into_inner())
        })?;

        let now = Utc::now().into();
        let entry_id = Uuid::now_v7();

        let entry = journal_entries::ActiveModel {
            id: Set(entry_id),
            company_id: Set(input.company_id.into_inner()),
            period_id: Set(period.id),
            entry_date: Set(input.entry_date),
            posting_date: Set(input.posting_date),
            description: Set(input.description.clone()),
            reference: Set(input.reference.clone()),
            memo: Set(input.memo.clone()),
            source: Set(input.source.into()),
            created_at: Set(now),
        };
        let entry = entry.insert(conn).await?;

        let mut lines = Vec::with_capacity(input.lines.len());
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        for (index, line) in input.lines.iter().enumerate() {
            // The gate guarantees every line has an account by now
            let account_id = line
                .account_id
                .ok_or(LedgerError::MissingAccount { index })?;

            let model = journal_lines::ActiveModel {
                id: Set(Uuid::now_v7()),
                entry_id: Set(entry_id),
                account_id: Set(account_id.into_inner()),
                debit: Set(line.debit),
                credit: Set(line.credit),
                memo: Set(line.memo.clone()),
                line_number: Set(index as i16),
                created_at: Set(now),
            };
            lines.push(model.insert(conn).await?);
        }

        Ok(PostedEntry { entry, lines })
    }

    /// Loads the company's account ids referenced by the entry.
    async fn load_known_accounts<C: ConnectionTrait>(
        &self,
        conn: &C,
        input: &JournalEntryInput,
    ) -> Result<HashSet<Uuid>, JournalError> {
        let referenced: Vec<Uuid> = input
            .lines
            .iter()
            .filter_map(|l| l.account_id.map(AccountId::into_inner))
            .collect();

        if referenced.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = accounts::Entity::find()
            .filter(accounts::Column::CompanyId.eq(input.company_id.into_inner()))
            .filter(accounts::Column::Id.is_in(referenced))
            .all(conn)
            .await?;

        Ok(rows.into_iter().map(|a| a.id).collect())
    }
}
