//! Reconciliation repository: candidate lookup and the atomic match commit.
//!
//! Committing a match is a conditional update (`WHERE status =
//! 'unreconciled'`) plus the match insert in one database transaction, so
//! the status flip and the match row appear together or not at all.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use saldo_core::reconciliation::{
    BankTransaction, Payment, ReconciliationError, ReconciliationMatch, find_candidates,
    validate_reconcilable,
};
use saldo_shared::types::{
    BankAccountId, BankTransactionId, CompanyId, PaymentId, ReconciliationMatchId,
};

use crate::entities::{
    bank_transactions, payments, reconciliation_matches,
    sea_orm_active_enums::BankTransactionStatus,
};

/// Error types for reconciliation operations.
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationStoreError {
    /// Matching rule violation from the core taxonomy.
    #[error(transparent)]
    Reconciliation(#[from] ReconciliationError),

    /// Referenced payment not found in the caller's company scope.
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Reconciliation repository.
#[derive(Debug, Clone)]
pub struct ReconciliationRepository {
    db: DatabaseConnection,
}

impl ReconciliationRepository {
    /// Creates a new reconciliation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Proposes candidate payments for a bank transaction.
    ///
    /// Candidates are within one cent of the transaction's absolute
    /// amount, ordered by amount closeness then date proximity.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` for an unknown transaction, or a
    /// database error.
    pub async fn find_candidates(
        &self,
        company_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Vec<Payment>, ReconciliationStoreError> {
        let transaction = self
            .load_transaction(company_id, transaction_id)
            .await?
            .ok_or(ReconciliationError::TransactionNotFound(
                BankTransactionId::from_uuid(transaction_id),
            ))?;

        let payment_rows = payments::Entity::find()
            .filter(payments::Column::CompanyId.eq(company_id))
            .all(&self.db)
            .await?;

        let domain_payments: Vec<Payment> = payment_rows.iter().map(payment_to_domain).collect();
        let domain_transaction = transaction_to_domain(&transaction);

        Ok(find_candidates(&domain_transaction, &domain_payments))
    }

    /// Reconciles a bank transaction, optionally against a payment.
    ///
    /// A transaction may be reconciled with no payment counterpart (e.g. a
    /// bank fee). Both effects - the status flip and the match row - are
    /// committed together or neither is; a failed attempt leaves the
    /// transaction `unreconciled` and is safe to retry.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyReconciled` when this or a concurrent call already
    /// reconciled the transaction, `TransactionNotFound` / payment
    /// not-found for unknown references, or a database error.
    pub async fn reconcile(
        &self,
        company_id: Uuid,
        transaction_id: Uuid,
        payment_id: Option<Uuid>,
    ) -> Result<ReconciliationMatch, ReconciliationStoreError> {
        let transaction = self
            .load_transaction(company_id, transaction_id)
            .await?
            .ok_or(ReconciliationError::TransactionNotFound(
                BankTransactionId::from_uuid(transaction_id),
            ))?;

        validate_reconcilable(&transaction_to_domain(&transaction))?;

        if let Some(payment_id) = payment_id {
            payments::Entity::find_by_id(payment_id)
                .filter(payments::Column::CompanyId.eq(company_id))
                .one(&self.db)
                .await?
                .ok_or(ReconciliationStoreError::PaymentNotFound(payment_id))?;
        }

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now();

        // The conditional flip is the concurrency gate: of two racing
        // calls, exactly one observes rows_affected == 1.
        let flip = bank_transactions::Entity::update_many()
            .col_expr(
                bank_transactions::Column::Status,
                Expr::value(BankTransactionStatus::Reconciled),
            )
            .col_expr(bank_transactions::Column::UpdatedAt, Expr::value(now))
            .filter(bank_transactions::Column::Id.eq(transaction_id))
            .filter(bank_transactions::Column::Status.eq(BankTransactionStatus::Unreconciled))
            .exec(&txn)
            .await?;

        if flip.rows_affected == 0 {
            txn.rollback().await.ok();
            return Err(ReconciliationError::AlreadyReconciled(
                BankTransactionId::from_uuid(transaction_id),
            )
            .into());
        }

        let matched = reconciliation_matches::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_id: Set(transaction_id),
            payment_id: Set(payment_id),
            created_at: Set(now.into()),
        };
        let matched = matched.insert(&txn).await?;

        txn.commit().await?;

        info!(
            company_id = %company_id,
            transaction_id = %transaction_id,
            payment_id = ?payment_id,
            "Bank transaction reconciled"
        );

        Ok(match_to_domain(&matched))
    }

    async fn load_transaction(
        &self,
        company_id: Uuid,
        transaction_id: Uuid,
    ) -> Result<Option<bank_transactions::Model>, ReconciliationStoreError> {
        let transaction = bank_transactions::Entity::find_by_id(transaction_id)
            .filter(bank_transactions::Column::CompanyId.eq(company_id))
            .one(&self.db)
            .await?;
        Ok(transaction)
    }
}

/// Converts a bank transaction row into the core domain type.
#[must_use]
pub fn transaction_to_domain(model: &bank_transactions::Model) -> BankTransaction {
    BankTransaction {
        id: BankTransactionId::from_uuid(model.id),
        company_id: CompanyId::from_uuid(model.company_id),
        bank_account_id: BankAccountId::from_uuid(model.bank_account_id),
        amount: model.amount,
        transaction_type: model.transaction_type.clone().into(),
        transaction_date: model.transaction_date,
        status: model.status.clone().into(),
    }
}

/// Converts a match row into the core domain type.
#[must_use]
pub fn match_to_domain(model: &reconciliation_matches::Model) -> ReconciliationMatch {
    ReconciliationMatch {
        id: ReconciliationMatchId::from_uuid(model.id),
        transaction_id: BankTransactionId::from_uuid(model.transaction_id),
        payment_id: model.payment_id.map(PaymentId::from_uuid),
        created_at: model.created_at.into(),
    }
}

/// Converts a payment row into the core domain type.
#[must_use]
pub fn payment_to_domain(model: &payments::Model) -> Payment {
    Payment {
        id: PaymentId::from_uuid(model.id),
        company_id: CompanyId::from_uuid(model.company_id),
        amount: model.amount,
        method: model.method.clone(),
        reference: model.reference.clone(),
        received_on: model.received_on,
    }
}
