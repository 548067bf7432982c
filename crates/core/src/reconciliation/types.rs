//! Reconciliation domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use saldo_shared::types::{
    BankAccountId, BankTransactionId, CompanyId, PaymentId, ReconciliationMatchId,
};
use serde::{Deserialize, Serialize};

/// Reconciliation status of a bank transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankTransactionStatus {
    /// Not yet linked to a payment.
    Unreconciled,
    /// Linked (possibly to no payment, e.g. a bank fee).
    Reconciled,
}

/// Direction of a bank transaction as reported by the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankTransactionType {
    /// Money in.
    Credit,
    /// Money out.
    Debit,
}

/// An externally reported bank transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankTransaction {
    /// Unique identifier.
    pub id: BankTransactionId,
    /// Company scope.
    pub company_id: CompanyId,
    /// Bank account the transaction occurred on.
    pub bank_account_id: BankAccountId,
    /// Signed amount (negative for money out).
    pub amount: Decimal,
    /// Direction as reported by the bank.
    pub transaction_type: BankTransactionType,
    /// Date the transaction occurred.
    pub transaction_date: NaiveDate,
    /// Current reconciliation status.
    pub status: BankTransactionStatus,
}

/// An internally recorded payment (read-only from this core's perspective).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier.
    pub id: PaymentId,
    /// Company scope.
    pub company_id: CompanyId,
    /// Unsigned payment amount.
    pub amount: Decimal,
    /// Payment method (e.g., "bank_transfer", "check").
    pub method: String,
    /// Optional external reference.
    pub reference: Option<String>,
    /// Date the payment was received or issued.
    pub received_on: NaiveDate,
}

/// A committed link between a bank transaction and zero-or-one payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationMatch {
    /// Unique identifier.
    pub id: ReconciliationMatchId,
    /// The reconciled transaction.
    pub transaction_id: BankTransactionId,
    /// The matched payment, if any.
    pub payment_id: Option<PaymentId>,
    /// When the match was committed.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&BankTransactionStatus::Unreconciled).unwrap();
        assert_eq!(json, "\"unreconciled\"");
        let json = serde_json::to_string(&BankTransactionType::Debit).unwrap();
        assert_eq!(json, "\"debit\"");
    }
}
