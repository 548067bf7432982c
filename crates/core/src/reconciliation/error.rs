//! Reconciliation error types.

use saldo_shared::types::BankTransactionId;
use thiserror::Error;

/// Errors that can occur during reconciliation.
#[derive(Debug, Error)]
pub enum ReconciliationError {
    /// The transaction was already reconciled by this or a concurrent call.
    #[error("Bank transaction already reconciled: {0}")]
    AlreadyReconciled(BankTransactionId),

    /// The transaction does not exist in the caller's company scope.
    #[error("Bank transaction not found: {0}")]
    TransactionNotFound(BankTransactionId),
}

impl ReconciliationError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyReconciled(_) => "ALREADY_RECONCILED",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::AlreadyReconciled(_) => 409,
            Self::TransactionNotFound(_) => 404,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_statuses() {
        let id = BankTransactionId::new();
        assert_eq!(
            ReconciliationError::AlreadyReconciled(id).error_code(),
            "ALREADY_RECONCILED"
        );
        assert_eq!(ReconciliationError::AlreadyReconciled(id).http_status_code(), 409);
        assert_eq!(
            ReconciliationError::TransactionNotFound(id).error_code(),
            "TRANSACTION_NOT_FOUND"
        );
        assert_eq!(
            ReconciliationError::TransactionNotFound(id).http_status_code(),
            404
        );
    }
}
