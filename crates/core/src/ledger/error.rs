//! Ledger error types for validation and posting-gate errors.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use saldo_shared::types::AccountId;
use thiserror::Error;

use crate::period::PeriodStatus;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Entry must have at least 2 lines.
    #[error("Entry must have at least 2 lines")]
    InsufficientLines,

    /// Entry is not balanced (debits != credits within tolerance).
    #[error("Entry is not balanced. Debit: {debit}, Credit: {credit}, Difference: {difference}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
        /// Signed difference (debits minus credits).
        difference: Decimal,
    },

    /// Line amounts cannot be negative.
    #[error("Line {index} has a negative amount")]
    NegativeAmount {
        /// Zero-based index of the offending line.
        index: usize,
    },

    /// A line must carry either a debit or a credit, not both.
    #[error("Line {index} carries both a debit and a credit")]
    LineOnBothSides {
        /// Zero-based index of the offending line.
        index: usize,
    },

    /// A postable line must carry an amount on one side.
    #[error("Line {index} has no amount on either side")]
    ZeroAmount {
        /// Zero-based index of the offending line.
        index: usize,
    },

    /// A postable line must reference an account.
    #[error("Line {index} is missing an account reference")]
    MissingAccount {
        /// Zero-based index of the offending line.
        index: usize,
    },

    /// Referenced account is unknown to the chart of accounts.
    #[error("Account not found in chart of accounts: {0}")]
    UnknownAccount(AccountId),

    /// No empty line available for auto-balancing.
    #[error("No eligible empty line to receive the balancing amount")]
    NoEligibleLine,

    // ========== Period Gate Errors ==========
    /// No accounting period covers the posting date.
    #[error("No accounting period found for date {0}")]
    NoPeriodForDate(NaiveDate),

    /// Period does not accept user postings.
    #[error("Period is {0}, new postings require an open period")]
    PeriodNotOpen(PeriodStatus),

    /// Period is outside the close window for automated postings.
    #[error("Period is {0}, close-run postings require a locked or closing period")]
    PeriodNotInCloseWindow(PeriodStatus),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines => "INSUFFICIENT_LINES",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::NegativeAmount { .. } => "NEGATIVE_AMOUNT",
            Self::LineOnBothSides { .. } => "LINE_ON_BOTH_SIDES",
            Self::ZeroAmount { .. } => "ZERO_AMOUNT",
            Self::MissingAccount { .. } => "MISSING_ACCOUNT",
            Self::UnknownAccount(_) => "UNKNOWN_ACCOUNT",
            Self::NoEligibleLine => "NO_ELIGIBLE_LINE",
            Self::NoPeriodForDate(_) => "NO_PERIOD_FOR_DATE",
            Self::PeriodNotOpen(_) => "PERIOD_NOT_OPEN",
            Self::PeriodNotInCloseWindow(_) => "PERIOD_NOT_IN_CLOSE_WINDOW",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Validation errors are caller mistakes (400); period-gate errors are
    /// state conflicts (409) so UIs can tell "someone already locked this"
    /// from "you made a mistake".
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InsufficientLines
            | Self::Unbalanced { .. }
            | Self::NegativeAmount { .. }
            | Self::LineOnBothSides { .. }
            | Self::ZeroAmount { .. }
            | Self::MissingAccount { .. }
            | Self::UnknownAccount(_)
            | Self::NoEligibleLine => 400,

            Self::NoPeriodForDate(_) => 404,

            Self::PeriodNotOpen(_) | Self::PeriodNotInCloseWindow(_) => 409,
        }
    }
}
