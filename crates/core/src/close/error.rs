//! Close-run error types.

use rust_decimal::Decimal;
use saldo_shared::types::CloseRunId;
use thiserror::Error;

use crate::period::PeriodStatus;

/// Errors that can occur while executing a close run.
#[derive(Debug, Error)]
pub enum CloseRunError {
    /// A successful run already exists for this (company, period, run type).
    ///
    /// Carries the prior run's identity so callers can show "already ran"
    /// rather than "you made a mistake".
    #[error("Close run already executed: {run_id}")]
    AlreadyRun {
        /// The existing run.
        run_id: CloseRunId,
    },

    /// The period is outside the close window.
    #[error("Period is {status}, close runs require a locked or closing period")]
    PeriodNotLocked {
        /// The period's current status.
        status: PeriodStatus,
    },

    /// Procedure parameters did not deserialize or are malformed.
    #[error("Invalid close-run parameters: {0}")]
    InvalidParams(String),

    /// Allocation basis has no targets.
    #[error("Allocation basis has no targets")]
    EmptyAllocationBasis,

    /// Allocation percentages must sum to 100.
    #[error("Allocation percentages sum to {total}, expected 100")]
    BasisNotOneHundred {
        /// Actual sum of the supplied percentages.
        total: Decimal,
    },
}

impl CloseRunError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyRun { .. } => "ALREADY_RUN",
            Self::PeriodNotLocked { .. } => "PERIOD_NOT_LOCKED",
            Self::InvalidParams(_) => "INVALID_PARAMS",
            Self::EmptyAllocationBasis => "EMPTY_ALLOCATION_BASIS",
            Self::BasisNotOneHundred { .. } => "BASIS_NOT_ONE_HUNDRED",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // State conflicts: a concurrent actor or an earlier run got here first.
            Self::AlreadyRun { .. } | Self::PeriodNotLocked { .. } => 409,
            // Caller mistakes.
            Self::InvalidParams(_) | Self::EmptyAllocationBasis | Self::BasisNotOneHundred { .. } => {
                400
            }
        }
    }
}
