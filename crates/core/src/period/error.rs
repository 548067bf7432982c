//! Period lifecycle error types.

use thiserror::Error;

use super::types::PeriodStatus;

/// Errors that can occur during period lifecycle operations.
#[derive(Debug, Error)]
pub enum PeriodError {
    /// Requested transition is not in the lifecycle table.
    #[error("Invalid period transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: PeriodStatus,
        /// Target status.
        to: PeriodStatus,
    },

    /// Close cannot complete while checklist items remain open.
    #[error("Close checklist incomplete: {missing_count} item(s) not done")]
    ChecklistIncomplete {
        /// Number of items still incomplete.
        missing_count: usize,
    },

    /// A closed period's checklist is frozen for audit.
    #[error("Period is closed; its checklist is frozen")]
    PeriodClosed,
}

impl PeriodError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ChecklistIncomplete { .. } => "CHECKLIST_INCOMPLETE",
            Self::PeriodClosed => "PERIOD_CLOSED",
        }
    }

    /// Returns the HTTP status code for this error.
    ///
    /// All period errors are state conflicts: the precondition no longer
    /// holds, typically because a concurrent actor moved first.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } | Self::ChecklistIncomplete { .. } | Self::PeriodClosed => {
                409
            }
        }
    }
}
