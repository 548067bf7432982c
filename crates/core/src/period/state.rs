//! Stateless period lifecycle transition service.
//!
//! The service validates transitions against the current status; the
//! database layer applies the resulting status with atomic conditional
//! updates so concurrent callers cannot both succeed.

use super::error::PeriodError;
use super::types::PeriodStatus;

/// Stateless service for period lifecycle transitions.
pub struct PeriodService;

impl PeriodService {
    /// Begin closing a period: freezes ordinary postings.
    ///
    /// Legal only from `Open`; the period moves to `Locked`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the period is not open.
    pub fn start_close(current: PeriodStatus) -> Result<PeriodStatus, PeriodError> {
        if current.can_transition(PeriodStatus::Locked) {
            Ok(PeriodStatus::Locked)
        } else {
            Err(PeriodError::InvalidTransition {
                from: current,
                to: PeriodStatus::Locked,
            })
        }
    }

    /// Finalize a period close.
    ///
    /// Legal only from `Locked` and only with a fully completed checklist.
    /// The period finalizes through `Closing` to `Closed` without skipping
    /// a state; `Closed` is terminal.
    ///
    /// # Errors
    ///
    /// Returns `ChecklistIncomplete` when items remain open, or
    /// `InvalidTransition` if the period is not locked.
    pub fn complete_close(
        current: PeriodStatus,
        incomplete_items: usize,
    ) -> Result<PeriodStatus, PeriodError> {
        if current != PeriodStatus::Locked {
            return Err(PeriodError::InvalidTransition {
                from: current,
                to: PeriodStatus::Closed,
            });
        }

        if incomplete_items > 0 {
            return Err(PeriodError::ChecklistIncomplete {
                missing_count: incomplete_items,
            });
        }

        Ok(PeriodStatus::Closed)
    }

    /// Validate that the period's checklist may still be mutated.
    ///
    /// Toggling is legal at any status except `Closed`.
    ///
    /// # Errors
    ///
    /// Returns `PeriodClosed` for a closed period.
    pub fn validate_checklist_mutable(current: PeriodStatus) -> Result<(), PeriodError> {
        if current.is_terminal() {
            return Err(PeriodError::PeriodClosed);
        }
        Ok(())
    }
}
