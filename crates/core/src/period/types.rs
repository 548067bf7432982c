//! Accounting period domain types.

use chrono::{DateTime, NaiveDate, Utc};
use saldo_shared::types::{ChecklistItemId, CompanyId, PeriodId};
use serde::{Deserialize, Serialize};

/// Status of an accounting period.
///
/// The lifecycle is linear: `Open → Locked → Closing → Closed`. No
/// transition skips a state and none reverses; an accidental lock must be
/// undone by an explicit administrative action outside this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    /// Period accepts ordinary user postings.
    Open,
    /// Ordinary postings are frozen; close preparation underway.
    Locked,
    /// Close is finalizing; only close-run postings remain valid.
    Closing,
    /// Period is immutable (terminal).
    Closed,
}

impl PeriodStatus {
    /// Returns true if ordinary user postings are accepted.
    #[must_use]
    pub fn allows_user_posting(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true if automated close-run postings are accepted.
    #[must_use]
    pub fn in_close_window(self) -> bool {
        matches!(self, Self::Locked | Self::Closing)
    }

    /// Returns true if the period can never change again.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns true if `self → to` is a legal transition.
    ///
    /// The table is exhaustive: only the three forward steps are legal.
    #[must_use]
    pub fn can_transition(self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Open, Self::Locked)
                | (Self::Locked, Self::Closing)
                | (Self::Closing, Self::Closed)
        )
    }
}

impl std::fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Locked => write!(f, "locked"),
            Self::Closing => write!(f, "closing"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// An accounting period for one company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Period {
    /// Unique identifier.
    pub id: PeriodId,
    /// Company this period belongs to.
    pub company_id: CompanyId,
    /// Period label (e.g., "2024-01").
    pub label: String,
    /// First day of the period.
    pub start_date: NaiveDate,
    /// Last day of the period.
    pub end_date: NaiveDate,
    /// Current status.
    pub status: PeriodStatus,
    /// When the period reached `Closed`, if it has.
    pub closed_at: Option<DateTime<Utc>>,
}

impl Period {
    /// Returns true if the given date falls within this period.
    #[must_use]
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

/// A close-preparation task owned by a period.
///
/// Every item must be completed before the period may leave `Locked`.
/// The checklist freezes for audit once the period is `Closed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    /// Unique identifier.
    pub id: ChecklistItemId,
    /// Period this item belongs to.
    pub period_id: PeriodId,
    /// Task title (e.g., "Reconcile bank accounts").
    pub title: String,
    /// Whether the task has been marked done.
    pub completed: bool,
    /// Display order within the checklist.
    pub sort_order: i16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_posting_windows() {
        assert!(PeriodStatus::Open.allows_user_posting());
        assert!(!PeriodStatus::Locked.allows_user_posting());
        assert!(!PeriodStatus::Closing.allows_user_posting());
        assert!(!PeriodStatus::Closed.allows_user_posting());

        assert!(!PeriodStatus::Open.in_close_window());
        assert!(PeriodStatus::Locked.in_close_window());
        assert!(PeriodStatus::Closing.in_close_window());
        assert!(!PeriodStatus::Closed.in_close_window());
    }

    #[test]
    fn test_status_terminal() {
        assert!(PeriodStatus::Closed.is_terminal());
        assert!(!PeriodStatus::Open.is_terminal());
        assert!(!PeriodStatus::Locked.is_terminal());
        assert!(!PeriodStatus::Closing.is_terminal());
    }

    #[test]
    fn test_transition_table_forward_steps() {
        assert!(PeriodStatus::Open.can_transition(PeriodStatus::Locked));
        assert!(PeriodStatus::Locked.can_transition(PeriodStatus::Closing));
        assert!(PeriodStatus::Closing.can_transition(PeriodStatus::Closed));
    }

    #[test]
    fn test_transition_table_rejects_skips_and_reversals() {
        assert!(!PeriodStatus::Open.can_transition(PeriodStatus::Closing));
        assert!(!PeriodStatus::Open.can_transition(PeriodStatus::Closed));
        assert!(!PeriodStatus::Locked.can_transition(PeriodStatus::Closed));
        assert!(!PeriodStatus::Locked.can_transition(PeriodStatus::Open));
        assert!(!PeriodStatus::Closed.can_transition(PeriodStatus::Open));
        assert!(!PeriodStatus::Closed.can_transition(PeriodStatus::Locked));
    }

    #[test]
    fn test_period_contains_date() {
        let period = Period {
            id: PeriodId::new(),
            company_id: CompanyId::new(),
            label: "2024-01".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            status: PeriodStatus::Open,
            closed_at: None,
        };

        assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
        assert!(!period.contains_date(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
        assert!(!period.contains_date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
    }
}
