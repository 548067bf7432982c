//! Ledger domain types for journal entry creation and validation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use saldo_shared::types::{AccountId, CompanyId, amounts_match};
use serde::{Deserialize, Serialize};

/// A single line of a journal entry.
///
/// Exactly one of `debit`/`credit` may be non-zero on a postable line.
/// A line with both sides zero is an empty placeholder that
/// [`auto_balance`](super::validation::auto_balance) may fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    /// Reference into the external chart of accounts. Required for posting.
    pub account_id: Option<AccountId>,
    /// Debit amount (non-negative, 2-digit currency precision).
    pub debit: Decimal,
    /// Credit amount (non-negative, 2-digit currency precision).
    pub credit: Decimal,
    /// Optional memo for this line.
    pub memo: Option<String>,
}

impl JournalLine {
    /// Creates a debit line against an account.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id: Some(account_id),
            debit: amount,
            credit: Decimal::ZERO,
            memo: None,
        }
    }

    /// Creates a credit line against an account.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Decimal) -> Self {
        Self {
            account_id: Some(account_id),
            debit: Decimal::ZERO,
            credit: amount,
            memo: None,
        }
    }

    /// Creates an empty placeholder line (both sides zero, no account).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            account_id: None,
            debit: Decimal::ZERO,
            credit: Decimal::ZERO,
            memo: None,
        }
    }

    /// Attaches a memo to the line.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Returns true if both sides are zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.debit.is_zero() && self.credit.is_zero()
    }
}

/// Where a journal entry originates.
///
/// The posting gate admits user entries only into an `open` period, while
/// close-run entries are valid during the locked/closing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Entered by a user through the entry form.
    Manual,
    /// Produced by an automated close-run procedure.
    CloseRun,
}

/// Input for creating a journal entry.
#[derive(Debug, Clone)]
pub struct JournalEntryInput {
    /// The company this entry belongs to.
    pub company_id: CompanyId,
    /// The economic date of the entry.
    pub entry_date: NaiveDate,
    /// The ledger date; determines the accounting period.
    pub posting_date: NaiveDate,
    /// A description of the entry.
    pub description: String,
    /// Optional reference number (e.g., invoice number).
    pub reference: Option<String>,
    /// Optional memo/notes.
    pub memo: Option<String>,
    /// The journal lines (must have at least 2 to post).
    pub lines: Vec<JournalLine>,
    /// Where this entry originates.
    pub source: EntrySource,
}

/// Balance verdict over a set of journal lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryTotals {
    /// Sum of all debit amounts.
    pub total_debit: Decimal,
    /// Sum of all credit amounts.
    pub total_credit: Decimal,
    /// Signed difference (debits minus credits).
    pub difference: Decimal,
    /// Whether the lines balance within the currency epsilon.
    pub balanced: bool,
}

impl EntryTotals {
    /// Computes totals from debit and credit sums.
    #[must_use]
    pub fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        Self {
            total_debit,
            total_credit,
            difference: total_debit - total_credit,
            balanced: amounts_match(total_debit, total_credit),
        }
    }
}
