//! Close-run domain types: run identity, procedure parameters, outcomes.

use rust_decimal::Decimal;
use saldo_shared::types::{AccountId, CompanyId, Currency, RecurringTemplateId};
use serde::{Deserialize, Serialize};

/// The named automated procedures a close run can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    /// Post concrete entries from recurring journal templates.
    Recurring,
    /// Post overhead/cost allocation entries per a company-defined basis.
    Allocations,
    /// Post unrealized FX gain/loss on foreign-currency balances.
    FxReval,
}

impl std::fmt::Display for RunType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recurring => write!(f, "recurring"),
            Self::Allocations => write!(f, "allocations"),
            Self::FxReval => write!(f, "fx_reval"),
        }
    }
}

impl std::str::FromStr for RunType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recurring" => Ok(Self::Recurring),
            "allocations" => Ok(Self::Allocations),
            "fx_reval" | "fx-reval" => Ok(Self::FxReval),
            _ => Err(format!("Unknown run type: {s}")),
        }
    }
}

/// Structured outcome of one close run.
///
/// Persisted as the run's payload; partial failures are enumerated here
/// rather than aborting the batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Number of journal entries successfully posted.
    pub posted_count: u32,
    /// Per-item failures captured during the run.
    pub errors: Vec<RunItemError>,
}

impl RunOutcome {
    /// Records a successfully posted entry.
    pub fn record_posted(&mut self) {
        self.posted_count += 1;
    }

    /// Records a per-item failure without aborting the batch.
    pub fn record_error(&mut self, item: impl Into<String>, code: &str, message: impl Into<String>) {
        self.errors.push(RunItemError {
            item: item.into(),
            code: code.to_string(),
            message: message.into(),
        });
    }
}

/// One failed sub-posting within a close run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunItemError {
    /// What failed (template name, account, balance line).
    pub item: String,
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable detail for operator follow-up.
    pub message: String,
}

/// A recurring journal template.
///
/// Active templates are due each period; each instantiates one concrete
/// journal entry dated at period end.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringTemplate {
    /// Unique identifier.
    pub id: RecurringTemplateId,
    /// Company this template belongs to.
    pub company_id: CompanyId,
    /// Template name, used as the entry description.
    pub name: String,
    /// Optional memo carried onto instantiated entries.
    pub memo: Option<String>,
    /// Whether the template is currently due for posting.
    pub active: bool,
    /// Template lines instantiated verbatim.
    pub lines: Vec<TemplateLine>,
}

/// One line of a recurring template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateLine {
    /// Account to post to.
    pub account_id: AccountId,
    /// Debit amount (zero if this is a credit line).
    pub debit: Decimal,
    /// Credit amount (zero if this is a debit line).
    pub credit: Decimal,
    /// Optional memo for the line.
    pub memo: Option<String>,
}

/// Parameters for the `allocations` procedure.
///
/// The allocation basis is company-defined external configuration; the
/// caller supplies the pool and its split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationParams {
    /// Total amount to allocate out of the source account.
    pub total: Decimal,
    /// Pool account credited by the allocation.
    pub source_account: AccountId,
    /// Targets receiving allocated shares as debits.
    pub targets: Vec<AllocationTarget>,
    /// Optional memo for the entry.
    pub memo: Option<String>,
}

/// One target of an allocation basis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationTarget {
    /// Account receiving the allocated share.
    pub account_id: AccountId,
    /// Percentage of the total (all targets must sum to 100).
    pub percent: Decimal,
}

/// Parameters for the `fx_reval` procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FxRevalParams {
    /// Account credited with unrealized gains.
    pub gain_account: AccountId,
    /// Account debited with unrealized losses.
    pub loss_account: AccountId,
    /// Foreign-currency balances to revalue as of period end.
    pub balances: Vec<ForeignBalance>,
}

/// A foreign-currency-denominated balance with its closing rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForeignBalance {
    /// Account holding the balance.
    pub account_id: AccountId,
    /// Denomination currency.
    pub currency: Currency,
    /// Balance in the foreign currency.
    pub foreign_balance: Decimal,
    /// Closing exchange rate (foreign to base) as of period end.
    pub rate: Decimal,
    /// Base-currency balance currently booked for the account.
    pub booked_base_balance: Decimal,
}
