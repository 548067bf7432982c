//! Postgres enum mappings.
//!
//! Closed enumerations, not free-form strings, so illegal states are
//! unrepresentable at the schema level. Conversions to and from the core
//! domain enums live here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Accounting period status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "period_status")]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    /// Period accepts ordinary user postings.
    #[sea_orm(string_value = "open")]
    Open,
    /// Ordinary postings are frozen.
    #[sea_orm(string_value = "locked")]
    Locked,
    /// Close is finalizing.
    #[sea_orm(string_value = "closing")]
    Closing,
    /// Period is immutable.
    #[sea_orm(string_value = "closed")]
    Closed,
}

impl From<saldo_core::period::PeriodStatus> for PeriodStatus {
    fn from(status: saldo_core::period::PeriodStatus) -> Self {
        match status {
            saldo_core::period::PeriodStatus::Open => Self::Open,
            saldo_core::period::PeriodStatus::Locked => Self::Locked,
            saldo_core::period::PeriodStatus::Closing => Self::Closing,
            saldo_core::period::PeriodStatus::Closed => Self::Closed,
        }
    }
}

impl From<PeriodStatus> for saldo_core::period::PeriodStatus {
    fn from(status: PeriodStatus) -> Self {
        match status {
            PeriodStatus::Open => Self::Open,
            PeriodStatus::Locked => Self::Locked,
            PeriodStatus::Closing => Self::Closing,
            PeriodStatus::Closed => Self::Closed,
        }
    }
}

/// Where a journal entry originates.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_source")]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Entered by a user.
    #[sea_orm(string_value = "manual")]
    Manual,
    /// Produced by a close-run procedure.
    #[sea_orm(string_value = "close_run")]
    CloseRun,
}

impl From<saldo_core::ledger::EntrySource> for EntrySource {
    fn from(source: saldo_core::ledger::EntrySource) -> Self {
        match source {
            saldo_core::ledger::EntrySource::Manual => Self::Manual,
            saldo_core::ledger::EntrySource::CloseRun => Self::CloseRun,
        }
    }
}

/// Close-run procedure type.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "close_run_type")]
#[serde(rename_all = "snake_case")]
pub enum CloseRunType {
    /// Recurring journal posting.
    #[sea_orm(string_value = "recurring")]
    Recurring,
    /// Cost allocation posting.
    #[sea_orm(string_value = "allocations")]
    Allocations,
    /// FX revaluation posting.
    #[sea_orm(string_value = "fx_reval")]
    FxReval,
}

impl From<saldo_core::close::RunType> for CloseRunType {
    fn from(run_type: saldo_core::close::RunType) -> Self {
        match run_type {
            saldo_core::close::RunType::Recurring => Self::Recurring,
            saldo_core::close::RunType::Allocations => Self::Allocations,
            saldo_core::close::RunType::FxReval => Self::FxReval,
        }
    }
}

impl From<CloseRunType> for saldo_core::close::RunType {
    fn from(run_type: CloseRunType) -> Self {
        match run_type {
            CloseRunType::Recurring => Self::Recurring,
            CloseRunType::Allocations => Self::Allocations,
            CloseRunType::FxReval => Self::FxReval,
        }
    }
}

/// Bank transaction reconciliation status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "bank_transaction_status"
)]
#[serde(rename_all = "snake_case")]
pub enum BankTransactionStatus {
    /// Not yet linked to a payment.
    #[sea_orm(string_value = "unreconciled")]
    Unreconciled,
    /// Linked (possibly to no payment).
    #[sea_orm(string_value = "reconciled")]
    Reconciled,
}

impl From<BankTransactionStatus> for saldo_core::reconciliation::BankTransactionStatus {
    fn from(status: BankTransactionStatus) -> Self {
        match status {
            BankTransactionStatus::Unreconciled => Self::Unreconciled,
            BankTransactionStatus::Reconciled => Self::Reconciled,
        }
    }
}

/// Bank transaction direction.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "bank_transaction_type"
)]
#[serde(rename_all = "snake_case")]
pub enum BankTransactionType {
    /// Money in.
    #[sea_orm(string_value = "credit")]
    Credit,
    /// Money out.
    #[sea_orm(string_value = "debit")]
    Debit,
}

impl From<BankTransactionType> for saldo_core::reconciliation::BankTransactionType {
    fn from(transaction_type: BankTransactionType) -> Self {
        match transaction_type {
            BankTransactionType::Credit => Self::Credit,
            BankTransactionType::Debit => Self::Debit,
        }
    }
}
