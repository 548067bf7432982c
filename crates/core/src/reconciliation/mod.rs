//! Bank-transaction-to-payment reconciliation matching.
//!
//! Candidate proposal is pure amount-tolerance matching; committing a
//! match is an atomic status flip performed by the database layer.

pub mod error;
pub mod matcher;
pub mod types;

pub use error::ReconciliationError;
pub use matcher::{find_candidates, validate_reconcilable};
pub use types::{
    BankTransaction, BankTransactionStatus, BankTransactionType, Payment, ReconciliationMatch,
};
