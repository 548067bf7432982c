//! Double-entry balance validation for journal entries.
//!
//! This module implements the Ledger Line Validator:
//! - Balance verdicts over a set of journal lines
//! - Minimal auto-balancing adjustments
//! - The single posting gate every entry passes before persistence
//! - Error types for ledger operations

pub mod error;
pub mod types;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use error::LedgerError;
pub use types::{EntrySource, EntryTotals, JournalEntryInput, JournalLine};
pub use validation::{auto_balance, validate_for_posting, validate_lines};
