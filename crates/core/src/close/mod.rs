//! Automated close-run procedures.
//!
//! Each procedure computes adjustment journal entries for a period in its
//! close window. The entries produced here still pass the ledger posting
//! gate; orchestration, idempotency, and persistence live in the database
//! layer.

pub mod allocation;
pub mod error;
pub mod fx;
pub mod recurring;
pub mod types;

pub use allocation::build_allocation_entry;
pub use error::CloseRunError;
pub use fx::build_revaluation_entry;
pub use recurring::{due_templates, instantiate_template};
pub use types::{
    AllocationParams, AllocationTarget, ForeignBalance, FxRevalParams, RecurringTemplate,
    RunItemError, RunOutcome, RunType, TemplateLine,
};
