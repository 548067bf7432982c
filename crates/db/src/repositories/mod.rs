//! Repository abstractions for data access.
//!
//! Repositories own persistence and the atomic conditional writes that
//! back the core's exactly-once and lifecycle guarantees; the business
//! rules themselves live in `saldo-core`.

pub mod close_run;
pub mod journal;
pub mod period;
pub mod reconciliation;

pub use close_run::CloseRunRepository;
pub use journal::JournalRepository;
pub use period::PeriodRepository;
pub use reconciliation::ReconciliationRepository;
