//! Execution history for audit and listing.
//!
//! Every command that passes the allowlist leaves an `ExecutionRecord` in a
//! bounded, newest-first `HistoryLog` shared by all requests.

mod history;
mod record;
mod tests;

pub use history::{DEFAULT_HISTORY_CAPACITY, HistoryLog};
pub use record::ExecutionRecord;
