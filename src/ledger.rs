//! Ledgers
//!
//! Each ledger wraps the storage operations that guard one invariant and the
//! notifications that follow them. A notification is only attempted after
//! the write has committed, and its outcome never reaches the caller.

mod connections;
mod polls;
mod questions;

pub use connections::ConnectionLedger;
#[allow(unused_imports)] // Public API re-exports
pub use polls::{percent, OptionTally, PollLedger, PollTally};
pub use questions::QuestionBoard;
