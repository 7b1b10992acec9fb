pub mod book;
pub mod ledger;

pub use book::{LedgerBook, SharedLedger};
pub use ledger::{RiskConfig, RiskLedger, MAX_ALLOCATION_FRACTION};
