//! `shop-ledger` — the transaction and inventory consistency authority.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                          |
//! |-------------|-------------------------------------------------------------------|
//! | [`ledger`]  | `Ledger`, `StockRow`, `Transaction`, `LineItem`, `CommitOutcome`  |
//! | [`metrics`] | `Metrics`, `ItemMetrics`, `EmployeeSales`, `AlertCounts`          |
//! | [`rules`]   | `RuleEvaluator` trait, `RuleVerdict`, `BulkDiscountRules`         |
//! | [`error`]   | `LedgerError`, `InvariantViolation`                               |
//!
//! # Guarantees
//!
//! - Stock is a `u32` decremented only after the ledger re-read it and found
//!   it sufficient, so it can never go negative and no unit is sold twice.
//! - A rejected commit leaves every table untouched.
//! - `sum(transaction totals) == revenue` and every other running total is
//!   rechecked against the log by [`Ledger::verify`].

pub mod error;
pub mod ledger;
pub mod metrics;
pub mod rules;


pub use error::{InvariantViolation, LedgerError, LedgerResult};
pub use ledger::{
    CatalogItem, CommitOutcome, CustomerAccount, Ledger, LineItem, StockRow, Transaction,
};
pub use metrics::{AlertCounts, EmployeeSales, ItemMetrics, Metrics, SnapshotScope};
pub use rules::{BulkDiscountRules, RuleEvaluator, RuleEvent, RuleUnavailable, RuleVerdict};
