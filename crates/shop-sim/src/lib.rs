//! `shop-sim` — tick scheduler for the shopsim retail simulation.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Customers: tick() against the ledger's catalog (parallel with `parallel`).
//!   ② Employees: stale backlog requests dropped; each idle employee claims
//!                 one request (ascending EmployeeId); every employee ticks.
//!   ③ Items    : tick() (parallel with `parallel`).
//!   ④ Dispatch : publish all, drain once in (priority, seq) order:
//!                   Actor(id)        → receive(); unknown id = delivery failure
//!                   Ledger           → try_commit / apply_restock / set_price
//!                   work topics      → backlog (restocks de-duplicated)
//!                   metrics topic    → visit statistics
//!                 messages published here wait for the next tick.
//!   ⑤ Roster   : finished customers leave, arrivals join.
//!   ⑥ Verify   : ledger invariants; a violation aborts the run.
//!   ⑦ Snapshot : observer + MetricsFeed; checkpoint every N ticks.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                        |
//! |------------|---------------------------------------------------------------|
//! | `parallel` | Runs customer and item activation on Rayon's thread pool.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use shop_core::SimConfig;
//! use shop_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::from_hours(8, 60)).build()?;
//! let outcome = sim.run(&mut NoopObserver)?;
//! println!("{outcome:?}: {}", sim.ledger().revenue());
//! ```

pub mod builder;
pub mod checkpoint;
pub mod error;
pub mod feed;
pub mod observer;
pub mod sim;
pub mod stats;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use checkpoint::{Checkpoint, LedgerTables};
pub use error::{SimError, SimResult};
pub use feed::{MetricsFeed, StopHandle};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
pub use stats::{DispatchStats, RunOutcome, TickSummary, VisitStats};
