//! Borrowed, serializable view of the full simulation state.

use std::collections::BTreeMap;

use serde::Serialize;
use shop_actor::{Customer, Employee, InventoryItem};
use shop_bus::{Backlog, BusStats};
use shop_core::{CustomerId, Money, SimConfig, StoreParams, Tick};
use shop_ledger::{AlertCounts, CustomerAccount, StockRow, Transaction};

use crate::stats::{DispatchStats, VisitStats};

/// Everything needed to inspect (or reload) a run at a tick boundary.
///
/// Borrows from [`Sim`][crate::Sim]; writers serialize it immediately.
/// `tick` counts completed ticks, so a checkpoint taken after tick `T59`
/// reports `T60`.
#[derive(Serialize, Debug)]
pub struct Checkpoint<'a> {
    pub tick:      Tick,
    pub config:    &'a SimConfig,
    pub params:    &'a StoreParams,
    pub customers: &'a [Customer],
    pub employees: &'a [Employee],
    pub items:     &'a [InventoryItem],
    pub ledger:    LedgerTables<'a>,
    /// Work requests waiting for an employee.
    pub backlog:   &'a Backlog,
    pub bus:       BusStats,
    pub dispatch:  DispatchStats,
    pub visits:    VisitStats,
}

#[derive(Serialize, Debug)]
pub struct LedgerTables<'a> {
    pub revenue:           Money,
    pub transaction_count: usize,
    pub stock:             &'a [StockRow],
    pub accounts:          &'a BTreeMap<CustomerId, CustomerAccount>,
    pub alerts:            AlertCounts,
    /// The most recent transactions, oldest first.
    pub recent:            &'a [Transaction],
}
