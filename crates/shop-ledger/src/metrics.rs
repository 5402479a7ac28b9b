//! Read-only aggregate views produced by [`Ledger::snapshot`][crate::Ledger::snapshot].

use shop_core::{Category, EmployeeId, ItemId, Money, Tick};

/// Running alert counters.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlertCounts {
    /// Items crossing below the low-stock threshold.
    pub low_stock:             u64,
    /// Items selling down to zero.
    pub stockouts:             u64,
    pub restocks:              u64,
    /// Restock requests dropped because one was already pending.
    pub suppressed_restocks:   u64,
    /// Commits that fell back to default rules because the evaluator failed.
    pub rule_fallbacks:        u64,
    pub rejected_out_of_stock: u64,
    pub rejected_budget:       u64,
    pub rejected_rule:         u64,
}

impl AlertCounts {
    /// Conditions an operator would want flagged.
    pub fn total(&self) -> u64 {
        self.low_stock + self.stockouts + self.rule_fallbacks
    }

    pub fn rejections(&self) -> u64 {
        self.rejected_out_of_stock + self.rejected_budget + self.rejected_rule
    }
}

#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemMetrics {
    pub item:       ItemId,
    pub category:   Category,
    pub stock:      u32,
    pub price:      Money,
    pub units_sold: u64,
    /// Gross (pre-discount) sales of this title.
    pub revenue:    Money,
    pub low_stock:  bool,
}

/// An employee's sales, derived from the transaction log.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmployeeSales {
    pub employee:     EmployeeId,
    pub transactions: u64,
    pub units:        u64,
    pub revenue:      Money,
}

/// Scheduler-side facts the ledger does not track itself.
#[derive(Copy, Clone, Debug)]
pub struct SnapshotScope<'a> {
    pub tick:              Tick,
    pub active_customers:  usize,
    pub mean_satisfaction: f64,
    /// Every employee, so idle staff appear with zero sales.
    pub employees:         &'a [EmployeeId],
}

/// A point-in-time copy of the store's aggregates.
///
/// Owns all its data; holding one never borrows the ledger.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Metrics {
    pub tick:              Tick,
    pub total_revenue:     Money,
    pub transaction_count: u64,
    pub active_customers:  usize,
    pub mean_satisfaction: f64,
    pub total_stock:       u64,
    pub low_stock_items:   usize,
    pub items:             Vec<ItemMetrics>,
    pub employees:         Vec<EmployeeSales>,
    pub alerts:            AlertCounts,
}

impl Metrics {
    /// Stock per item, in id order.
    pub fn stock_vector(&self) -> Vec<u32> {
        self.items.iter().map(|i| i.stock).collect()
    }

    pub fn alert_count(&self) -> u64 {
        self.alerts.total()
    }
}
