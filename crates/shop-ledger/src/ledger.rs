//! The `Ledger`: sole owner of stock, prices, money, and the sale log.
//!
//! # Single writer
//!
//! Every mutation goes through `&mut self`, and the scheduler calls the ledger
//! from one thread, one message at a time.  There is never more than one
//! commit in flight, so validating against the authoritative stock table and
//! then decrementing it cannot be interleaved with another commit.
//!
//! # Derived aggregates
//!
//! The transaction log is the source of truth.  Revenue, per-item units sold
//! and per-customer spend are kept as running totals for speed, and
//! [`Ledger::verify`] recomputes each of them from the log.  Per-employee
//! sales have no running total at all; they are always derived.

use std::collections::BTreeMap;
use std::fmt;

use shop_core::money::BPS_SCALE;
use shop_core::{
    Category, CustomerId, EmployeeId, ItemId, Money, PurchaseIntent, RejectReason,
    StoreParams, Tick, TransactionId,
};
use tracing::{debug, warn};

use crate::{
    AlertCounts, EmployeeSales, InvariantViolation, ItemMetrics, LedgerError, LedgerResult,
    Metrics, RuleEvaluator, RuleEvent, RuleVerdict, SnapshotScope,
};

/// Cents per loyalty point.
const CENTS_PER_POINT: i64 = 1_000;

// ── Tables ────────────────────────────────────────────────────────────────────

/// Seed data for one catalog row.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct CatalogItem {
    pub category:   Category,
    pub base_price: Money,
    pub stock:      u32,
}

#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StockRow {
    pub item:            ItemId,
    pub category:        Category,
    pub base_price:      Money,
    pub price:           Money,
    pub initial_stock:   u32,
    pub stock:           u32,
    pub units_sold:      u64,
    pub units_restocked: u64,
    pub restock_pending: bool,
    pub low_stock:       bool,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineItem {
    pub item:       ItemId,
    pub quantity:   u32,
    pub unit_price: Money,
}

impl LineItem {
    pub fn amount(&self) -> Money {
        self.unit_price * self.quantity
    }
}

/// One committed sale.  Never modified after it is appended.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transaction {
    pub id:             TransactionId,
    pub customer:       CustomerId,
    pub employee:       EmployeeId,
    pub lines:          Vec<LineItem>,
    pub subtotal:       Money,
    pub discount_bps:   u32,
    pub discount:       Money,
    pub total:          Money,
    pub loyalty_points: u64,
    pub note:           Option<String>,
    pub tick:           Tick,
}

#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CustomerAccount {
    pub spent:          Money,
    pub loyalty_points: u64,
    pub purchases:      u32,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CommitOutcome {
    Committed(Transaction),
    Rejected(RejectReason),
}

// ── Ledger ────────────────────────────────────────────────────────────────────

pub struct Ledger {
    rows:                Vec<StockRow>,
    log:                 Vec<Transaction>,
    revenue:             Money,
    accounts:            BTreeMap<CustomerId, CustomerAccount>,
    alerts:              AlertCounts,
    low_stock_threshold: u32,
    bulk_quantity:       u32,
    rules:               Option<Box<dyn RuleEvaluator>>,
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("items", &self.rows.len())
            .field("transactions", &self.log.len())
            .field("revenue", &self.revenue)
            .field("alerts", &self.alerts)
            .field("rules", &self.rules.is_some())
            .finish_non_exhaustive()
    }
}

impl Ledger {
    /// Open a ledger over `catalog`; row `i` becomes `ItemId(i)`.
    pub fn new(catalog: &[CatalogItem], params: &StoreParams) -> LedgerResult<Self> {
        let mut rows = Vec::with_capacity(catalog.len());
        for (i, c) in catalog.iter().enumerate() {
            let item = ItemId(i as u32);
            if !c.base_price.is_positive() {
                return Err(LedgerError::InvalidPrice { item, price: c.base_price });
            }
            rows.push(StockRow {
                item,
                category:        c.category,
                base_price:      c.base_price,
                price:           c.base_price,
                initial_stock:   c.stock,
                stock:           c.stock,
                units_sold:      0,
                units_restocked: 0,
                restock_pending: false,
                low_stock:       c.stock < params.low_stock_threshold,
            });
        }
        Ok(Self {
            rows,
            log: Vec::new(),
            revenue: Money::ZERO,
            accounts: BTreeMap::new(),
            alerts: AlertCounts::default(),
            low_stock_threshold: params.low_stock_threshold,
            bulk_quantity: params.bulk_quantity,
            rules: None,
        })
    }

    /// Install the rule collaborator consulted for bulk purchases.
    pub fn with_rules(mut self, rules: Box<dyn RuleEvaluator>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn set_rules(&mut self, rules: Option<Box<dyn RuleEvaluator>>) {
        self.rules = rules;
    }

    // ── Commit ────────────────────────────────────────────────────────────

    /// Validate and, if valid, apply a purchase.  Either every effect happens
    /// or none does.
    ///
    /// Checks, in order: the basket is non-empty; every line is covered by
    /// the ledger's own stock; the rule collaborator (bulk baskets only) does
    /// not deny it; the discounted total fits the customer's remaining
    /// budget.
    pub fn try_commit(
        &mut self,
        intent:   &PurchaseIntent,
        employee: EmployeeId,
        now:      Tick,
    ) -> CommitOutcome {
        // Duplicate lines for one title are merged so each stock check sees
        // the full requested quantity.
        let mut wanted: BTreeMap<ItemId, u32> = BTreeMap::new();
        for line in intent.lines.iter().filter(|l| l.quantity > 0) {
            *wanted.entry(line.item).or_default() += line.quantity;
        }
        if wanted.is_empty() {
            return self.reject(intent, RejectReason::EmptyBasket);
        }

        let mut lines = Vec::with_capacity(wanted.len());
        for (&item, &quantity) in &wanted {
            match self.rows.get(item.index()) {
                Some(row) if row.stock >= quantity => {
                    lines.push(LineItem { item, quantity, unit_price: row.price });
                }
                _ => return self.reject(intent, RejectReason::OutOfStock { item }),
            }
        }
        let subtotal: Money = lines.iter().map(LineItem::amount).sum();
        let total_quantity: u32 = wanted.values().sum();

        let mut discount_bps = intent.discount_bps;
        let mut note = None;
        if total_quantity >= self.bulk_quantity {
            if let Some(rules) = self.rules.as_mut() {
                let event = RuleEvent {
                    customer: intent.customer,
                    lines: &lines,
                    total_quantity,
                    subtotal,
                    discount_bps,
                    tick: now,
                };
                match rules.evaluate(&event) {
                    Ok(RuleVerdict::Allow) => {}
                    Ok(RuleVerdict::Deny(reason)) => {
                        return self.reject(intent, RejectReason::RuleDenied { reason });
                    }
                    Ok(RuleVerdict::Annotate { note: n, extra_discount_bps }) => {
                        discount_bps = discount_bps.saturating_add(extra_discount_bps);
                        note = Some(n);
                    }
                    Err(e) => {
                        warn!(customer = %intent.customer, error = %e, "rule evaluation failed, using default rules");
                        self.alerts.rule_fallbacks += 1;
                    }
                }
            }
        }
        let discount_bps = discount_bps.min(BPS_SCALE as u32);
        let discount = subtotal.discount_part(discount_bps);
        let total = subtotal - discount;

        let spent = self.accounts.get(&intent.customer).map_or(Money::ZERO, |a| a.spent);
        let available = intent.budget.saturating_sub(spent);
        if total > available {
            return self.reject(intent, RejectReason::InsufficientBudget { total, available });
        }

        // ── Apply ──
        for line in &lines {
            let row = &mut self.rows[line.item.index()];
            row.stock -= line.quantity;
            row.units_sold += line.quantity as u64;
            let low = row.stock < self.low_stock_threshold;
            if low && !row.low_stock {
                self.alerts.low_stock += 1;
            }
            if row.stock == 0 {
                self.alerts.stockouts += 1;
            }
            row.low_stock = low;
        }
        let loyalty_points = (total.cents() / CENTS_PER_POINT).max(0) as u64;
        let account = self.accounts.entry(intent.customer).or_default();
        account.spent += total;
        account.loyalty_points += loyalty_points;
        account.purchases += 1;
        self.revenue += total;

        let tx = Transaction {
            id: TransactionId(self.log.len() as u64),
            customer: intent.customer,
            employee,
            lines,
            subtotal,
            discount_bps,
            discount,
            total,
            loyalty_points,
            note,
            tick: now,
        };
        debug!(id = %tx.id, customer = %tx.customer, employee = %employee, total = %tx.total, "committed");
        self.log.push(tx.clone());
        CommitOutcome::Committed(tx)
    }

    fn reject(&mut self, intent: &PurchaseIntent, reason: RejectReason) -> CommitOutcome {
        match reason {
            RejectReason::OutOfStock { .. } => self.alerts.rejected_out_of_stock += 1,
            RejectReason::InsufficientBudget { .. } => self.alerts.rejected_budget += 1,
            RejectReason::RuleDenied { .. } => self.alerts.rejected_rule += 1,
            RejectReason::EmptyBasket => {}
        }
        debug!(customer = %intent.customer, %reason, "rejected");
        CommitOutcome::Rejected(reason)
    }

    // ── Restock / price ───────────────────────────────────────────────────

    /// Mark a restock as outstanding for `item`.  Returns `false` if one
    /// already is; the caller should drop the duplicate request.
    pub fn mark_restock_pending(&mut self, item: ItemId) -> LedgerResult<bool> {
        let row = self.row_mut(item)?;
        if row.restock_pending {
            self.alerts.suppressed_restocks += 1;
            return Ok(false);
        }
        row.restock_pending = true;
        Ok(true)
    }

    /// Add delivered stock, clear the pending marker, recompute low-stock.
    pub fn apply_restock(&mut self, item: ItemId, quantity: u32) -> LedgerResult<()> {
        let threshold = self.low_stock_threshold;
        let row = self.rows.get_mut(item.index()).ok_or(LedgerError::UnknownItem(item))?;
        row.stock += quantity;
        row.units_restocked += quantity as u64;
        row.restock_pending = false;
        row.low_stock = row.stock < threshold;
        self.alerts.restocks += 1;
        debug!(%item, quantity, stock = row.stock, "restocked");
        Ok(())
    }

    pub fn set_price(&mut self, item: ItemId, price: Money) -> LedgerResult<()> {
        if !price.is_positive() {
            return Err(LedgerError::InvalidPrice { item, price });
        }
        self.row_mut(item)?.price = price;
        Ok(())
    }

    fn row_mut(&mut self, item: ItemId) -> LedgerResult<&mut StockRow> {
        self.rows.get_mut(item.index()).ok_or(LedgerError::UnknownItem(item))
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    pub fn rows(&self) -> &[StockRow] {
        &self.rows
    }

    pub fn row(&self, item: ItemId) -> Option<&StockRow> {
        self.rows.get(item.index())
    }

    pub fn stock(&self, item: ItemId) -> Option<u32> {
        self.row(item).map(|r| r.stock)
    }

    pub fn stock_vector(&self) -> Vec<u32> {
        self.rows.iter().map(|r| r.stock).collect()
    }

    pub fn revenue(&self) -> Money {
        self.revenue
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.log
    }

    /// The last `n` transactions.
    pub fn tail(&self, n: usize) -> &[Transaction] {
        &self.log[self.log.len().saturating_sub(n)..]
    }

    pub fn accounts(&self) -> &BTreeMap<CustomerId, CustomerAccount> {
        &self.accounts
    }

    pub fn account(&self, customer: CustomerId) -> Option<&CustomerAccount> {
        self.accounts.get(&customer)
    }

    pub fn alerts(&self) -> AlertCounts {
        self.alerts
    }

    /// Sales per employee, summed from the log.  Every id in `employees`
    /// appears, in the order given.
    pub fn employee_sales(&self, employees: &[EmployeeId]) -> Vec<EmployeeSales> {
        let mut by_id: BTreeMap<EmployeeId, EmployeeSales> = employees
            .iter()
            .map(|&e| {
                (e, EmployeeSales { employee: e, transactions: 0, units: 0, revenue: Money::ZERO })
            })
            .collect();
        for tx in &self.log {
            let entry = by_id.entry(tx.employee).or_insert(EmployeeSales {
                employee:     tx.employee,
                transactions: 0,
                units:        0,
                revenue:      Money::ZERO,
            });
            entry.transactions += 1;
            entry.units += tx.lines.iter().map(|l| l.quantity as u64).sum::<u64>();
            entry.revenue += tx.total;
        }
        let mut sales: Vec<EmployeeSales> =
            employees.iter().filter_map(|e| by_id.remove(e)).collect();
        sales.extend(by_id.into_values());
        sales
    }

    /// Copy out the current aggregates.
    pub fn snapshot(&self, scope: SnapshotScope<'_>) -> Metrics {
        let mut gross = vec![Money::ZERO; self.rows.len()];
        for line in self.log.iter().flat_map(|t| &t.lines) {
            if let Some(g) = gross.get_mut(line.item.index()) {
                *g += line.amount();
            }
        }
        let items: Vec<ItemMetrics> = self
            .rows
            .iter()
            .zip(gross)
            .map(|(r, revenue)| ItemMetrics {
                item: r.item,
                category: r.category,
                stock: r.stock,
                price: r.price,
                units_sold: r.units_sold,
                revenue,
                low_stock: r.low_stock,
            })
            .collect();
        Metrics {
            tick:              scope.tick,
            total_revenue:     self.revenue,
            transaction_count: self.log.len() as u64,
            active_customers:  scope.active_customers,
            mean_satisfaction: scope.mean_satisfaction,
            total_stock:       self.rows.iter().map(|r| r.stock as u64).sum(),
            low_stock_items:   self.rows.iter().filter(|r| r.low_stock).count(),
            items,
            employees:         self.employee_sales(scope.employees),
            alerts:            self.alerts,
        }
    }

    // ── Audit ─────────────────────────────────────────────────────────────

    /// Recompute every running total from the log and compare.
    pub fn verify(&self) -> Result<(), InvariantViolation> {
        let recomputed: Money = self.log.iter().map(|t| t.total).sum();
        if recomputed != self.revenue {
            return Err(InvariantViolation::RevenueMismatch { recorded: self.revenue, recomputed });
        }

        let mut sold = vec![0u64; self.rows.len()];
        let mut spend: BTreeMap<CustomerId, Money> = BTreeMap::new();
        for tx in &self.log {
            let subtotal: Money = tx.lines.iter().map(LineItem::amount).sum();
            if subtotal != tx.subtotal
                || tx.discount != subtotal.discount_part(tx.discount_bps)
                || tx.total != subtotal - tx.discount
            {
                return Err(InvariantViolation::TransactionArithmetic { id: tx.id });
            }
            for line in &tx.lines {
                if let Some(s) = sold.get_mut(line.item.index()) {
                    *s += line.quantity as u64;
                }
            }
            *spend.entry(tx.customer).or_default() += tx.total;
        }

        for (row, recomputed) in self.rows.iter().zip(sold) {
            if row.units_sold != recomputed {
                return Err(InvariantViolation::SalesMismatch {
                    item: row.item,
                    recorded: row.units_sold,
                    recomputed,
                });
            }
            let expected = row.initial_stock as i128 + row.units_restocked as i128
                - row.units_sold as i128;
            if expected != row.stock as i128 {
                return Err(InvariantViolation::StockAccounting {
                    item:      row.item,
                    stock:     row.stock,
                    initial:   row.initial_stock,
                    restocked: row.units_restocked,
                    sold:      row.units_sold,
                });
            }
        }

        for (&customer, account) in &self.accounts {
            let recomputed = spend.get(&customer).copied().unwrap_or_default();
            if recomputed != account.spent {
                return Err(InvariantViolation::CustomerSpendMismatch {
                    customer,
                    recorded: account.spent,
                    recomputed,
                });
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn corrupt_revenue(&mut self, delta: Money) {
        self.revenue += delta;
    }
}
