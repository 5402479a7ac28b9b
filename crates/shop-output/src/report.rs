//! End-of-run summary written to `report.json`.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use shop_bus::BusStats;
use shop_core::{EmployeeId, EmployeeRole, Money};
use shop_ledger::{AlertCounts, ItemMetrics};
use shop_sim::{DispatchStats, RunOutcome, Sim, VisitStats};

use crate::json::write_json;
use crate::OutputResult;

pub const REPORT_FILE: &str = "report.json";

/// Best sellers listed in the report.
const TOP_ITEMS: usize = 5;

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct StaffReport {
    pub employee:         EmployeeId,
    pub role:             EmployeeRole,
    pub rating:           f64,
    pub customers_served: u32,
    pub restocks_handled: u32,
    pub transactions:     u64,
    pub units:            u64,
    pub revenue:          Money,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct RunReport {
    pub outcome:             RunOutcome,
    pub seed:                u64,
    pub ticks_run:           u64,
    /// `"{hours}h{minutes:02}m"` of simulated store time.
    pub simulated_time:      String,
    pub revenue:             Money,
    pub transactions:        u64,
    pub average_ticket:      Money,
    pub customers_remaining: usize,
    pub total_stock:         u64,
    pub low_stock_items:     usize,
    pub visits:              VisitStats,
    pub visit_satisfaction:  f64,
    pub dispatch:            DispatchStats,
    pub bus:                 BusStats,
    pub alerts:              AlertCounts,
    pub staff:               Vec<StaffReport>,
    pub top_items:           Vec<ItemMetrics>,
}

impl RunReport {
    pub fn from_sim(sim: &Sim, outcome: RunOutcome) -> Self {
        let metrics = sim.snapshot();
        let ledger = sim.ledger();

        let ids: Vec<EmployeeId> = sim.employees().iter().map(|e| e.id()).collect();
        let sales = ledger.employee_sales(&ids);
        let staff = sim
            .employees()
            .iter()
            .map(|e| {
                let s = sales.iter().find(|s| s.employee == e.id());
                StaffReport {
                    employee:         e.id(),
                    role:             e.role(),
                    rating:           e.rating(),
                    customers_served: e.customers_served(),
                    restocks_handled: e.restocks_handled(),
                    transactions:     s.map_or(0, |s| s.transactions),
                    units:            s.map_or(0, |s| s.units),
                    revenue:          s.map_or(Money::ZERO, |s| s.revenue),
                }
            })
            .collect();

        let mut top_items: Vec<ItemMetrics> =
            metrics.items.iter().filter(|i| i.units_sold > 0).cloned().collect();
        top_items.sort_by(|a, b| b.units_sold.cmp(&a.units_sold).then(a.item.cmp(&b.item)));
        top_items.truncate(TOP_ITEMS);

        let average_ticket = match metrics.transaction_count {
            0 => Money::ZERO,
            n => Money(metrics.total_revenue.cents() / n as i64),
        };
        let (hours, minutes) = sim.clock.elapsed_hm();

        Self {
            outcome,
            seed:                sim.config.seed,
            ticks_run:           sim.clock.current_tick.0,
            simulated_time:      format!("{hours}h{minutes:02}m"),
            revenue:             metrics.total_revenue,
            transactions:        metrics.transaction_count,
            average_ticket,
            customers_remaining: metrics.active_customers,
            total_stock:         metrics.total_stock,
            low_stock_items:     metrics.low_stock_items,
            visits:              sim.visit_stats(),
            visit_satisfaction:  sim.visit_stats().mean_satisfaction(),
            dispatch:            sim.dispatch_stats(),
            bus:                 sim.bus().stats(),
            alerts:              metrics.alerts,
            staff,
            top_items,
        }
    }

    /// Write `report.json` into `dir`.
    pub fn write(&self, dir: &Path) -> OutputResult<()> {
        write_json(&dir.join(REPORT_FILE), self)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:?} after {} ticks ({})", self.outcome, self.ticks_run, self.simulated_time)?;
        writeln!(
            f,
            "revenue {} over {} transactions (avg {})",
            self.revenue, self.transactions, self.average_ticket
        )?;
        writeln!(
            f,
            "visits: {} purchased, {} rejected, {} helped, {} abandoned (mean satisfaction {:.2})",
            self.visits.tally.purchased,
            self.visits.tally.rejected,
            self.visits.tally.helped,
            self.visits.tally.abandoned,
            self.visit_satisfaction,
        )?;
        write!(
            f,
            "stock {} units, {} low; {} restocks, {} delivery failures",
            self.total_stock, self.low_stock_items, self.alerts.restocks, self.dispatch.delivery_failures,
        )
    }
}
