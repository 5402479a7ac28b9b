//! Plain data row types written by output backends.

use shop_ledger::Metrics;

/// One line of the per-tick time series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickRow {
    pub tick:              u64,
    /// Simulated seconds since opening at the end of this tick.
    pub elapsed_secs:      u64,
    pub revenue_cents:     i64,
    pub transactions:      u64,
    pub active_customers:  usize,
    pub mean_satisfaction: f64,
    pub total_stock:       u64,
    pub low_stock_items:   usize,
    pub alerts:            u64,
}

impl TickRow {
    pub fn from_metrics(metrics: &Metrics, tick_duration_secs: u32) -> Self {
        Self {
            tick:              metrics.tick.0,
            elapsed_secs:      (metrics.tick.0 + 1) * tick_duration_secs as u64,
            revenue_cents:     metrics.total_revenue.cents(),
            transactions:      metrics.transaction_count,
            active_customers:  metrics.active_customers,
            mean_satisfaction: metrics.mean_satisfaction,
            total_stock:       metrics.total_stock,
            low_stock_items:   metrics.low_stock_items,
            alerts:            metrics.alert_count(),
        }
    }
}
