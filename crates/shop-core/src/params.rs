//! Business tuning knobs shared by the actors, the ledger and the scheduler.

use crate::{ShopError, ShopResult};

/// Store-wide behavioral parameters.
///
/// Every field has a default; a JSON config file only needs to name the
/// fields it overrides.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoreParams {
    /// An item is flagged low-stock while `stock < low_stock_threshold`.
    pub low_stock_threshold: u32,

    /// Units added by one serviced restock request.
    pub restock_quantity: u32,

    /// Ticks between a clerk claiming a restock request and the ledger
    /// committing the stock increase.
    pub restock_delay_ticks: u32,

    /// Maximum relative price deviation from the base price (0.30 = ±30 %).
    pub price_band: f64,

    /// Gain `k` in `base * (1 + k * (demand - supply))`.
    pub price_drift_gain: f64,

    /// Fraction of the gap to the target price closed each tick.
    pub price_nudge: f64,

    /// Length of the rolling demand/supply window, in ticks.
    pub demand_window_ticks: usize,

    /// Patience range (inclusive) drawn per customer; decremented each tick
    /// spent seeking help.
    pub patience_min: u32,
    pub patience_max: u32,

    /// Visits range (inclusive) drawn per customer; the customer leaves the
    /// active set after completing that many.
    pub visits_min: u32,
    pub visits_max: u32,

    /// A purchase answered within this many ticks of the request counts as
    /// quick service.
    pub quick_service_ticks: u64,

    /// Purchases of at least this many units are referred to the rule
    /// evaluator.
    pub bulk_quantity: u32,

    /// Transactions kept in the checkpoint log tail.
    pub transaction_tail: usize,

    /// Admit new customers every N ticks (0 = closed population).
    pub arrival_interval_ticks: u64,

    /// Customers admitted per arrival wave.
    pub arrivals_per_interval: u32,
}

impl Default for StoreParams {
    fn default() -> Self {
        Self {
            low_stock_threshold:    10,
            restock_quantity:       20,
            restock_delay_ticks:    5,
            price_band:             0.30,
            price_drift_gain:       0.5,
            price_nudge:            0.2,
            demand_window_ticks:    10,
            patience_min:           5,
            patience_max:           15,
            visits_min:             1,
            visits_max:             3,
            quick_service_ticks:    5,
            bulk_quantity:          5,
            transaction_tail:       50,
            arrival_interval_ticks: 0,
            arrivals_per_interval:  2,
        }
    }
}

impl StoreParams {
    pub fn validate(&self) -> ShopResult<()> {
        if !(0.0..1.0).contains(&self.price_band) {
            return Err(ShopError::Config(format!(
                "price band must be in [0, 1), got {}",
                self.price_band
            )));
        }
        if !(0.0..=1.0).contains(&self.price_nudge) {
            return Err(ShopError::Config(format!(
                "price nudge must be in [0, 1], got {}",
                self.price_nudge
            )));
        }
        if self.demand_window_ticks == 0 {
            return Err(ShopError::Config("demand window must be at least one tick".into()));
        }
        if self.patience_min == 0 || self.patience_min > self.patience_max {
            return Err(ShopError::Config(format!(
                "invalid patience range {}..={}",
                self.patience_min, self.patience_max
            )));
        }
        if self.visits_min == 0 || self.visits_min > self.visits_max {
            return Err(ShopError::Config(format!(
                "invalid visits range {}..={}",
                self.visits_min, self.visits_max
            )));
        }
        if self.restock_quantity == 0 {
            return Err(ShopError::Config("restock quantity must be positive".into()));
        }
        Ok(())
    }
}
