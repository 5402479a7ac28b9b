//! The inventory item: a read-mostly view of one catalog row plus the
//! demand-driven price drift and the automatic restock trigger.
//!
//! # Price drift
//!
//! Every tick the item pushes the units sold and restocked since the previous
//! tick into two rolling windows of `demand_window_ticks` entries and computes
//!
//! ```text
//! demand = mean(sold per tick)      supply = mean(restocked per tick)
//! target = base × (1 + gain × (demand − supply))      clamped to base × (1 ± band)
//! price  = price + nudge × (target − price)           clamped again, rounded to the cent
//! ```
//!
//! A changed price is sent to the ledger, which owns the price table.  An
//! update published no later than the tick of the item's last price change
//! may predate that change, so its price is not adopted.

use std::collections::VecDeque;

use shop_bus::{Address, Envelope, Message, Payload, Priority};
use shop_core::{ActorId, Category, ItemId, Money, StoreParams, Tick};
use tracing::debug;

use crate::{Behavior, TickContext};

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InventoryItem {
    id:              ItemId,
    category:        Category,
    base_price:      Money,
    price:           Money,
    stock:           u32,
    units_sold:      u64,
    units_restocked: u64,
    low_stock:       bool,
    /// Ledger-side marker, mirrored from the last update.
    restock_pending: bool,
    /// A request has been sent and the ledger has not yet acknowledged it.
    restock_requested: bool,
    /// Tick of the last `PriceChange` sent to the ledger.
    price_changed_at:  Option<Tick>,

    /// Units sold / restocked since the last tick, folded into the windows.
    sold_since_tick:      u64,
    restocked_since_tick: u64,
    demand_window:        VecDeque<u64>,
    supply_window:        VecDeque<u64>,
}

impl InventoryItem {
    pub fn new(
        id:         ItemId,
        category:   Category,
        base_price: Money,
        stock:      u32,
        params:     &StoreParams,
    ) -> Self {
        Self {
            id,
            category,
            base_price,
            price: base_price,
            stock,
            units_sold: 0,
            units_restocked: 0,
            low_stock: stock < params.low_stock_threshold,
            restock_pending: false,
            restock_requested: false,
            price_changed_at: None,
            sold_since_tick: 0,
            restocked_since_tick: 0,
            demand_window: VecDeque::with_capacity(params.demand_window_ticks),
            supply_window: VecDeque::with_capacity(params.demand_window_ticks),
        }
    }

    #[inline]
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn base_price(&self) -> Money {
        self.base_price
    }

    pub fn price(&self) -> Money {
        self.price
    }

    /// Stock as last reported by the ledger.
    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn units_sold(&self) -> u64 {
        self.units_sold
    }

    pub fn is_low_stock(&self) -> bool {
        self.low_stock
    }

    pub fn restock_pending(&self) -> bool {
        self.restock_pending
    }

    /// `(lowest, highest)` price the drift may reach.
    pub fn price_band(&self, band: f64) -> (Money, Money) {
        let base = self.base_price.as_dollars();
        (
            Money::from_dollars(base * (1.0 - band)),
            Money::from_dollars(base * (1.0 + band)),
        )
    }

    fn push_window(window: &mut VecDeque<u64>, value: u64, len: usize) {
        if window.len() == len {
            window.pop_front();
        }
        window.push_back(value);
    }

    fn window_mean(window: &VecDeque<u64>) -> f64 {
        if window.is_empty() {
            return 0.0;
        }
        window.iter().sum::<u64>() as f64 / window.len() as f64
    }

    /// Next price under the drift model.
    pub fn drifted_price(&self, params: &StoreParams) -> Money {
        let demand = Self::window_mean(&self.demand_window);
        let supply = Self::window_mean(&self.supply_window);
        let base = self.base_price.as_dollars();
        let lo = base * (1.0 - params.price_band);
        let hi = base * (1.0 + params.price_band);

        let target = (base * (1.0 + params.price_drift_gain * (demand - supply))).clamp(lo, hi);
        let current = self.price.as_dollars();
        let next = (current + params.price_nudge * (target - current)).clamp(lo, hi);
        Money::from_dollars(next)
    }

    fn drift(&mut self, now: Tick, params: &StoreParams) -> Option<Envelope> {
        let len = params.demand_window_ticks.max(1);
        Self::push_window(&mut self.demand_window, std::mem::take(&mut self.sold_since_tick), len);
        Self::push_window(
            &mut self.supply_window,
            std::mem::take(&mut self.restocked_since_tick),
            len,
        );

        let next = self.drifted_price(params);
        if next == self.price {
            return None;
        }
        debug!(item = %self.id, from = %self.price, to = %next, "price drift");
        self.price = next;
        self.price_changed_at = Some(now);
        Some(Envelope::new(self.id, Address::LEDGER, Payload::PriceChange {
            item:  self.id,
            price: next,
        }))
    }

    fn restock_trigger(&mut self, params: &StoreParams) -> Option<Envelope> {
        if !self.low_stock || self.restock_pending || self.restock_requested {
            return None;
        }
        self.restock_requested = true;
        let priority = if self.stock == 0 { Priority::URGENT } else { Priority::HIGH };
        debug!(item = %self.id, stock = self.stock, "requesting restock");
        Some(
            Envelope::new(self.id, Address::ANY_EMPLOYEE, Payload::RestockRequest {
                item:     self.id,
                quantity: params.restock_quantity,
            })
            .with_priority(priority),
        )
    }

    fn apply_update(
        &mut self,
        published:       Tick,
        stock:           u32,
        price:           Money,
        units_sold:      u64,
        units_restocked: u64,
        restock_pending: bool,
        params:          &StoreParams,
    ) {
        self.sold_since_tick += units_sold.saturating_sub(self.units_sold);
        let delivered = units_restocked.saturating_sub(self.units_restocked);
        self.restocked_since_tick += delivered;

        self.stock = stock;
        if self.price_changed_at.is_none_or(|changed| published > changed) {
            self.price = price;
        }
        self.units_sold = units_sold;
        self.units_restocked = units_restocked;
        self.restock_pending = restock_pending;
        self.low_stock = stock < params.low_stock_threshold;
        if restock_pending || delivered > 0 {
            self.restock_requested = false;
        }
    }
}

impl Behavior for InventoryItem {
    fn actor_id(&self) -> ActorId {
        ActorId::Item(self.id)
    }

    fn tick(&mut self, ctx: &TickContext<'_>) -> Vec<Envelope> {
        let mut out = Vec::new();
        out.extend(self.drift(ctx.tick, ctx.params));
        out.extend(self.restock_trigger(ctx.params));
        out
    }

    fn receive(&mut self, message: &Message, ctx: &TickContext<'_>) -> Vec<Envelope> {
        if let Payload::InventoryUpdate {
            item,
            stock,
            price,
            units_sold,
            units_restocked,
            restock_pending,
        } = message.payload()
        {
            if *item == self.id {
                self.apply_update(
                    message.created(),
                    *stock,
                    *price,
                    *units_sold,
                    *units_restocked,
                    *restock_pending,
                    ctx.params,
                );
            }
        }
        vec![]
    }
}
