//! Read-only tick state passed to every actor callback.

use shop_core::{Category, ItemId, Money, StoreParams, Tick};

/// One row of the catalog as the ledger reported it at the start of the tick.
///
/// This is a copy.  A customer that picks an item because `stock > 0` here
/// may still be refused at commit time; the ledger re-reads its own table.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogEntry {
    pub item:     ItemId,
    pub category: Category,
    pub price:    Money,
    pub stock:    u32,
}

/// A read-only snapshot shared by all actor callbacks within one tick.
///
/// Built once per tick by the scheduler.  All borrows live for the duration
/// of that tick; the scheduler never mutates the catalog or the params while a
/// `TickContext` is live.
#[derive(Copy, Clone, Debug)]
pub struct TickContext<'a> {
    /// Current simulation tick.
    pub tick: Tick,

    /// Store tuning knobs.
    pub params: &'a StoreParams,

    /// Catalog view, indexed by `ItemId`.
    pub catalog: &'a [CatalogEntry],
}

impl<'a> TickContext<'a> {
    #[inline]
    pub fn new(tick: Tick, params: &'a StoreParams, catalog: &'a [CatalogEntry]) -> Self {
        Self { tick, params, catalog }
    }

    /// Cheapest listed price, in stock or not.
    pub fn cheapest_price(&self) -> Option<Money> {
        self.catalog.iter().map(|e| e.price).min()
    }
}
