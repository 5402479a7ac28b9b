//! Purchase intents and commit rejection reasons.
//!
//! These are the values that travel from a customer, through an employee, to
//! the ledger, and back.  They live here rather than in `shop-ledger` so the
//! message bus can carry them without depending on the ledger.

use std::fmt;

use crate::{CustomerId, ItemId, Money, Tick};

/// One requested line of a basket.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineRequest {
    pub item:     ItemId,
    pub quantity: u32,
}

/// What a customer wants to buy.
///
/// Prices are deliberately absent: the ledger prices every line from its own
/// table at the instant of commit.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PurchaseIntent {
    pub customer:     CustomerId,
    pub lines:        Vec<LineRequest>,
    /// The customer's total budget for the run.  The ledger subtracts what
    /// it has already recorded against this customer.
    pub budget:       Money,
    /// Standing discount in basis points.
    pub discount_bps: u32,
    /// Tick the customer issued the request; used to measure wait time.
    pub requested_at: Tick,
}

impl PurchaseIntent {
    /// Total requested units across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

/// Why the ledger refused a purchase.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RejectReason {
    /// At least one line exceeds the authoritative stock (or names an item
    /// the ledger does not know).
    OutOfStock { item: ItemId },
    /// The discounted total exceeds the customer's remaining budget.
    InsufficientBudget { total: Money, available: Money },
    /// The rule-evaluation collaborator vetoed the sale.
    RuleDenied { reason: String },
    /// Nothing to buy.
    EmptyBasket,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::OutOfStock { item } => write!(f, "out of stock: {item}"),
            RejectReason::InsufficientBudget { total, available } => {
                write!(f, "insufficient budget: total {total}, available {available}")
            }
            RejectReason::RuleDenied { reason } => write!(f, "denied by rule: {reason}"),
            RejectReason::EmptyBasket => f.write_str("empty basket"),
        }
    }
}
