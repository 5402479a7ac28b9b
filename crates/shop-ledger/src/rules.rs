//! The business-rule collaborator consulted before certain commits.
//!
//! The ledger calls [`RuleEvaluator::evaluate`] for bulk purchases only.  The
//! call is synchronous and must return promptly; an evaluator that cannot
//! answer returns `Err(RuleUnavailable)` and the ledger falls back to its
//! default pricing.

use shop_core::{CustomerId, Money, Tick};
use thiserror::Error;

use crate::LineItem;

/// The facts of a pending sale, priced but not yet committed.
#[derive(Debug)]
pub struct RuleEvent<'a> {
    pub customer:       CustomerId,
    pub lines:          &'a [LineItem],
    pub total_quantity: u32,
    pub subtotal:       Money,
    /// Standing customer discount before any rule adjustment.
    pub discount_bps:   u32,
    pub tick:           Tick,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RuleVerdict {
    Allow,
    Deny(String),
    /// Proceed, record `note` on the transaction, and add
    /// `extra_discount_bps` to the customer's discount.
    Annotate { note: String, extra_discount_bps: u32 },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("rule service unavailable: {0}")]
pub struct RuleUnavailable(pub String);

pub trait RuleEvaluator: Send {
    fn evaluate(&mut self, event: &RuleEvent<'_>) -> Result<RuleVerdict, RuleUnavailable>;
}

/// Tiered bulk discounts with a hard cap on basket size.
///
/// Tiers are `(min_units, extra_bps)`; the highest tier reached applies.
#[derive(Clone, Debug)]
pub struct BulkDiscountRules {
    pub tiers:     Vec<(u32, u32)>,
    pub max_units: u32,
}

impl Default for BulkDiscountRules {
    fn default() -> Self {
        Self {
            tiers:     vec![(5, 250), (10, 500)],
            max_units: 50,
        }
    }
}

impl RuleEvaluator for BulkDiscountRules {
    fn evaluate(&mut self, event: &RuleEvent<'_>) -> Result<RuleVerdict, RuleUnavailable> {
        if event.total_quantity > self.max_units {
            return Ok(RuleVerdict::Deny(format!(
                "{} units exceeds the {}-unit limit",
                event.total_quantity, self.max_units
            )));
        }
        let tier = self
            .tiers
            .iter()
            .filter(|(min, _)| event.total_quantity >= *min)
            .max_by_key(|(min, _)| *min);
        Ok(match tier {
            Some(&(min, bps)) => RuleVerdict::Annotate {
                note:               format!("bulk-{min}"),
                extra_discount_bps: bps,
            },
            None => RuleVerdict::Allow,
        })
    }
}
