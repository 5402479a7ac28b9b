use shop_core::{CustomerId, ItemId, Money, TransactionId};
use thiserror::Error;

/// Operational errors from ledger calls with a bad argument.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("item {0} is not in the catalog")]
    UnknownItem(ItemId),

    #[error("price {price} for {item} must be positive")]
    InvalidPrice { item: ItemId, price: Money },
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// An internal-consistency failure.  Any of these means a bug: the run must
/// stop and dump its state.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("recorded revenue {recorded} differs from transaction sum {recomputed}")]
    RevenueMismatch { recorded: Money, recomputed: Money },

    #[error("{id}: subtotal/discount/total do not add up")]
    TransactionArithmetic { id: TransactionId },

    #[error("{item}: units sold {recorded} differs from transaction log {recomputed}")]
    SalesMismatch { item: ItemId, recorded: u64, recomputed: u64 },

    #[error("{item}: stock {stock} differs from initial {initial} + restocked {restocked} - sold {sold}")]
    StockAccounting { item: ItemId, stock: u32, initial: u32, restocked: u64, sold: u64 },

    #[error("{customer}: recorded spend {recorded} differs from transaction log {recomputed}")]
    CustomerSpendMismatch { customer: CustomerId, recorded: Money, recomputed: Money },
}
