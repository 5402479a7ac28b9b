//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `ShopError` as one
//! variant where configuration problems can surface.

use thiserror::Error;

use crate::{CustomerId, EmployeeId, ItemId};

/// The top-level error type for `shop-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum ShopError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("customer {0} not found")]
    CustomerNotFound(CustomerId),

    #[error("employee {0} not found")]
    EmployeeNotFound(EmployeeId),

    #[error("item {0} not found")]
    ItemNotFound(ItemId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `shop-*` crates.
pub type ShopResult<T> = Result<T, ShopError>;
