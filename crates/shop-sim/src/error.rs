use shop_core::{ShopError, Tick};
use shop_ledger::{InvariantViolation, LedgerError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] ShopError),

    #[error("ledger setup failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("invariant violated at {tick}: {source}")]
    Invariant {
        tick:   Tick,
        #[source]
        source: InvariantViolation,
    },
}

pub type SimResult<T> = Result<T, SimError>;
