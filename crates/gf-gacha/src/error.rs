//! Gacha error types

use gf_core::GfError;
use gf_state::WalletError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GachaError {
    #[error("Pool total weight is stale: call recalculate() after modifying entries")]
    StalePool,

    #[error(transparent)]
    InsufficientFunds(#[from] WalletError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] GfError),
}

pub type GachaResult<T> = Result<T, GachaError>;
