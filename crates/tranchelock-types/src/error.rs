//! Error types for the Tranchelock vault.
//!
//! All errors use the `TL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Access control / configuration errors
//! - 2xx: Route and exchange errors
//! - 3xx: Asset transfer errors
//! - 4xx: Vesting ledger errors
//! - 9xx: General / internal errors

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AccountId, Amount, Timestamp};

/// Why a conversion route was rejected before any value moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteError {
    /// Fewer than two assets in the route.
    TooShort,
    /// The last asset is not the vault's target asset.
    WrongOutputAsset,
    /// The first asset is the target asset itself.
    InputEqualsOutput,
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort => write!(f, "route must contain at least two assets"),
            Self::WrongOutputAsset => write!(f, "route does not end in the target asset"),
            Self::InputEqualsOutput => write!(f, "route starts with the target asset"),
        }
    }
}

/// Central error enum for all Tranchelock operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranchelockError {
    // =================================================================
    // Access Control / Configuration Errors (1xx)
    // =================================================================
    /// The caller is not the vault authority.
    #[error("TL_ERR_100: Access denied for {caller}")]
    AccessDenied { caller: AccountId },

    /// Requested lock duration is above the configured maximum.
    #[error("TL_ERR_101: Invalid lock duration: {requested}s exceeds maximum {max}s")]
    InvalidLockDuration { requested: u64, max: u64 },

    /// A purchase was attempted while purchases are paused.
    #[error("TL_ERR_102: Purchases are paused")]
    Paused,

    /// Unpause was requested while purchases are running.
    #[error("TL_ERR_103: Purchases are not paused")]
    NotPaused,

    /// Invalid vault configuration.
    #[error("TL_ERR_104: Configuration error: {0}")]
    Configuration(String),

    // =================================================================
    // Route / Exchange Errors (2xx)
    // =================================================================
    /// The caller-supplied route failed validation.
    #[error("TL_ERR_200: Invalid route: {0}")]
    InvalidRoute(RouteError),

    /// The exchange refused the swap because its deadline passed.
    #[error("TL_ERR_201: Swap expired: deadline {deadline}, now {now}")]
    Expired { deadline: Timestamp, now: Timestamp },

    /// The realized output fell below the caller's floor.
    #[error("TL_ERR_202: Slippage exceeded: minimum {min_amount_out}, quoted {amount_out}")]
    SlippageExceeded {
        min_amount_out: Amount,
        amount_out: Amount,
    },

    /// Zero input, or an input too small to produce any output.
    #[error("TL_ERR_203: Insufficient input amount")]
    InsufficientInputAmount,

    /// A pool on the route has no usable reserves.
    #[error("TL_ERR_204: Insufficient liquidity for {pair}")]
    InsufficientLiquidity { pair: String },

    /// The exchange rejected the request for a reason of its own.
    #[error("TL_ERR_205: Exchange rejected swap: {reason}")]
    ExchangeRejected { reason: String },

    // =================================================================
    // Asset Transfer Errors (3xx)
    // =================================================================
    /// The owner has not granted enough allowance to the spender.
    #[error("TL_ERR_300: Insufficient authorization: need {needed}, allowance {allowance}")]
    InsufficientAuthorization { needed: Amount, allowance: Amount },

    /// The holder does not own enough of the asset.
    #[error("TL_ERR_301: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    // =================================================================
    // Vesting Ledger Errors (4xx)
    // =================================================================
    /// Claim with no matured, unsettled tranches.
    #[error("TL_ERR_400: No unlockable amount for {principal}")]
    NoUnlockableAmount { principal: AccountId },

    /// Tranches must carry a positive amount.
    #[error("TL_ERR_401: Tranche amount must be positive")]
    ZeroAmount,

    /// Custody no longer covers the locked total. Critical.
    #[error("TL_ERR_402: Custody invariant violation: {reason}")]
    CustodyInvariantViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Amount or timestamp arithmetic overflowed.
    #[error("TL_ERR_900: Arithmetic overflow")]
    ArithmeticOverflow,

    /// Serialization / deserialization error.
    #[error("TL_ERR_901: Serialization error: {0}")]
    Serialization(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, TranchelockError>;

impl From<serde_json::Error> for TranchelockError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<RouteError> for TranchelockError {
    fn from(err: RouteError) -> Self {
        Self::InvalidRoute(err)
    }
}
