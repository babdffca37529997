//! # Tranche: one purchased-and-locked amount of the target asset
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────┐  now >= matures_at  ┌─────────┐  settle   ┌─────────┐
//!   │ LOCKED ├────────────────────▶│ MATURED ├──────────▶│ SETTLED │
//!   └────────┘    (implicit)       └─────────┘           └─────────┘
//! ```
//!
//! Maturity is never stored: it is derived from `matures_at` and the time
//! supplied by the caller. Settlement is terminal and recorded in
//! `settled_at`; settled tranches remain in the ledger for auditability.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, AssetId, Result, Timestamp, TranchelockError};

/// Observable lifecycle state of a tranche at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrancheState {
    /// Funds are held and not yet claimable.
    Locked,
    /// `matures_at` has passed; funds are claimable.
    Matured,
    /// Funds were paid out. **Irreversible.**
    Settled,
}

impl TrancheState {
    /// Can a tranche move from this state to `target`?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Locked, Self::Matured) | (Self::Matured, Self::Settled)
        )
    }
}

impl fmt::Display for TrancheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "LOCKED"),
            Self::Matured => write!(f, "MATURED"),
            Self::Settled => write!(f, "SETTLED"),
        }
    }
}

/// A locked amount with a maturity fixed at creation.
///
/// `amount` and `matures_at` never change after construction, so a later
/// change of the vault's lock duration cannot move an existing maturity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tranche {
    /// Target-asset amount acquired by the purchase.
    pub amount: Amount,
    /// When the purchase happened.
    pub created_at: Timestamp,
    /// When the amount becomes claimable.
    pub matures_at: Timestamp,
    /// When the amount was paid out, if it has been.
    pub settled_at: Option<Timestamp>,
}

impl Tranche {
    /// Create a tranche maturing `lock_duration` after `created_at`.
    ///
    /// # Errors
    /// - `ZeroAmount` if `amount` is zero
    /// - `ArithmeticOverflow` if the maturity is not representable
    pub fn new(amount: Amount, created_at: Timestamp, lock_duration: Duration) -> Result<Self> {
        if amount == 0 {
            return Err(TranchelockError::ZeroAmount);
        }
        let matures_at = created_at
            .checked_add_signed(lock_duration)
            .ok_or(TranchelockError::ArithmeticOverflow)?;
        Ok(Self {
            amount,
            created_at,
            matures_at,
            settled_at: None,
        })
    }

    #[must_use]
    pub fn is_matured(&self, now: Timestamp) -> bool {
        self.matures_at <= now
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.settled_at.is_some()
    }

    #[must_use]
    pub fn state(&self, now: Timestamp) -> TrancheState {
        if self.is_settled() {
            TrancheState::Settled
        } else if self.is_matured(now) {
            TrancheState::Matured
        } else {
            TrancheState::Locked
        }
    }

    /// Record the payout.
    ///
    /// # Errors
    /// Returns `CustodyInvariantViolation` if the tranche is not in the
    /// `Matured` state at `now`.
    pub fn mark_settled(&mut self, now: Timestamp) -> Result<()> {
        let state = self.state(now);
        if !state.can_transition_to(TrancheState::Settled) {
            return Err(TranchelockError::CustodyInvariantViolation {
                reason: format!("cannot settle tranche in state {state}"),
            });
        }
        self.settled_at = Some(now);
        Ok(())
    }
}

/// Outcome of settling one principal's matured tranches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Whose tranches were settled.
    pub principal: AccountId,
    /// Total paid out.
    pub amount: Amount,
    /// How many tranches were included.
    pub tranches: usize,
    /// Cursor position after settlement.
    pub cursor: usize,
    /// When the settlement happened.
    pub settled_at: Timestamp,
}

/// Outcome of a successful purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    /// Who bought.
    pub principal: AccountId,
    /// Asset given up (the first route hop, or the native currency).
    pub source_asset: AssetId,
    /// Amount of the source asset given up.
    pub amount_in: Amount,
    /// Target-asset amount locked.
    pub amount_out: Amount,
    /// Position of the new tranche in the principal's ledger.
    pub tranche_index: usize,
    /// When the new tranche matures.
    pub matures_at: Timestamp,
}
