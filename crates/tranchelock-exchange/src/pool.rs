//! Constant product pool math (x·y=k) with the fee taken on input.
//!
//! For an exact input `Δx`:
//! - `Δx_net = Δx · 997 / 1000`
//! - `Δy_out = Δx_net · y0 / (x0 + Δx_net)`
//!
//! evaluated as `Δx·997·y0 / (x0·1000 + Δx·997)` so that integer division
//! happens once, rounding down in the pool's favour.

use tranchelock_types::constants::{SWAP_FEE_DENOMINATOR, SWAP_FEE_NUMERATOR};
use tranchelock_types::{Amount, AssetId, Result, TranchelockError};

/// Output for an exact input against one pool.
///
/// # Errors
/// - `InsufficientInputAmount` if `amount_in` is zero
/// - `InsufficientLiquidity` if either reserve is empty
/// - `ArithmeticOverflow` if the intermediate products overflow
pub fn get_amount_out(amount_in: Amount, reserve_in: Amount, reserve_out: Amount) -> Result<Amount> {
    if amount_in == 0 {
        return Err(TranchelockError::InsufficientInputAmount);
    }
    if reserve_in == 0 || reserve_out == 0 {
        return Err(TranchelockError::InsufficientLiquidity {
            pair: "empty reserves".into(),
        });
    }

    let amount_in_with_fee = amount_in
        .checked_mul(SWAP_FEE_NUMERATOR)
        .ok_or(TranchelockError::ArithmeticOverflow)?;
    let numerator = amount_in_with_fee
        .checked_mul(reserve_out)
        .ok_or(TranchelockError::ArithmeticOverflow)?;
    let denominator = reserve_in
        .checked_mul(SWAP_FEE_DENOMINATOR)
        .and_then(|d| d.checked_add(amount_in_with_fee))
        .ok_or(TranchelockError::ArithmeticOverflow)?;

    Ok(numerator / denominator)
}

/// Two-asset reserve pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    asset_a: AssetId,
    asset_b: AssetId,
    reserve_a: Amount,
    reserve_b: Amount,
}

impl Pool {
    #[must_use]
    pub fn new(asset_a: AssetId, reserve_a: Amount, asset_b: AssetId, reserve_b: Amount) -> Self {
        Self {
            asset_a,
            asset_b,
            reserve_a,
            reserve_b,
        }
    }

    /// Reserve held for `asset`, zero if the pool does not trade it.
    #[must_use]
    pub fn reserve_of(&self, asset: &AssetId) -> Amount {
        if *asset == self.asset_a {
            self.reserve_a
        } else if *asset == self.asset_b {
            self.reserve_b
        } else {
            0
        }
    }

    /// `(reserve_in, reserve_out)` when `input` is sold into the pool.
    #[must_use]
    pub fn reserves_for(&self, input: &AssetId) -> (Amount, Amount) {
        if *input == self.asset_a {
            (self.reserve_a, self.reserve_b)
        } else {
            (self.reserve_b, self.reserve_a)
        }
    }

    /// Output for selling `amount_in` of `input`.
    pub fn amount_out(&self, input: &AssetId, amount_in: Amount) -> Result<Amount> {
        let (reserve_in, reserve_out) = self.reserves_for(input);
        get_amount_out(amount_in, reserve_in, reserve_out).map_err(|err| match err {
            TranchelockError::InsufficientLiquidity { .. } => {
                TranchelockError::InsufficientLiquidity {
                    pair: self.symbol(),
                }
            }
            other => other,
        })
    }

    /// Add to both reserves.
    pub fn deposit(&mut self, asset_a: &AssetId, amount_a: Amount, amount_b: Amount) -> Result<()> {
        let (add_a, add_b) = if *asset_a == self.asset_a {
            (amount_a, amount_b)
        } else {
            (amount_b, amount_a)
        };
        let reserve_a = self
            .reserve_a
            .checked_add(add_a)
            .ok_or(TranchelockError::ArithmeticOverflow)?;
        let reserve_b = self
            .reserve_b
            .checked_add(add_b)
            .ok_or(TranchelockError::ArithmeticOverflow)?;
        self.reserve_a = reserve_a;
        self.reserve_b = reserve_b;
        Ok(())
    }

    /// Record a completed trade: `amount_in` of `input` in, `amount_out` out.
    pub fn apply_swap(&mut self, input: &AssetId, amount_in: Amount, amount_out: Amount) -> Result<()> {
        let (reserve_in, reserve_out) = if *input == self.asset_a {
            (&mut self.reserve_a, &mut self.reserve_b)
        } else {
            (&mut self.reserve_b, &mut self.reserve_a)
        };
        let new_in = reserve_in
            .checked_add(amount_in)
            .ok_or(TranchelockError::ArithmeticOverflow)?;
        let new_out = reserve_out
            .checked_sub(amount_out)
            .ok_or(TranchelockError::InsufficientLiquidity {
                pair: format!("{}/{}", self.asset_a, self.asset_b),
            })?;
        *reserve_in = new_in;
        *reserve_out = new_out;
        Ok(())
    }

    /// Product of the reserves; never decreases across swaps.
    #[must_use]
    pub fn invariant(&self) -> Option<Amount> {
        self.reserve_a.checked_mul(self.reserve_b)
    }

    #[must_use]
    pub fn symbol(&self) -> String {
        format!("{}/{}", self.asset_a, self.asset_b)
    }
}
