//! In-memory asset transfer capability.
//!
//! Tracks per-(holder, asset) balances and per-(owner, spender, asset)
//! allowances. All mutations are atomic: either the full operation succeeds
//! or every balance and allowance is unchanged.

use std::collections::HashMap;

use tranchelock_types::{
    AccountId, Amount, AssetId, AssetTransfer, Result, TranchelockError,
};

/// Allowance-based token ledger used by the vault and the reference
/// exchange.
#[derive(Debug, Clone, Default)]
pub struct TokenBank {
    /// Per-(holder, asset) balances.
    balances: HashMap<(AccountId, AssetId), Amount>,
    /// Per-(owner, spender, asset) allowances.
    allowances: HashMap<(AccountId, AccountId, AssetId), Amount>,
}

impl TokenBank {
    /// Create a new empty bank.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` out of thin air for `holder`.
    ///
    /// # Errors
    /// Returns `ArithmeticOverflow` if the balance would overflow.
    pub fn mint(&mut self, holder: AccountId, asset: &AssetId, amount: Amount) -> Result<()> {
        let entry = self.balances.entry((holder, asset.clone())).or_default();
        *entry = entry
            .checked_add(amount)
            .ok_or(TranchelockError::ArithmeticOverflow)?;
        Ok(())
    }

    /// Total supply of an asset across all holders.
    #[must_use]
    pub fn total_supply(&self, asset: &AssetId) -> Amount {
        self.balances
            .iter()
            .filter(|((_, a), _)| a == asset)
            .map(|(_, amount)| *amount)
            .sum()
    }

    fn debit_check(&self, holder: AccountId, asset: &AssetId, amount: Amount) -> Result<()> {
        let available = self.balance_of(holder, asset);
        if available < amount {
            return Err(TranchelockError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        Ok(())
    }

    fn credit_check(&self, holder: AccountId, asset: &AssetId, amount: Amount) -> Result<()> {
        self.balance_of(holder, asset)
            .checked_add(amount)
            .map(|_| ())
            .ok_or(TranchelockError::ArithmeticOverflow)
    }

    /// Move funds after both sides have been checked.
    fn apply_transfer(&mut self, from: AccountId, to: AccountId, asset: &AssetId, amount: Amount) {
        if from == to || amount == 0 {
            return;
        }
        if let Some(balance) = self.balances.get_mut(&(from, asset.clone())) {
            *balance -= amount;
        }
        *self.balances.entry((to, asset.clone())).or_default() += amount;
    }
}

impl AssetTransfer for TokenBank {
    fn balance_of(&self, holder: AccountId, asset: &AssetId) -> Amount {
        self.balances
            .get(&(holder, asset.clone()))
            .copied()
            .unwrap_or_default()
    }

    fn allowance(&self, owner: AccountId, spender: AccountId, asset: &AssetId) -> Amount {
        self.allowances
            .get(&(owner, spender, asset.clone()))
            .copied()
            .unwrap_or_default()
    }

    fn approve(&mut self, owner: AccountId, spender: AccountId, asset: &AssetId, amount: Amount) {
        if amount == 0 {
            self.allowances.remove(&(owner, spender, asset.clone()));
        } else {
            self.allowances
                .insert((owner, spender, asset.clone()), amount);
        }
    }

    fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<()> {
        self.debit_check(from, asset, amount)?;
        if from != to {
            self.credit_check(to, asset, amount)?;
        }
        self.apply_transfer(from, to, asset, amount);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: AccountId,
        owner: AccountId,
        to: AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<()> {
        let allowance = self.allowance(owner, spender, asset);
        if allowance < amount {
            return Err(TranchelockError::InsufficientAuthorization {
                needed: amount,
                allowance,
            });
        }
        self.debit_check(owner, asset, amount)?;
        if owner != to {
            self.credit_check(to, asset, amount)?;
        }

        self.approve(owner, spender, asset, allowance - amount);
        self.apply_transfer(owner, to, asset, amount);
        Ok(())
    }
}
