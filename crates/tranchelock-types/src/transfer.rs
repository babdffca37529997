//! The asset-transfer capability consumed by the vault and the exchange.
//!
//! Models an allowance-based token ledger: holders push value with
//! [`AssetTransfer::transfer`]; a spender pulls value it was authorized for
//! with [`AssetTransfer::transfer_from`]. The native currency is addressed
//! as [`AssetId::native`](crate::AssetId::native).

use crate::{AccountId, Amount, AssetId, Result};

/// Pull/push transfer capability with balance and allowance queries.
///
/// Implementations must apply each mutation atomically: a call that returns
/// an error leaves every balance and allowance unchanged.
pub trait AssetTransfer {
    /// Balance of `holder` in `asset`.
    fn balance_of(&self, holder: AccountId, asset: &AssetId) -> Amount;

    /// How much of `owner`'s `asset` the `spender` may still pull.
    fn allowance(&self, owner: AccountId, spender: AccountId, asset: &AssetId) -> Amount;

    /// Set (not increase) the allowance of `spender` over `owner`'s `asset`.
    fn approve(&mut self, owner: AccountId, spender: AccountId, asset: &AssetId, amount: Amount);

    /// Push `amount` from `from` to `to`.
    ///
    /// # Errors
    /// `InsufficientBalance` if `from` holds less than `amount`.
    fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<()>;

    /// Pull `amount` from `owner` to `to`, spending `spender`'s allowance.
    ///
    /// # Errors
    /// - `InsufficientAuthorization` if the allowance is below `amount`
    /// - `InsufficientBalance` if `owner` holds less than `amount`
    fn transfer_from(
        &mut self,
        spender: AccountId,
        owner: AccountId,
        to: AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<()>;
}
