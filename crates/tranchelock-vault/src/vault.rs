//! The buy-and-lock vault.
//!
//! Purchases swap a caller's value into the target asset and lock the
//! proceeds in a new tranche. Claims pay out every matured tranche at the
//! principal's cursor. Bank and exchange are borrowed per call, so nothing
//! can call back into the vault while an operation is running.

use std::collections::HashSet;

use serde::Serialize;
use tranchelock_exchange::{Exchange, SwapInput};
use tranchelock_ledger::{CustodyAudit, VestingLedger};
use tranchelock_types::{
    AccountId, Amount, AssetTransfer, Purchase, Receipt, ReceiptKind, Result, Route, Settlement,
    Timestamp, TranchelockError, VaultConfig, constants,
};

use crate::adapter::{Acquisition, ExchangeAdapter};
use crate::controller::Controller;

#[derive(Serialize)]
struct LockDurationChange {
    changed_by: AccountId,
    previous_secs: u64,
    lock_duration_secs: u64,
}

#[derive(Serialize)]
struct PauseChange {
    changed_by: AccountId,
    paused: bool,
}

#[derive(Serialize)]
struct AuthorityChange {
    previous: AccountId,
    authority: AccountId,
}

/// Single-target buy-and-lock vault.
#[derive(Debug, Clone)]
pub struct BuyLockVault {
    config: VaultConfig,
    controller: Controller,
    adapter: ExchangeAdapter,
    ledger: VestingLedger,
    audit: CustodyAudit,
    receipts: Vec<Receipt>,
    next_sequence: u64,
}

impl BuyLockVault {
    /// Build a vault from a configuration.
    ///
    /// # Errors
    /// Whatever [`VaultConfig::validate`] rejects.
    pub fn new(config: VaultConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            target_asset = %config.target_asset,
            custody = %config.custody,
            exchange = %config.exchange,
            lock_duration_secs = config.lock_duration_secs,
            version = constants::VERSION,
            "Vault created"
        );
        Ok(Self {
            controller: Controller::from_config(&config),
            adapter: ExchangeAdapter::new(
                config.custody,
                config.exchange,
                config.target_asset.clone(),
            ),
            audit: CustodyAudit::new(config.custody, config.target_asset.clone()),
            ledger: VestingLedger::new(),
            receipts: Vec::new(),
            next_sequence: 0,
            config,
        })
    }

    // -----------------------------------------------------------------
    // Purchases
    // -----------------------------------------------------------------

    /// Swap `amount_in` of `route[0]`, pulled from `caller` via its
    /// allowance to custody, into the target and lock the proceeds.
    #[allow(clippy::too_many_arguments)]
    pub fn buy_with_asset<B, X>(
        &mut self,
        bank: &mut B,
        exchange: &mut X,
        caller: AccountId,
        amount_in: Amount,
        min_amount_out: Amount,
        route: &Route,
        deadline: Timestamp,
        now: Timestamp,
    ) -> Result<Purchase>
    where
        B: AssetTransfer,
        X: Exchange,
    {
        self.purchase(
            bank,
            exchange,
            &Acquisition {
                caller,
                input: SwapInput::Asset,
                amount_in,
                min_amount_out,
                route,
                deadline,
                now,
            },
        )
    }

    /// Swap `value` of the native currency attached by `caller` into the
    /// target and lock the proceeds.
    #[allow(clippy::too_many_arguments)]
    pub fn buy_with_native<B, X>(
        &mut self,
        bank: &mut B,
        exchange: &mut X,
        caller: AccountId,
        value: Amount,
        min_amount_out: Amount,
        route: &Route,
        deadline: Timestamp,
        now: Timestamp,
    ) -> Result<Purchase>
    where
        B: AssetTransfer,
        X: Exchange,
    {
        self.purchase(
            bank,
            exchange,
            &Acquisition {
                caller,
                input: SwapInput::Native,
                amount_in: value,
                min_amount_out,
                route,
                deadline,
                now,
            },
        )
    }

    /// [`Self::buy_with_asset`] along the configured default route.
    ///
    /// # Errors
    /// `ExchangeRejected` if no default route is configured.
    #[allow(clippy::too_many_arguments)]
    pub fn buy_with_default_route<B, X>(
        &mut self,
        bank: &mut B,
        exchange: &mut X,
        caller: AccountId,
        amount_in: Amount,
        min_amount_out: Amount,
        deadline: Timestamp,
        now: Timestamp,
    ) -> Result<Purchase>
    where
        B: AssetTransfer,
        X: Exchange,
    {
        self.controller.ensure_not_paused()?;
        let route = self
            .config
            .default_route
            .clone()
            .ok_or_else(|| TranchelockError::ExchangeRejected {
                reason: "no default route configured".into(),
            })?;
        self.buy_with_asset(
            bank,
            exchange,
            caller,
            amount_in,
            min_amount_out,
            &route,
            deadline,
            now,
        )
    }

    fn purchase<B, X>(
        &mut self,
        bank: &mut B,
        exchange: &mut X,
        order: &Acquisition<'_>,
    ) -> Result<Purchase>
    where
        B: AssetTransfer,
        X: Exchange,
    {
        self.controller.ensure_not_paused()?;
        self.adapter.validate_route(order.route)?;
        let source_asset = order.source_asset()?;

        let amount_out = self.adapter.acquire(bank, exchange, order)?;
        let tranche_index = self.ledger.append(
            order.caller,
            amount_out,
            order.now,
            self.controller.lock_duration(),
        )?;
        let matures_at = self
            .ledger
            .tranches(order.caller)
            .get(tranche_index)
            .map_or(order.now, |tranche| tranche.matures_at);

        let purchase = Purchase {
            principal: order.caller,
            source_asset,
            amount_in: order.amount_in,
            amount_out,
            tranche_index,
            matures_at,
        };
        self.record(ReceiptKind::Purchased, &purchase, order.now)?;

        tracing::info!(
            principal = %purchase.principal,
            source = %purchase.source_asset,
            amount_in = purchase.amount_in,
            amount_out = purchase.amount_out,
            tranche = tranche_index,
            matures_at = %matures_at,
            "Purchase locked"
        );
        Ok(purchase)
    }

    // -----------------------------------------------------------------
    // Claims
    // -----------------------------------------------------------------

    /// Pay `principal` every matured tranche at its cursor.
    ///
    /// Not gated by pause. If the payout fails the settlement is reverted,
    /// so the same tranches can be claimed again.
    ///
    /// # Errors
    /// - `NoUnlockableAmount` if nothing has matured since the last claim
    /// - `CustodyInvariantViolation` if custody cannot cover the payout
    /// - whatever the bank returns for a failed transfer
    pub fn claim<B: AssetTransfer>(
        &mut self,
        bank: &mut B,
        principal: AccountId,
        now: Timestamp,
    ) -> Result<Settlement> {
        let (amount, _) = self.ledger.unlockable_amount(principal, now);
        if amount == 0 {
            return Err(TranchelockError::NoUnlockableAmount { principal });
        }
        self.audit.ensure_covers(bank, amount)?;
        self.settle_and_pay(bank, principal, now)
    }

    /// Claim for each principal in order, skipping those with nothing
    /// matured. Duplicates are claimed once. An empty result is not an
    /// error.
    ///
    /// All or nothing: if one payout fails, the payouts already made in
    /// this batch are rolled back and their tranches reopened.
    ///
    /// # Errors
    /// `CustodyInvariantViolation` if custody cannot cover the combined
    /// payout; nothing is settled in that case. A failed transfer is
    /// returned after the rollback.
    pub fn claim_many<B: AssetTransfer>(
        &mut self,
        bank: &mut B,
        principals: &[AccountId],
        now: Timestamp,
    ) -> Result<Vec<Settlement>> {
        let mut seen = HashSet::with_capacity(principals.len());
        let unique: Vec<AccountId> = principals
            .iter()
            .copied()
            .filter(|principal| seen.insert(*principal))
            .collect();

        let mut total: Amount = 0;
        for &principal in &unique {
            let (amount, _) = self.ledger.unlockable_amount(principal, now);
            total = total
                .checked_add(amount)
                .ok_or(TranchelockError::ArithmeticOverflow)?;
        }
        self.audit.ensure_covers(bank, total)?;

        let receipts_before = self.receipts.len();
        let sequence_before = self.next_sequence;
        let mut settlements = Vec::with_capacity(unique.len());
        for &principal in &unique {
            match self.settle_and_pay(bank, principal, now) {
                Ok(settlement) => settlements.push(settlement),
                Err(TranchelockError::NoUnlockableAmount { .. }) => {
                    tracing::debug!(principal = %principal, "Nothing unlockable, skipped");
                }
                Err(err) => {
                    self.roll_back_payouts(bank, &settlements)?;
                    self.receipts.truncate(receipts_before);
                    self.next_sequence = sequence_before;
                    tracing::warn!(
                        principal = %principal,
                        rolled_back = settlements.len(),
                        error = %err,
                        "Batch claim failed, rolled back"
                    );
                    return Err(err);
                }
            }
        }
        tracing::info!(
            requested = principals.len(),
            settled = settlements.len(),
            total,
            "Batch claim complete"
        );
        Ok(settlements)
    }

    fn settle_and_pay<B: AssetTransfer>(
        &mut self,
        bank: &mut B,
        principal: AccountId,
        now: Timestamp,
    ) -> Result<Settlement> {
        let settlement = self.ledger.settle(principal, now)?;
        if let Err(err) = self.pay_out(bank, &settlement) {
            self.ledger.revert(&settlement)?;
            tracing::warn!(
                principal = %principal,
                amount = settlement.amount,
                error = %err,
                "Payout failed, settlement reverted"
            );
            return Err(err);
        }
        Ok(settlement)
    }

    /// Return each payout to custody and reopen its tranches, newest first.
    fn roll_back_payouts<B: AssetTransfer>(
        &mut self,
        bank: &mut B,
        paid: &[Settlement],
    ) -> Result<()> {
        for settlement in paid.iter().rev() {
            bank.transfer(
                settlement.principal,
                self.config.custody,
                &self.config.target_asset,
                settlement.amount,
            )
            .map_err(|err| TranchelockError::CustodyInvariantViolation {
                reason: format!(
                    "cannot roll back payout of {} to {}: {err}",
                    settlement.amount, settlement.principal
                ),
            })?;
            self.ledger.revert(settlement)?;
        }
        Ok(())
    }

    /// Transfer then record. The receipt is built first so nothing can
    /// fail after the transfer.
    fn pay_out<B: AssetTransfer>(&mut self, bank: &mut B, settlement: &Settlement) -> Result<()> {
        let receipt = Receipt::new(
            ReceiptKind::Claimed,
            self.next_sequence,
            settlement,
            settlement.settled_at,
        )?;
        bank.transfer(
            self.config.custody,
            settlement.principal,
            &self.config.target_asset,
            settlement.amount,
        )?;
        self.next_sequence += 1;
        self.receipts.push(receipt);
        tracing::info!(
            principal = %settlement.principal,
            amount = settlement.amount,
            tranches = settlement.tranches,
            cursor = settlement.cursor,
            "Claimed"
        );
        Ok(())
    }

    // -----------------------------------------------------------------
    // Administration
    // -----------------------------------------------------------------

    /// Change the lock duration applied to future purchases.
    pub fn set_lock_duration(&mut self, caller: AccountId, secs: u64, now: Timestamp) -> Result<()> {
        let previous_secs = self.controller.set_lock_duration(caller, secs)?;
        self.record(
            ReceiptKind::LockDurationChanged,
            &LockDurationChange {
                changed_by: caller,
                previous_secs,
                lock_duration_secs: secs,
            },
            now,
        )?;
        tracing::info!(previous_secs, lock_duration_secs = secs, "Lock duration changed");
        Ok(())
    }

    pub fn pause(&mut self, caller: AccountId, now: Timestamp) -> Result<()> {
        self.controller.pause(caller)?;
        self.record(
            ReceiptKind::Paused,
            &PauseChange {
                changed_by: caller,
                paused: true,
            },
            now,
        )?;
        tracing::info!(by = %caller, "Purchases paused");
        Ok(())
    }

    pub fn unpause(&mut self, caller: AccountId, now: Timestamp) -> Result<()> {
        self.controller.unpause(caller)?;
        self.record(
            ReceiptKind::Unpaused,
            &PauseChange {
                changed_by: caller,
                paused: false,
            },
            now,
        )?;
        tracing::info!(by = %caller, "Purchases resumed");
        Ok(())
    }

    pub fn transfer_authority(
        &mut self,
        caller: AccountId,
        new_authority: AccountId,
        now: Timestamp,
    ) -> Result<()> {
        let previous = self.controller.transfer_authority(caller, new_authority)?;
        self.record(
            ReceiptKind::AuthorityTransferred,
            &AuthorityChange {
                previous,
                authority: new_authority,
            },
            now,
        )?;
        tracing::info!(previous = %previous, authority = %new_authority, "Authority transferred");
        Ok(())
    }

    fn record<T: Serialize>(&mut self, kind: ReceiptKind, payload: &T, now: Timestamp) -> Result<()> {
        let receipt = Receipt::new(kind, self.next_sequence, payload, now)?;
        self.next_sequence += 1;
        self.receipts.push(receipt);
        Ok(())
    }

    // -----------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------

    #[must_use]
    pub fn locked_amount(&self, principal: AccountId) -> Amount {
        self.ledger.locked_amount(principal)
    }

    /// `(amount, tranche count)` a claim at `now` would pay.
    #[must_use]
    pub fn unlockable_amount(&self, principal: AccountId, now: Timestamp) -> (Amount, usize) {
        self.ledger.unlockable_amount(principal, now)
    }

    /// Current lock duration in seconds.
    #[must_use]
    pub fn lock_duration(&self) -> u64 {
        self.controller.lock_duration_secs()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.controller.is_paused()
    }

    #[must_use]
    pub fn authority(&self) -> AccountId {
        self.controller.authority()
    }

    /// Append-only audit trail, oldest first.
    #[must_use]
    pub fn receipts(&self) -> &[Receipt] {
        &self.receipts
    }

    #[must_use]
    pub fn ledger(&self) -> &VestingLedger {
        &self.ledger
    }

    #[must_use]
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Check that custody holds at least the ledger's locked total.
    pub fn verify_custody<B: AssetTransfer>(&self, bank: &B) -> Result<()> {
        self.audit.verify(bank, &self.ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use tranchelock_types::AssetId;
    use tranchelock_types::constants::SECONDS_PER_DAY;

    fn t0() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn config() -> VaultConfig {
        VaultConfig::new(
            AccountId::deterministic("authority"),
            AccountId::deterministic("custody"),
            AssetId::new("GOV"),
            AccountId::deterministic("router"),
        )
    }

    #[test]
    fn new_rejects_invalid_config() {
        let bad = config().with_lock_duration_secs(31 * SECONDS_PER_DAY);
        assert!(matches!(
            BuyLockVault::new(bad),
            Err(TranchelockError::InvalidLockDuration { .. })
        ));
    }

    #[test]
    fn admin_changes_leave_receipts() {
        let mut vault = BuyLockVault::new(config()).unwrap();
        let authority = vault.authority();

        vault.set_lock_duration(authority, 5 * SECONDS_PER_DAY, t0()).unwrap();
        vault.pause(authority, t0()).unwrap();
        vault.unpause(authority, t0() + Duration::hours(1)).unwrap();

        let kinds: Vec<ReceiptKind> = vault.receipts().iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ReceiptKind::LockDurationChanged,
                ReceiptKind::Paused,
                ReceiptKind::Unpaused
            ]
        );
        for (i, receipt) in vault.receipts().iter().enumerate() {
            assert_eq!(receipt.sequence, i as u64);
            assert!(receipt.verify());
        }
        assert_eq!(vault.lock_duration(), 5 * SECONDS_PER_DAY);
    }

    #[test]
    fn rejected_admin_call_leaves_no_receipt() {
        let mut vault = BuyLockVault::new(config()).unwrap();
        let mallory = AccountId::deterministic("mallory");
        assert!(vault.pause(mallory, t0()).is_err());
        assert!(vault.receipts().is_empty());
        assert!(!vault.is_paused());
    }

    #[test]
    fn claim_unknown_principal() {
        let mut vault = BuyLockVault::new(config()).unwrap();
        let mut bank = tranchelock_ledger::TokenBank::new();
        let stranger = AccountId::deterministic("stranger");
        assert_eq!(
            vault.claim(&mut bank, stranger, t0()).unwrap_err(),
            TranchelockError::NoUnlockableAmount {
                principal: stranger
            }
        );
        assert_eq!(vault.locked_amount(stranger), 0);
        assert!(vault.claim_many(&mut bank, &[stranger], t0()).unwrap().is_empty());
    }

    #[test]
    fn default_route_missing() {
        let mut vault = BuyLockVault::new(config()).unwrap();
        let mut bank = tranchelock_ledger::TokenBank::new();
        let mut router = tranchelock_exchange::ConstantProductRouter::new(
            AccountId::deterministic("router"),
            AssetId::new("WETH"),
        );
        let err = vault
            .buy_with_default_route(
                &mut bank,
                &mut router,
                AccountId::new(),
                10,
                0,
                t0(),
                t0(),
            )
            .unwrap_err();
        assert!(matches!(err, TranchelockError::ExchangeRejected { .. }));
    }
}
