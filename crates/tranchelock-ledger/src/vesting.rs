//! Vesting ledger: per-principal locked tranches and settlement cursor.
//!
//! Each principal owns an append-only sequence of [`Tranche`]s in purchase
//! order and a `cursor` marking the first unsettled one:
//!
//! ```text
//!   index:    0        1        2        3        4
//!           ┌────────┬────────┬────────┬────────┬────────┐
//!           │SETTLED │SETTLED │MATURED │MATURED │ LOCKED │
//!           └────────┴────────┴────────┴────────┴────────┘
//!                             ▲ cursor
//!                             └── unlockable = 2 + 3 ──┘ (stops at 4)
//! ```
//!
//! Invariants per principal:
//! - `0 <= cursor <= len`
//! - every tranche below `cursor` is settled, and was paid exactly once
//! - `locked_amount == Σ amount[cursor..]`, matured or not
//!
//! The scan stops at the first unmatured tranche. Maturities are
//! non-decreasing as long as the lock duration never shrinks between two
//! purchases of the same principal; if it does, a later tranche that has
//! already matured waits behind an earlier locked one.

use std::collections::HashMap;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tranchelock_types::{
    AccountId, Amount, Result, Settlement, Timestamp, Tranche, TranchelockError,
};

/// One principal's tranches and settlement cursor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "PrincipalSnapshot")]
pub struct PrincipalLedger {
    /// Tranches in purchase order. Never reordered or shrunk.
    tranches: Vec<Tranche>,
    /// Index of the first unsettled tranche.
    cursor: usize,
    /// Σ amount of tranches at index >= cursor.
    locked: Amount,
}

impl PrincipalLedger {
    /// All tranches ever created for this principal, settled ones included.
    #[must_use]
    pub fn tranches(&self) -> &[Tranche] {
        &self.tranches
    }

    /// Tranches not yet paid out.
    #[must_use]
    pub fn pending(&self) -> &[Tranche] {
        self.tranches.get(self.cursor..).unwrap_or_default()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tranches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tranches.is_empty()
    }

    /// Whether every tranche has been paid out.
    #[must_use]
    pub fn is_fully_settled(&self) -> bool {
        self.cursor == self.tranches.len()
    }

    /// Unsettled total, independent of maturity.
    #[must_use]
    pub fn locked_amount(&self) -> Amount {
        self.locked
    }

    /// Sum and count of the matured prefix of unsettled tranches.
    #[must_use]
    pub fn unlockable_amount(&self, now: Timestamp) -> (Amount, usize) {
        let mut amount: Amount = 0;
        let mut count = 0;
        for tranche in self.pending() {
            if !tranche.is_matured(now) {
                break;
            }
            amount = amount.saturating_add(tranche.amount);
            count += 1;
        }
        (amount, count)
    }

    /// Maturity of the tranche at the cursor.
    #[must_use]
    pub fn next_maturity(&self) -> Option<Timestamp> {
        self.pending().first().map(|t| t.matures_at)
    }

    fn append(&mut self, tranche: Tranche) -> Result<usize> {
        self.locked = self
            .locked
            .checked_add(tranche.amount)
            .ok_or(TranchelockError::ArithmeticOverflow)?;
        self.tranches.push(tranche);
        Ok(self.tranches.len() - 1)
    }

    fn settle(&mut self, principal: AccountId, now: Timestamp) -> Result<Settlement> {
        let (amount, count) = self.unlockable_amount(now);
        if amount == 0 {
            return Err(TranchelockError::NoUnlockableAmount { principal });
        }

        let locked = self.locked.checked_sub(amount).ok_or_else(|| {
            TranchelockError::CustodyInvariantViolation {
                reason: format!(
                    "principal {principal}: unlockable {amount} exceeds locked {}",
                    self.locked
                ),
            }
        })?;

        let end = self.cursor + count;
        for tranche in &mut self.tranches[self.cursor..end] {
            tranche.mark_settled(now)?;
        }
        self.cursor = end;
        self.locked = locked;

        Ok(Settlement {
            principal,
            amount,
            tranches: count,
            cursor: self.cursor,
            settled_at: now,
        })
    }

    /// Undo `settlement`, which must be the most recent one.
    fn revert(&mut self, settlement: &Settlement) -> Result<()> {
        let start = settlement
            .cursor
            .checked_sub(settlement.tranches)
            .filter(|_| settlement.cursor == self.cursor)
            .ok_or_else(|| TranchelockError::CustodyInvariantViolation {
                reason: format!(
                    "principal {}: settlement ending at {} is not the latest (cursor {})",
                    settlement.principal, settlement.cursor, self.cursor
                ),
            })?;

        let reopened = &mut self.tranches[start..self.cursor];
        let amount = reopened
            .iter()
            .try_fold(0, |sum: Amount, t| sum.checked_add(t.amount));
        let stamped = reopened
            .iter()
            .all(|t| t.settled_at == Some(settlement.settled_at));
        if amount != Some(settlement.amount) || !stamped {
            return Err(TranchelockError::CustodyInvariantViolation {
                reason: format!(
                    "principal {}: settlement does not match tranches {start}..{}",
                    settlement.principal, self.cursor
                ),
            });
        }
        let locked = self
            .locked
            .checked_add(settlement.amount)
            .ok_or(TranchelockError::ArithmeticOverflow)?;

        for tranche in reopened {
            tranche.settled_at = None;
        }
        self.cursor = start;
        self.locked = locked;
        Ok(())
    }
}

/// Wire form of [`PrincipalLedger`], checked before it becomes one.
#[derive(Deserialize)]
struct PrincipalSnapshot {
    tranches: Vec<Tranche>,
    cursor: usize,
    locked: Amount,
}

impl TryFrom<PrincipalSnapshot> for PrincipalLedger {
    type Error = TranchelockError;

    fn try_from(snapshot: PrincipalSnapshot) -> Result<Self> {
        let PrincipalSnapshot {
            tranches,
            cursor,
            locked,
        } = snapshot;
        let corrupt = TranchelockError::Serialization;

        if cursor > tranches.len() {
            return Err(corrupt(format!(
                "cursor {cursor} beyond {} tranches",
                tranches.len()
            )));
        }
        if let Some(index) = tranches.iter().position(|t| t.amount == 0) {
            return Err(corrupt(format!("tranche {index} has zero amount")));
        }
        if let Some(index) =
            (0..tranches.len()).find(|&index| tranches[index].is_settled() != (index < cursor))
        {
            return Err(corrupt(format!(
                "tranche {index} settlement disagrees with cursor {cursor}"
            )));
        }
        let pending = tranches[cursor..]
            .iter()
            .try_fold(0, |sum: Amount, t| sum.checked_add(t.amount))
            .ok_or(TranchelockError::ArithmeticOverflow)?;
        if pending != locked {
            return Err(corrupt(format!(
                "locked {locked} but pending tranches sum to {pending}"
            )));
        }

        Ok(Self {
            tranches,
            cursor,
            locked,
        })
    }
}

/// Ledger of every principal's tranches.
///
/// Principal entries are created lazily on the first append and kept
/// forever, even when fully settled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "VestingSnapshot")]
pub struct VestingLedger {
    principals: HashMap<AccountId, PrincipalLedger>,
    /// Σ locked over all principals.
    total_locked: Amount,
}

impl VestingLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock `amount` for `principal` until `now + lock_duration`.
    ///
    /// Returns the index of the new tranche.
    ///
    /// # Errors
    /// - `ZeroAmount` if `amount` is zero
    /// - `ArithmeticOverflow` if totals or the maturity overflow
    pub fn append(
        &mut self,
        principal: AccountId,
        amount: Amount,
        now: Timestamp,
        lock_duration: Duration,
    ) -> Result<usize> {
        let tranche = Tranche::new(amount, now, lock_duration)?;
        let total_locked = self
            .total_locked
            .checked_add(amount)
            .ok_or(TranchelockError::ArithmeticOverflow)?;
        let matures_at = tranche.matures_at;

        let index = self.principals.entry(principal).or_default().append(tranche)?;
        self.total_locked = total_locked;

        tracing::debug!(
            principal = %principal,
            index,
            amount,
            matures_at = %matures_at,
            "Tranche appended"
        );
        Ok(index)
    }

    /// Unsettled total for `principal`; zero if unknown.
    #[must_use]
    pub fn locked_amount(&self, principal: AccountId) -> Amount {
        self.principals
            .get(&principal)
            .map_or(0, PrincipalLedger::locked_amount)
    }

    /// `(amount, count)` of the matured unsettled prefix for `principal`.
    #[must_use]
    pub fn unlockable_amount(&self, principal: AccountId, now: Timestamp) -> (Amount, usize) {
        self.principals
            .get(&principal)
            .map_or((0, 0), |ledger| ledger.unlockable_amount(now))
    }

    /// Settle every matured unsettled tranche of `principal` at the cursor.
    ///
    /// Only bookkeeping happens here; the caller pays `amount` out after
    /// this returns.
    ///
    /// # Errors
    /// Returns `NoUnlockableAmount` if nothing has matured since the cursor.
    pub fn settle(&mut self, principal: AccountId, now: Timestamp) -> Result<Settlement> {
        let ledger = self
            .principals
            .get_mut(&principal)
            .ok_or(TranchelockError::NoUnlockableAmount { principal })?;
        let settlement = ledger.settle(principal, now)?;
        self.total_locked = self
            .total_locked
            .checked_sub(settlement.amount)
            .ok_or_else(|| TranchelockError::CustodyInvariantViolation {
                reason: "ledger total below principal total".into(),
            })?;

        tracing::debug!(
            principal = %principal,
            amount = settlement.amount,
            tranches = settlement.tranches,
            cursor = settlement.cursor,
            "Tranches settled"
        );
        Ok(settlement)
    }

    /// Undo `settlement`, the latest one for its principal, after its
    /// payout failed. The tranches become claimable again.
    ///
    /// # Errors
    /// `CustodyInvariantViolation` if `settlement` is unknown or not the
    /// principal's most recent.
    pub fn revert(&mut self, settlement: &Settlement) -> Result<()> {
        let principal = settlement.principal;
        let ledger = self.principals.get_mut(&principal).ok_or_else(|| {
            TranchelockError::CustodyInvariantViolation {
                reason: format!("no ledger for principal {principal}"),
            }
        })?;
        let total_locked = self
            .total_locked
            .checked_add(settlement.amount)
            .ok_or(TranchelockError::ArithmeticOverflow)?;
        ledger.revert(settlement)?;
        self.total_locked = total_locked;

        tracing::debug!(
            principal = %principal,
            amount = settlement.amount,
            cursor = ledger.cursor(),
            "Settlement reverted"
        );
        Ok(())
    }

    /// Settle each principal in order, skipping those with nothing matured.
    ///
    /// A principal listed twice is settled once; the repeat has nothing left
    /// and is skipped.
    pub fn settle_many(
        &mut self,
        principals: &[AccountId],
        now: Timestamp,
    ) -> Result<Vec<Settlement>> {
        let mut settlements = Vec::with_capacity(principals.len());
        for &principal in principals {
            match self.settle(principal, now) {
                Ok(settlement) => settlements.push(settlement),
                Err(TranchelockError::NoUnlockableAmount { .. }) => {
                    tracing::debug!(principal = %principal, "Nothing unlockable, skipped");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(settlements)
    }

    /// The ledger of one principal, if it ever purchased.
    #[must_use]
    pub fn get(&self, principal: AccountId) -> Option<&PrincipalLedger> {
        self.principals.get(&principal)
    }

    /// All tranches of `principal`, settled ones included.
    #[must_use]
    pub fn tranches(&self, principal: AccountId) -> &[Tranche] {
        self.principals
            .get(&principal)
            .map(PrincipalLedger::tranches)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn cursor(&self, principal: AccountId) -> usize {
        self.principals
            .get(&principal)
            .map_or(0, PrincipalLedger::cursor)
    }

    #[must_use]
    pub fn next_maturity(&self, principal: AccountId) -> Option<Timestamp> {
        self.principals
            .get(&principal)
            .and_then(PrincipalLedger::next_maturity)
    }

    #[must_use]
    pub fn principal_count(&self) -> usize {
        self.principals.len()
    }

    /// Σ locked over all principals.
    #[must_use]
    pub fn total_locked(&self) -> Amount {
        self.total_locked
    }

    pub fn principals(&self) -> impl Iterator<Item = (&AccountId, &PrincipalLedger)> {
        self.principals.iter()
    }
}

#[derive(Deserialize)]
struct VestingSnapshot {
    principals: HashMap<AccountId, PrincipalLedger>,
    total_locked: Amount,
}

impl TryFrom<VestingSnapshot> for VestingLedger {
    type Error = TranchelockError;

    fn try_from(snapshot: VestingSnapshot) -> Result<Self> {
        let sum = snapshot
            .principals
            .values()
            .try_fold(0, |sum: Amount, ledger| sum.checked_add(ledger.locked))
            .ok_or(TranchelockError::ArithmeticOverflow)?;
        if sum != snapshot.total_locked {
            return Err(TranchelockError::Serialization(format!(
                "total_locked {} but principals sum to {sum}",
                snapshot.total_locked
            )));
        }
        Ok(Self {
            principals: snapshot.principals,
            total_locked: snapshot.total_locked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn day(n: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    fn locked_by_scan(ledger: &VestingLedger, principal: AccountId) -> Amount {
        let cursor = ledger.cursor(principal);
        ledger.tranches(principal)[cursor..]
            .iter()
            .map(|t| t.amount)
            .sum()
    }

    #[test]
    fn unknown_principal_is_empty() {
        let ledger = VestingLedger::new();
        let p = AccountId::new();
        assert_eq!(ledger.locked_amount(p), 0);
        assert_eq!(ledger.unlockable_amount(p, day(100)), (0, 0));
        assert_eq!(ledger.cursor(p), 0);
        assert!(ledger.tranches(p).is_empty());
        assert!(ledger.next_maturity(p).is_none());
    }

    #[test]
    fn append_creates_principal_lazily() {
        let mut ledger = VestingLedger::new();
        let p = AccountId::new();
        assert_eq!(ledger.principal_count(), 0);
        let idx = ledger.append(p, 100, day(0), Duration::days(5)).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(ledger.principal_count(), 1);
        assert_eq!(ledger.locked_amount(p), 100);
        assert_eq!(ledger.next_maturity(p), Some(day(5)));
    }

    #[test]
    fn append_zero_rejected() {
        let mut ledger = VestingLedger::new();
        let err = ledger
            .append(AccountId::new(), 0, day(0), Duration::days(1))
            .unwrap_err();
        assert_eq!(err, TranchelockError::ZeroAmount);
        assert_eq!(ledger.principal_count(), 0);
    }

    #[test]
    fn five_day_lock_scenario() {
        let mut ledger = VestingLedger::new();
        let p = AccountId::new();
        let lock = Duration::days(5);
        ledger.append(p, 977, day(0), lock).unwrap();
        ledger.append(p, 840, day(1), lock).unwrap();
        ledger.append(p, 812, day(3), lock).unwrap();

        // Too early
        assert_eq!(ledger.unlockable_amount(p, day(3)), (0, 0));
        assert!(matches!(
            ledger.settle(p, day(3)),
            Err(TranchelockError::NoUnlockableAmount { .. })
        ));

        // Day 5: only the day-0 tranche
        assert_eq!(ledger.unlockable_amount(p, day(5)), (977, 1));
        let s = ledger.settle(p, day(5)).unwrap();
        assert_eq!(s.amount, 977);
        assert_eq!(s.tranches, 1);
        assert_eq!(ledger.cursor(p), 1);
        assert_eq!(ledger.locked_amount(p), 840 + 812);

        // Day 10: the other two
        assert_eq!(ledger.unlockable_amount(p, day(10)), (840 + 812, 2));
        let s = ledger.settle(p, day(10)).unwrap();
        assert_eq!(s.amount, 1652);
        assert_eq!(s.cursor, 3);
        assert_eq!(ledger.locked_amount(p), 0);
        assert!(ledger.get(p).unwrap().is_fully_settled());
        assert_eq!(ledger.total_locked(), 0);
    }

    #[test]
    fn repeat_settle_fails() {
        let mut ledger = VestingLedger::new();
        let p = AccountId::new();
        ledger.append(p, 10, day(0), Duration::zero()).unwrap();
        ledger.settle(p, day(0)).unwrap();
        let err = ledger.settle(p, day(0)).unwrap_err();
        assert_eq!(err, TranchelockError::NoUnlockableAmount { principal: p });
    }

    #[test]
    fn settled_tranches_are_kept_for_audit() {
        let mut ledger = VestingLedger::new();
        let p = AccountId::new();
        ledger.append(p, 10, day(0), Duration::days(1)).unwrap();
        ledger.settle(p, day(2)).unwrap();
        let tranches = ledger.tranches(p);
        assert_eq!(tranches.len(), 1);
        assert_eq!(tranches[0].settled_at, Some(day(2)));
    }

    #[test]
    fn fully_settled_ledger_accepts_new_tranches() {
        let mut ledger = VestingLedger::new();
        let p = AccountId::new();
        ledger.append(p, 10, day(0), Duration::days(1)).unwrap();
        ledger.settle(p, day(1)).unwrap();
        let idx = ledger.append(p, 7, day(2), Duration::days(1)).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(ledger.locked_amount(p), 7);
        assert_eq!(ledger.unlockable_amount(p, day(3)), (7, 1));
    }

    #[test]
    fn existing_maturities_survive_lock_change() {
        let mut ledger = VestingLedger::new();
        let p = AccountId::new();
        ledger.append(p, 10, day(0), Duration::days(10)).unwrap();
        ledger.append(p, 20, day(1), Duration::days(2)).unwrap();
        let tranches = ledger.tranches(p);
        assert_eq!(tranches[0].matures_at, day(10));
        assert_eq!(tranches[1].matures_at, day(3));
    }

    #[test]
    fn shrinking_lock_withholds_later_tranche() {
        let mut ledger = VestingLedger::new();
        let p = AccountId::new();
        ledger.append(p, 10, day(0), Duration::days(10)).unwrap();
        ledger.append(p, 20, day(1), Duration::days(2)).unwrap();

        // The second tranche matured on day 3, but sits behind the first.
        assert_eq!(ledger.unlockable_amount(p, day(5)), (0, 0));
        assert_eq!(ledger.unlockable_amount(p, day(10)), (30, 2));
    }

    #[test]
    fn settle_many_skips_empty_principals() {
        let mut ledger = VestingLedger::new();
        let (a, b, c) = (AccountId::new(), AccountId::new(), AccountId::new());
        ledger.append(a, 5, day(0), Duration::days(1)).unwrap();
        ledger.append(c, 9, day(0), Duration::days(1)).unwrap();

        let settled = ledger.settle_many(&[a, b, c, a], day(1)).unwrap();
        assert_eq!(settled.len(), 2);
        assert_eq!(settled[0].principal, a);
        assert_eq!(settled[1].principal, c);
        assert_eq!(ledger.total_locked(), 0);
    }

    #[test]
    fn snapshot_restores_cursor_and_totals() {
        let mut ledger = VestingLedger::new();
        let p = AccountId::new();
        ledger.append(p, 10, day(0), Duration::days(1)).unwrap();
        ledger.append(p, 20, day(0), Duration::days(3)).unwrap();
        ledger.settle(p, day(2)).unwrap();

        let json = serde_json::to_string(&ledger).unwrap();
        let restored: VestingLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.cursor(p), 1);
        assert_eq!(restored.locked_amount(p), 20);
        assert_eq!(restored.total_locked(), 20);
        assert_eq!(restored.unlockable_amount(p, day(3)), (20, 1));
    }

    #[test]
    fn revert_reopens_settled_tranches() {
        let mut ledger = VestingLedger::new();
        let p = AccountId::new();
        ledger.append(p, 10, day(0), Duration::days(1)).unwrap();
        ledger.append(p, 20, day(0), Duration::days(2)).unwrap();
        ledger.append(p, 40, day(0), Duration::days(9)).unwrap();

        let s = ledger.settle(p, day(3)).unwrap();
        assert_eq!((s.amount, s.cursor), (30, 2));
        ledger.revert(&s).unwrap();

        assert_eq!(ledger.cursor(p), 0);
        assert_eq!(ledger.locked_amount(p), 70);
        assert_eq!(ledger.total_locked(), 70);
        assert!(ledger.tranches(p).iter().all(|t| !t.is_settled()));

        // the same tranches settle again
        let again = ledger.settle(p, day(3)).unwrap();
        assert_eq!(again, s);
    }

    #[test]
    fn revert_only_accepts_latest_settlement() {
        let mut ledger = VestingLedger::new();
        let p = AccountId::new();
        ledger.append(p, 10, day(0), Duration::days(1)).unwrap();
        ledger.append(p, 20, day(2), Duration::days(1)).unwrap();
        let first = ledger.settle(p, day(1)).unwrap();
        ledger.settle(p, day(3)).unwrap();

        let err = ledger.revert(&first).unwrap_err();
        assert!(matches!(err, TranchelockError::CustodyInvariantViolation { .. }));
        assert_eq!(ledger.cursor(p), 2);
        assert_eq!(ledger.total_locked(), 0);

        let stranger = Settlement {
            principal: AccountId::new(),
            ..first
        };
        assert!(ledger.revert(&stranger).is_err());
    }

    fn settled_snapshot() -> (serde_json::Value, AccountId) {
        let mut ledger = VestingLedger::new();
        let p = AccountId::new();
        ledger.append(p, 10, day(0), Duration::days(1)).unwrap();
        ledger.append(p, 20, day(0), Duration::days(3)).unwrap();
        ledger.settle(p, day(2)).unwrap();
        (serde_json::to_value(&ledger).unwrap(), p)
    }

    #[test]
    fn snapshot_with_cursor_past_end_rejected() {
        let (mut json, p) = settled_snapshot();
        json["principals"][p.to_string()]["cursor"] = 5.into();
        assert!(serde_json::from_value::<VestingLedger>(json).is_err());
    }

    #[test]
    fn snapshot_with_inconsistent_totals_rejected() {
        let (mut json, p) = settled_snapshot();
        json["principals"][p.to_string()]["locked"] = 25.into();
        assert!(serde_json::from_value::<VestingLedger>(json).is_err());

        let (mut json, _) = settled_snapshot();
        json["total_locked"] = 21.into();
        assert!(serde_json::from_value::<VestingLedger>(json).is_err());

        // cursor moved back over a settled tranche
        let (mut json, p) = settled_snapshot();
        json["principals"][p.to_string()]["cursor"] = 0.into();
        json["principals"][p.to_string()]["locked"] = 30.into();
        json["total_locked"] = 30.into();
        assert!(serde_json::from_value::<VestingLedger>(json).is_err());
    }

    #[test]
    fn randomized_locked_amount_conservation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut ledger = VestingLedger::new();
        let principals: Vec<AccountId> = (0..4).map(|_| AccountId::new()).collect();
        let mut now = day(0);
        let mut paid: Amount = 0;
        let mut bought: Amount = 0;

        for _ in 0..500 {
            now += Duration::hours(rng.gen_range(0..48));
            let p = principals[rng.gen_range(0..principals.len())];
            if rng.gen_bool(0.6) {
                let amount = rng.gen_range(1..1_000_000u128);
                let lock = Duration::hours(rng.gen_range(0..240));
                ledger.append(p, amount, now, lock).unwrap();
                bought += amount;
            } else if let Ok(s) = ledger.settle(p, now) {
                paid += s.amount;
            }

            for &q in &principals {
                assert_eq!(ledger.locked_amount(q), locked_by_scan(&ledger, q));
                let (unlockable, _) = ledger.unlockable_amount(q, now);
                assert!(unlockable <= ledger.locked_amount(q));
            }
            assert_eq!(ledger.total_locked(), bought - paid);
        }
    }
}
