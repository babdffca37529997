//! Custody invariant checker.
//!
//! Invariant enforced around every claim:
//! ```text
//! balance_of(custody, target) >= Σ locked_amount(principal)
//! ```
//!
//! Custody may hold more than is locked (donations, rounding), never less.
//! A shortfall means a tranche could not be paid, so claims refuse to run
//! and the violation is reported instead.

use tranchelock_types::{
    AccountId, Amount, AssetId, AssetTransfer, Result, TranchelockError,
};

use crate::vesting::VestingLedger;

/// Compares what custody holds with what the ledger owes.
#[derive(Debug, Clone)]
pub struct CustodyAudit {
    custody: AccountId,
    target: AssetId,
}

impl CustodyAudit {
    #[must_use]
    pub fn new(custody: AccountId, target: AssetId) -> Self {
        Self { custody, target }
    }

    /// Target-asset balance held by custody.
    #[must_use]
    pub fn held<B: AssetTransfer>(&self, bank: &B) -> Amount {
        bank.balance_of(self.custody, &self.target)
    }

    /// Held minus owed; `None` when custody is short.
    #[must_use]
    pub fn surplus<B: AssetTransfer>(&self, bank: &B, ledger: &VestingLedger) -> Option<Amount> {
        self.held(bank).checked_sub(ledger.total_locked())
    }

    /// Check that custody can pay `amount` right now.
    ///
    /// # Errors
    /// Returns [`TranchelockError::CustodyInvariantViolation`] if custody
    /// holds less than `amount`.
    pub fn ensure_covers<B: AssetTransfer>(&self, bank: &B, amount: Amount) -> Result<()> {
        let held = self.held(bank);
        if held < amount {
            return Err(TranchelockError::CustodyInvariantViolation {
                reason: format!(
                    "custody {} holds {held} {}, payout needs {amount}",
                    self.custody.short(),
                    self.target
                ),
            });
        }
        Ok(())
    }

    /// Verify custody covers the ledger's entire locked total.
    ///
    /// # Errors
    /// Returns [`TranchelockError::CustodyInvariantViolation`] on a shortfall.
    pub fn verify<B: AssetTransfer>(&self, bank: &B, ledger: &VestingLedger) -> Result<()> {
        let owed = ledger.total_locked();
        if self.surplus(bank, ledger).is_none() {
            tracing::error!(
                custody = %self.custody,
                asset = %self.target,
                held = self.held(bank),
                owed,
                "Custody shortfall"
            );
            return Err(TranchelockError::CustodyInvariantViolation {
                reason: format!(
                    "custody holds {} {}, ledger owes {owed}",
                    self.held(bank),
                    self.target
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TokenBank;
    use chrono::{Duration, Utc};

    fn setup() -> (CustodyAudit, TokenBank, VestingLedger, AccountId) {
        let custody = AccountId::deterministic("custody");
        let audit = CustodyAudit::new(custody, AssetId::new("GOV"));
        (audit, TokenBank::new(), VestingLedger::new(), custody)
    }

    #[test]
    fn empty_ledger_is_covered() {
        let (audit, bank, ledger, _) = setup();
        assert!(audit.verify(&bank, &ledger).is_ok());
        assert_eq!(audit.surplus(&bank, &ledger), Some(0));
    }

    #[test]
    fn verify_passes_when_backed() {
        let (audit, mut bank, mut ledger, custody) = setup();
        ledger
            .append(AccountId::new(), 100, Utc::now(), Duration::days(1))
            .unwrap();
        bank.mint(custody, &AssetId::new("GOV"), 150).unwrap();
        assert!(audit.verify(&bank, &ledger).is_ok());
        assert_eq!(audit.surplus(&bank, &ledger), Some(50));
    }

    #[test]
    fn verify_fails_on_shortfall() {
        let (audit, mut bank, mut ledger, custody) = setup();
        ledger
            .append(AccountId::new(), 100, Utc::now(), Duration::days(1))
            .unwrap();
        bank.mint(custody, &AssetId::new("GOV"), 99).unwrap();
        let err = audit.verify(&bank, &ledger).unwrap_err();
        assert!(matches!(
            err,
            TranchelockError::CustodyInvariantViolation { .. }
        ));
    }

    #[test]
    fn ensure_covers_checks_payout() {
        let (audit, mut bank, _, custody) = setup();
        bank.mint(custody, &AssetId::new("GOV"), 10).unwrap();
        assert!(audit.ensure_covers(&bank, 10).is_ok());
        assert!(audit.ensure_covers(&bank, 11).is_err());
    }
}
