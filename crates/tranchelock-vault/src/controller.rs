//! Access and parameter controller.
//!
//! Holds the mutable configuration of a vault: who the authority is, whether
//! purchases are halted, and the lock duration applied to new tranches.
//! Only the authority may change any of it. The pause flag gates purchases
//! only; claims never consult it.

use chrono::Duration;
use tranchelock_types::{AccountId, Result, TranchelockError, VaultConfig};

/// Authority, pause flag and lock duration of one vault.
#[derive(Debug, Clone)]
pub struct Controller {
    authority: AccountId,
    paused: bool,
    lock_duration_secs: u64,
    max_lock_duration_secs: u64,
}

impl Controller {
    #[must_use]
    pub fn new(authority: AccountId, lock_duration_secs: u64, max_lock_duration_secs: u64) -> Self {
        Self {
            authority,
            paused: false,
            lock_duration_secs,
            max_lock_duration_secs,
        }
    }

    /// Controller seeded from a validated config. Starts unpaused.
    #[must_use]
    pub fn from_config(config: &VaultConfig) -> Self {
        Self::new(
            config.authority,
            config.lock_duration_secs,
            config.max_lock_duration_secs,
        )
    }

    #[must_use]
    pub fn authority(&self) -> AccountId {
        self.authority
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn lock_duration_secs(&self) -> u64 {
        self.lock_duration_secs
    }

    #[must_use]
    pub fn max_lock_duration_secs(&self) -> u64 {
        self.max_lock_duration_secs
    }

    /// Lock duration for a tranche created now.
    #[must_use]
    pub fn lock_duration(&self) -> Duration {
        // bounded by the maximum, which is far below the i64 range
        Duration::seconds(i64::try_from(self.lock_duration_secs).unwrap_or(i64::MAX / 1_000))
    }

    /// Reject anyone but the authority.
    pub fn ensure_authority(&self, caller: AccountId) -> Result<()> {
        if caller != self.authority {
            tracing::warn!(caller = %caller, authority = %self.authority, "Rejected authority call");
            return Err(TranchelockError::AccessDenied { caller });
        }
        Ok(())
    }

    /// Gate for purchase paths.
    pub fn ensure_not_paused(&self) -> Result<()> {
        if self.paused {
            return Err(TranchelockError::Paused);
        }
        Ok(())
    }

    /// Change the lock duration for subsequent purchases. Returns the
    /// previous value.
    ///
    /// # Errors
    /// - `AccessDenied` if `caller` is not the authority
    /// - `InvalidLockDuration` if `secs` exceeds the maximum
    pub fn set_lock_duration(&mut self, caller: AccountId, secs: u64) -> Result<u64> {
        self.ensure_authority(caller)?;
        if secs > self.max_lock_duration_secs {
            return Err(TranchelockError::InvalidLockDuration {
                requested: secs,
                max: self.max_lock_duration_secs,
            });
        }
        let previous = std::mem::replace(&mut self.lock_duration_secs, secs);
        Ok(previous)
    }

    /// Halt purchases.
    pub fn pause(&mut self, caller: AccountId) -> Result<()> {
        self.ensure_authority(caller)?;
        self.ensure_not_paused()?;
        self.paused = true;
        Ok(())
    }

    /// Resume purchases.
    pub fn unpause(&mut self, caller: AccountId) -> Result<()> {
        self.ensure_authority(caller)?;
        if !self.paused {
            return Err(TranchelockError::NotPaused);
        }
        self.paused = false;
        Ok(())
    }

    /// Hand the authority role to `new_authority`. Returns the previous
    /// authority.
    pub fn transfer_authority(&mut self, caller: AccountId, new_authority: AccountId) -> Result<AccountId> {
        self.ensure_authority(caller)?;
        Ok(std::mem::replace(&mut self.authority, new_authority))
    }
}
