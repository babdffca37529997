//! Configuration for a Tranchelock vault instance.

use serde::{Deserialize, Serialize};

use crate::{AccountId, AssetId, Result, Route, TranchelockError, constants};

/// Construction-time parameters of a vault.
///
/// Loaded once; afterwards only the authority, the pause flag, and the lock
/// duration change, and those live in the vault's controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Identity allowed to change configuration and pause purchases.
    pub authority: AccountId,
    /// The vault's own account in the transfer capability.
    pub custody: AccountId,
    /// The single asset every purchase ends in.
    pub target_asset: AssetId,
    /// Identity of the external exchange the vault swaps through.
    pub exchange: AccountId,
    /// Lock duration applied to purchases until changed.
    #[serde(default = "default_lock_duration_secs")]
    pub lock_duration_secs: u64,
    /// Upper bound for `lock_duration_secs`.
    #[serde(default = "default_max_lock_duration_secs")]
    pub max_lock_duration_secs: u64,
    /// Route used by the fixed-route purchase variant, if any.
    #[serde(default)]
    pub default_route: Option<Route>,
}

fn default_lock_duration_secs() -> u64 {
    constants::DEFAULT_LOCK_DURATION_SECS
}

fn default_max_lock_duration_secs() -> u64 {
    constants::MAX_LOCK_DURATION_SECS
}

impl VaultConfig {
    /// Config with default lock bounds and no fixed route.
    #[must_use]
    pub fn new(
        authority: AccountId,
        custody: AccountId,
        target_asset: AssetId,
        exchange: AccountId,
    ) -> Self {
        Self {
            authority,
            custody,
            target_asset,
            exchange,
            lock_duration_secs: constants::DEFAULT_LOCK_DURATION_SECS,
            max_lock_duration_secs: constants::MAX_LOCK_DURATION_SECS,
            default_route: None,
        }
    }

    #[must_use]
    pub fn with_lock_duration_secs(mut self, secs: u64) -> Self {
        self.lock_duration_secs = secs;
        self
    }

    #[must_use]
    pub fn with_default_route(mut self, route: Route) -> Self {
        self.default_route = Some(route);
        self
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    ///
    /// # Errors
    /// - `InvalidLockDuration` if the initial lock exceeds the maximum
    /// - `Configuration` for identity clashes or a malformed default route
    pub fn validate(&self) -> Result<()> {
        if self.max_lock_duration_secs > constants::MAX_LOCK_DURATION_SECS {
            return Err(TranchelockError::Configuration(format!(
                "max lock duration {}s above hard limit {}s",
                self.max_lock_duration_secs,
                constants::MAX_LOCK_DURATION_SECS
            )));
        }
        if self.lock_duration_secs > self.max_lock_duration_secs {
            return Err(TranchelockError::InvalidLockDuration {
                requested: self.lock_duration_secs,
                max: self.max_lock_duration_secs,
            });
        }
        if self.custody == self.exchange {
            return Err(TranchelockError::Configuration(
                "custody and exchange accounts must differ".into(),
            ));
        }
        if self.target_asset.is_native() {
            return Err(TranchelockError::Configuration(
                "target asset cannot be the native currency".into(),
            ));
        }
        if let Some(route) = &self.default_route {
            let well_formed = route.len() >= 2
                && route.output() == Some(&self.target_asset)
                && route.source() != Some(&self.target_asset);
            if !well_formed {
                return Err(TranchelockError::Configuration(format!(
                    "default route {route} does not convert into {}",
                    self.target_asset
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> VaultConfig {
        VaultConfig::new(
            AccountId::deterministic("authority"),
            AccountId::deterministic("custody"),
            AssetId::new("GOV"),
            AccountId::deterministic("exchange"),
        )
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = config();
        assert_eq!(cfg.lock_duration_secs, 864_000);
        assert_eq!(cfg.max_lock_duration_secs, 2_592_000);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn lock_above_max_rejected() {
        let cfg = config().with_lock_duration_secs(constants::MAX_LOCK_DURATION_SECS + 1);
        assert!(matches!(
            cfg.validate(),
            Err(TranchelockError::InvalidLockDuration { .. })
        ));
    }

    #[test]
    fn default_route_must_end_in_target() {
        let cfg = config().with_default_route(Route::from_symbols(&["USDC", "WETH"]));
        assert!(matches!(
            cfg.validate(),
            Err(TranchelockError::Configuration(_))
        ));
        let cfg = config().with_default_route(Route::from_symbols(&["USDC", "GOV"]));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn from_json_fills_defaults() {
        let json = format!(
            r#"{{"authority":"{}","custody":"{}","target_asset":"GOV","exchange":"{}"}}"#,
            AccountId::deterministic("authority"),
            AccountId::deterministic("custody"),
            AccountId::deterministic("exchange"),
        );
        let cfg = VaultConfig::from_json(&json).unwrap();
        assert_eq!(cfg, config());
    }

    #[test]
    fn from_json_rejects_garbage() {
        let err = VaultConfig::from_json("{not json").unwrap_err();
        assert!(matches!(err, TranchelockError::Serialization(_)));
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = config().with_default_route(Route::from_symbols(&["USDC", "WETH", "GOV"]));
        let json = serde_json::to_string(&cfg).unwrap();
        let back: VaultConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
