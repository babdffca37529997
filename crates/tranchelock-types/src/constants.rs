//! System-wide constants for the Tranchelock vault.

/// Seconds in one day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Upper bound on the configurable lock duration (30 days).
pub const MAX_LOCK_DURATION_SECS: u64 = 30 * SECONDS_PER_DAY;

/// Lock duration used when a config does not specify one (10 days).
pub const DEFAULT_LOCK_DURATION_SECS: u64 = 10 * SECONDS_PER_DAY;

/// Swap fee numerator: 0.3% of the input is retained by the pool.
pub const SWAP_FEE_NUMERATOR: u128 = 997;

/// Swap fee denominator.
pub const SWAP_FEE_DENOMINATOR: u128 = 1000;

/// Symbol reserved for the native currency inside the transfer capability.
pub const NATIVE_ASSET_SYMBOL: &str = "NATIVE";

/// Domain separator for deterministic account identifiers.
pub const ACCOUNT_ID_DOMAIN: &[u8] = b"tranchelock:account_id:v1:";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
