//! # tranchelock-ledger
//!
//! **Vesting plane**: the ledger of locked tranches and the custody it is
//! paid from.
//!
//! ## Architecture
//!
//! 1. **VestingLedger**: per-principal append-only tranche sequence with a
//!    settlement cursor; computes locked and unlockable amounts and settles
//! 2. **TokenBank**: in-memory [`AssetTransfer`](tranchelock_types::AssetTransfer)
//!    with balances and allowances per (holder, asset)
//! 3. **CustodyAudit**: checks that custody always covers what is locked
//!
//! ## Claim Flow
//!
//! ```text
//! VestingLedger.unlockable_amount() → CustodyAudit.ensure_covers()
//!     → VestingLedger.settle() → TokenBank.transfer(custody → principal)
//! ```

pub mod bank;
pub mod custody;
pub mod vesting;

pub use bank::TokenBank;
pub use custody::CustodyAudit;
pub use vesting::{PrincipalLedger, VestingLedger};
