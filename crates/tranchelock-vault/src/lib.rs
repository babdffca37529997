//! # tranchelock-vault
//!
//! **Orchestration plane**: the buy-and-lock vault.
//!
//! ```text
//!  buy_with_asset / buy_with_native
//!      │
//!      ├─ Controller::ensure_not_paused
//!      ├─ ExchangeAdapter::validate_route
//!      ├─ ExchangeAdapter::acquire      pull source value, swap into target
//!      └─ VestingLedger::append         new locked tranche
//!
//!  claim / claim_many
//!      ├─ VestingLedger::unlockable_amount
//!      ├─ CustodyAudit::ensure_covers
//!      ├─ VestingLedger::settle         bookkeeping first
//!      └─ AssetTransfer::transfer       then pay out
//! ```
//!
//! Every committed state change appends a [`Receipt`](tranchelock_types::Receipt).

pub mod adapter;
pub mod controller;
pub mod vault;

pub use adapter::{Acquisition, ExchangeAdapter};
pub use controller::Controller;
pub use vault::BuyLockVault;
