//! # tranchelock-types
//!
//! Shared types, errors, and configuration for the **Tranchelock** vault.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`AssetId`]
//! - **Units**: [`Amount`], [`Timestamp`]
//! - **Vesting model**: [`Tranche`], [`TrancheState`], [`Settlement`], [`Purchase`]
//! - **Routing**: [`Route`]
//! - **Audit trail**: [`Receipt`], [`ReceiptKind`]
//! - **Configuration**: [`VaultConfig`]
//! - **Collaborators**: [`AssetTransfer`]
//! - **Errors**: [`TranchelockError`] with `TL_ERR_` prefix codes
//! - **Constants**: lock-duration bounds and swap fee parameters

pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod receipt;
pub mod route;
pub mod tranche;
pub mod transfer;
pub mod units;

pub use config::*;
pub use error::*;
pub use ids::*;
pub use receipt::*;
pub use route::*;
pub use tranche::*;
pub use transfer::*;
pub use units::*;

// Constants are accessed via `tranchelock_types::constants::FOO`
// (not re-exported to avoid name collisions).
