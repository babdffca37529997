//! # tranchelock-exchange
//!
//! **Exchange plane**: the contract the vault swaps through, and a
//! deterministic implementation of it.
//!
//! - [`Exchange`]: the two-operation capability (`quote`, `swap`) the vault
//!   depends on. The vault never sees a concrete exchange type.
//! - [`ConstantProductRouter`]: x·y=k pools with a 0.3% input fee and
//!   multi-hop routes, enforcing its own deadline and slippage checks.
//! - [`pool`]: the pure pool math.

pub mod exchange;
pub mod pool;
pub mod router;

pub use exchange::{Exchange, Quote, SwapInput, SwapRequest};
pub use pool::{Pool, get_amount_out};
pub use router::ConstantProductRouter;
