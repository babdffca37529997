//! Amount and time units.

use chrono::{DateTime, Utc};

/// Asset quantity in the asset's smallest unit.
pub type Amount = u128;

/// Point in time supplied to every operation. Operations never read a
/// clock themselves.
pub type Timestamp = DateTime<Utc>;
