//! Conversion routes: the ordered hop sequence an exchange follows to turn a
//! source asset into the target asset.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AssetId;

/// Ordered list of assets, `[source, intermediate.., target]`.
///
/// A `Route` is just data. Whether it is acceptable for a given vault is
/// decided by the exchange adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Route(Vec<AssetId>);

impl Route {
    #[must_use]
    pub fn new(hops: impl IntoIterator<Item = AssetId>) -> Self {
        Self(hops.into_iter().collect())
    }

    /// Build a route from asset symbols.
    #[must_use]
    pub fn from_symbols(symbols: &[&str]) -> Self {
        Self(symbols.iter().map(|s| AssetId::new(*s)).collect())
    }

    #[must_use]
    pub fn hops(&self) -> &[AssetId] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The asset that goes in.
    #[must_use]
    pub fn source(&self) -> Option<&AssetId> {
        self.0.first()
    }

    /// The asset that comes out.
    #[must_use]
    pub fn output(&self) -> Option<&AssetId> {
        self.0.last()
    }

    /// Consecutive `(input, output)` pairs, one per pool traversed.
    pub fn pairs(&self) -> impl Iterator<Item = (&AssetId, &AssetId)> {
        self.0.windows(2).map(|w| (&w[0], &w[1]))
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, hop) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{hop}")?;
        }
        Ok(())
    }
}
