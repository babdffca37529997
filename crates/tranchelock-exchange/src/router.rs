//! In-memory constant-product router.
//!
//! ```text
//!  payer ──transfer_from(amount_in)──▶ router ──transfer(amount_out)──▶ recipient
//!                                        │
//!                     route: A ─pool─▶ B ─pool─▶ C   (reserves updated per hop)
//! ```
//!
//! Every check (deadline, pool existence, reserves, slippage, the router's
//! own output balance) runs before the first transfer, so a failed swap
//! leaves balances, allowances and reserves untouched.
//!
//! Native input is priced as the router's wrapped native asset: a native
//! route must start with it, and the native currency received is held by the
//! router as backing for that leg.

use std::collections::HashMap;

use tranchelock_types::{
    AccountId, Amount, AssetId, AssetTransfer, Result, Route, TranchelockError,
};

use crate::exchange::{Exchange, Quote, SwapInput, SwapRequest};
use crate::pool::Pool;

type PairKey = (AssetId, AssetId);

fn pair_key(a: &AssetId, b: &AssetId) -> PairKey {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// Multi-hop x·y=k router over an [`AssetTransfer`] bank.
#[derive(Debug, Clone)]
pub struct ConstantProductRouter {
    account: AccountId,
    wrapped_native: AssetId,
    pools: HashMap<PairKey, Pool>,
}

impl ConstantProductRouter {
    /// Create a router that holds its reserves under `account`.
    #[must_use]
    pub fn new(account: AccountId, wrapped_native: AssetId) -> Self {
        Self {
            account,
            wrapped_native,
            pools: HashMap::new(),
        }
    }

    #[must_use]
    pub fn wrapped_native(&self) -> &AssetId {
        &self.wrapped_native
    }

    /// Pool for an unordered pair, if one exists.
    #[must_use]
    pub fn pool(&self, a: &AssetId, b: &AssetId) -> Option<&Pool> {
        self.pools.get(&pair_key(a, b))
    }

    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Move liquidity from `provider` into the `asset_a`/`asset_b` pool,
    /// creating the pool on first deposit.
    ///
    /// # Errors
    /// - `ExchangeRejected` for a pair of identical or native assets
    /// - `InsufficientBalance` if the provider cannot fund both sides
    pub fn add_liquidity<B: AssetTransfer>(
        &mut self,
        bank: &mut B,
        provider: AccountId,
        asset_a: &AssetId,
        amount_a: Amount,
        asset_b: &AssetId,
        amount_b: Amount,
    ) -> Result<()> {
        if asset_a == asset_b {
            return Err(TranchelockError::ExchangeRejected {
                reason: format!("identical assets {asset_a}"),
            });
        }
        if asset_a.is_native() || asset_b.is_native() {
            return Err(TranchelockError::ExchangeRejected {
                reason: format!("pools trade {} instead of the native currency", self.wrapped_native),
            });
        }
        for (asset, amount) in [(asset_a, amount_a), (asset_b, amount_b)] {
            let available = bank.balance_of(provider, asset);
            if available < amount {
                return Err(TranchelockError::InsufficientBalance {
                    needed: amount,
                    available,
                });
            }
        }

        let key = pair_key(asset_a, asset_b);
        let mut pool = self
            .pools
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Pool::new(asset_a.clone(), 0, asset_b.clone(), 0));
        pool.deposit(asset_a, amount_a, amount_b)?;

        bank.transfer(provider, self.account, asset_a, amount_a)?;
        bank.transfer(provider, self.account, asset_b, amount_b)?;
        self.pools.insert(key, pool);

        tracing::debug!(
            pair = %format!("{asset_a}/{asset_b}"),
            amount_a,
            amount_b,
            "Liquidity added"
        );
        Ok(())
    }

    /// Asset the router pulls from the payer for this request.
    fn input_asset(&self, request: &SwapRequest<'_>) -> Result<AssetId> {
        let source = request
            .route
            .source()
            .ok_or_else(|| TranchelockError::ExchangeRejected {
                reason: "empty route".into(),
            })?;
        match request.input {
            SwapInput::Native if *source != self.wrapped_native => {
                Err(TranchelockError::ExchangeRejected {
                    reason: format!("native route must start with {}", self.wrapped_native),
                })
            }
            SwapInput::Native => Ok(AssetId::native()),
            SwapInput::Asset if source.is_native() => Err(TranchelockError::ExchangeRejected {
                reason: "native currency cannot be pulled as a token".into(),
            }),
            SwapInput::Asset => Ok(source.clone()),
        }
    }
}

impl Exchange for ConstantProductRouter {
    /// Holds the reserves; payers approve it as spender.
    fn account(&self) -> AccountId {
        self.account
    }

    fn quote(&self, amount_in: Amount, route: &Route) -> Result<Quote> {
        if route.len() < 2 {
            return Err(TranchelockError::ExchangeRejected {
                reason: format!("route needs at least two assets, got {}", route.len()),
            });
        }

        let mut amounts = Vec::with_capacity(route.len());
        amounts.push(amount_in);
        let mut current = amount_in;
        for (input, output) in route.pairs() {
            let pool = self
                .pool(input, output)
                .ok_or_else(|| TranchelockError::ExchangeRejected {
                    reason: format!("no pool for {input}/{output}"),
                })?;
            current = pool.amount_out(input, current)?;
            amounts.push(current);
        }

        if current == 0 {
            return Err(TranchelockError::InsufficientInputAmount);
        }
        Ok(Quote { amounts })
    }

    fn swap<B: AssetTransfer>(
        &mut self,
        bank: &mut B,
        request: &SwapRequest<'_>,
    ) -> Result<Amount> {
        if request.now > request.deadline {
            return Err(TranchelockError::Expired {
                deadline: request.deadline,
                now: request.now,
            });
        }

        let pulled = self.input_asset(request)?;
        let quote = self.quote(request.amount_in, request.route)?;
        let amount_out = quote.amount_out();
        if amount_out < request.min_amount_out {
            return Err(TranchelockError::SlippageExceeded {
                min_amount_out: request.min_amount_out,
                amount_out,
            });
        }

        // quote() guarantees at least two hops
        let Some(output_asset) = request.route.output().cloned() else {
            return Err(TranchelockError::InsufficientInputAmount);
        };
        let held = bank.balance_of(self.account, &output_asset);
        if held < amount_out {
            return Err(TranchelockError::ExchangeRejected {
                reason: format!("router holds {held} {output_asset}, owes {amount_out}"),
            });
        }

        // Stage reserve updates so a failed pull leaves pools untouched.
        let mut staged: Vec<(PairKey, Pool)> = Vec::with_capacity(quote.amounts.len());
        for ((input, output), hop) in request.route.pairs().zip(quote.amounts.windows(2)) {
            let key = pair_key(input, output);
            let mut pool = staged
                .iter()
                .rev()
                .find(|(k, _)| *k == key)
                .map(|(_, p)| p.clone())
                .or_else(|| self.pools.get(&key).cloned())
                .ok_or_else(|| TranchelockError::ExchangeRejected {
                    reason: format!("no pool for {input}/{output}"),
                })?;
            pool.apply_swap(input, hop[0], hop[1])?;
            staged.push((key, pool));
        }

        bank.transfer_from(
            self.account,
            request.payer,
            self.account,
            &pulled,
            request.amount_in,
        )?;
        bank.transfer(self.account, request.recipient, &output_asset, amount_out)?;
        for (key, pool) in staged {
            self.pools.insert(key, pool);
        }

        tracing::info!(
            payer = %request.payer,
            recipient = %request.recipient,
            route = %request.route,
            amount_in = request.amount_in,
            amount_out,
            price = ?quote.execution_price(),
            "Swap executed"
        );
        Ok(amount_out)
    }
}
