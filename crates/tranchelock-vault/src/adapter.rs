//! Exchange adapter: route validation and value acquisition.
//!
//! ```text
//!  caller ──pull / push──▶ custody ──approve(amount_in)──▶ exchange.swap
//!                             ▲                                 │
//!                             └──────── target asset ───────────┘
//! ```
//!
//! If the swap fails after the caller's value reached custody, the adapter
//! unwinds: the exchange approval is revoked, the value goes back to the
//! caller, and the caller's allowance to custody is restored.
//!
//! A swap that reports success counts only if custody's target balance grew
//! by a non-zero amount of at least `min_amount_out`. Otherwise the
//! delivery is reversed, the source the exchange pulled is taken back, and
//! the purchase unwinds as above.

use tranchelock_exchange::{Exchange, SwapInput, SwapRequest};
use tranchelock_types::{
    AccountId, Amount, AssetId, AssetTransfer, Result, Route, RouteError, Timestamp,
    TranchelockError,
};

/// One purchase's worth of acquisition parameters.
#[derive(Debug, Clone)]
pub struct Acquisition<'a> {
    pub caller: AccountId,
    pub input: SwapInput,
    pub amount_in: Amount,
    pub min_amount_out: Amount,
    pub route: &'a Route,
    pub deadline: Timestamp,
    pub now: Timestamp,
}

impl Acquisition<'_> {
    /// Asset the caller gives up.
    pub fn source_asset(&self) -> Result<AssetId> {
        match self.input {
            SwapInput::Native => Ok(AssetId::native()),
            SwapInput::Asset => self
                .route
                .source()
                .cloned()
                .ok_or(TranchelockError::InvalidRoute(RouteError::TooShort)),
        }
    }
}

/// Validates routes against the vault's target and drives the swap.
#[derive(Debug, Clone)]
pub struct ExchangeAdapter {
    custody: AccountId,
    exchange: AccountId,
    target: AssetId,
}

impl ExchangeAdapter {
    #[must_use]
    pub fn new(custody: AccountId, exchange: AccountId, target: AssetId) -> Self {
        Self {
            custody,
            exchange,
            target,
        }
    }

    #[must_use]
    pub fn target(&self) -> &AssetId {
        &self.target
    }

    /// Check that `route` converts something other than the target into
    /// the target. Checks run in a fixed order and the first failure wins.
    pub fn validate_route(&self, route: &Route) -> Result<()> {
        if route.len() < 2 {
            return Err(RouteError::TooShort.into());
        }
        if route.output() != Some(&self.target) {
            return Err(RouteError::WrongOutputAsset.into());
        }
        if route.source() == Some(&self.target) {
            return Err(RouteError::InputEqualsOutput.into());
        }
        Ok(())
    }

    /// Move the caller's value into custody, swap it into the target, and
    /// return the target amount custody actually received.
    ///
    /// Either everything happens or nothing observable does.
    pub fn acquire<B, X>(
        &self,
        bank: &mut B,
        exchange: &mut X,
        order: &Acquisition<'_>,
    ) -> Result<Amount>
    where
        B: AssetTransfer,
        X: Exchange,
    {
        let source = order.source_asset()?;
        let exchange_account = exchange.account();
        if exchange_account != self.exchange {
            tracing::warn!(
                configured = %self.exchange,
                supplied = %exchange_account,
                "Rejected unconfigured exchange"
            );
            return Err(TranchelockError::ExchangeRejected {
                reason: format!(
                    "exchange {exchange_account} is not the configured {}",
                    self.exchange
                ),
            });
        }

        let prior_allowance = match order.input {
            SwapInput::Asset => {
                let allowance = bank.allowance(order.caller, self.custody, &source);
                bank.transfer_from(
                    self.custody,
                    order.caller,
                    self.custody,
                    &source,
                    order.amount_in,
                )?;
                Some(allowance)
            }
            SwapInput::Native => {
                bank.transfer(order.caller, self.custody, &source, order.amount_in)?;
                None
            }
        };

        let held_before = bank.balance_of(self.custody, &self.target);
        let source_before = bank.balance_of(self.custody, &source);
        bank.approve(self.custody, self.exchange, &source, order.amount_in);
        let request = SwapRequest {
            payer: self.custody,
            recipient: self.custody,
            input: order.input,
            amount_in: order.amount_in,
            min_amount_out: order.min_amount_out,
            route: order.route,
            deadline: order.deadline,
            now: order.now,
        };

        match exchange.swap(bank, &request) {
            Ok(reported) => {
                bank.approve(self.custody, self.exchange, &source, 0);
                let received = bank
                    .balance_of(self.custody, &self.target)
                    .checked_sub(held_before)
                    .ok_or_else(|| TranchelockError::ExchangeRejected {
                        reason: "custody target balance fell during swap".into(),
                    })?;
                if received < reported {
                    tracing::warn!(reported, received, "Exchange delivered less than reported");
                } else if received > reported {
                    tracing::debug!(reported, received, "Exchange delivered more than reported");
                }
                if received == 0 || received < order.min_amount_out {
                    let pulled = source_before.saturating_sub(bank.balance_of(self.custody, &source));
                    self.reverse_delivery(bank, &source, received, pulled)?;
                    self.unwind(bank, order, &source, prior_allowance)?;
                    tracing::warn!(
                        caller = %order.caller,
                        route = %order.route,
                        min_amount_out = order.min_amount_out,
                        received,
                        "Exchange under-delivered, purchase unwound"
                    );
                    return Err(TranchelockError::SlippageExceeded {
                        min_amount_out: order.min_amount_out,
                        amount_out: received,
                    });
                }
                Ok(received)
            }
            Err(err) => {
                self.unwind(bank, order, &source, prior_allowance)?;
                tracing::warn!(
                    caller = %order.caller,
                    route = %order.route,
                    amount_in = order.amount_in,
                    error = %err,
                    "Swap failed, purchase unwound"
                );
                Err(err)
            }
        }
    }

    /// Hand back what the exchange delivered and take back what it pulled.
    fn reverse_delivery<B: AssetTransfer>(
        &self,
        bank: &mut B,
        source: &AssetId,
        received: Amount,
        pulled: Amount,
    ) -> Result<()> {
        if received > 0 {
            bank.transfer(self.custody, self.exchange, &self.target, received)?;
        }
        if pulled > 0 {
            bank.transfer(self.exchange, self.custody, source, pulled)?;
        }
        Ok(())
    }

    fn unwind<B: AssetTransfer>(
        &self,
        bank: &mut B,
        order: &Acquisition<'_>,
        source: &AssetId,
        prior_allowance: Option<Amount>,
    ) -> Result<()> {
        bank.approve(self.custody, self.exchange, source, 0);
        bank.transfer(self.custody, order.caller, source, order.amount_in)?;
        if let Some(allowance) = prior_allowance {
            bank.approve(order.caller, self.custody, source, allowance);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tranchelock_exchange::{ConstantProductRouter, Quote};
    use tranchelock_ledger::TokenBank;

    /// Pulls the full input, delivers `delivers` of GOV and reports the
    /// full input as output.
    struct ShortChangingExchange {
        account: AccountId,
        delivers: Amount,
    }

    impl Exchange for ShortChangingExchange {
        fn account(&self) -> AccountId {
            self.account
        }

        fn quote(&self, amount_in: Amount, _route: &Route) -> Result<Quote> {
            Ok(Quote {
                amounts: vec![amount_in, amount_in],
            })
        }

        fn swap<B: AssetTransfer>(
            &mut self,
            bank: &mut B,
            request: &SwapRequest<'_>,
        ) -> Result<Amount> {
            let input = match request.input {
                SwapInput::Asset => request.route.source().cloned().unwrap(),
                SwapInput::Native => AssetId::native(),
            };
            bank.transfer_from(self.account, request.payer, self.account, &input, request.amount_in)?;
            if self.delivers > 0 {
                bank.transfer(self.account, request.recipient, &AssetId::new("GOV"), self.delivers)?;
            }
            Ok(request.amount_in)
        }
    }

    fn short_changing(f: &mut Fixture, delivers: Amount) -> ShortChangingExchange {
        let account = AccountId::deterministic("short-changer");
        f.bank.mint(account, &AssetId::new("GOV"), 100).unwrap();
        f.adapter = ExchangeAdapter::new(f.custody, account, AssetId::new("GOV"));
        ShortChangingExchange { account, delivers }
    }

    struct Fixture {
        bank: TokenBank,
        router: ConstantProductRouter,
        adapter: ExchangeAdapter,
        custody: AccountId,
        caller: AccountId,
    }

    fn fixture() -> Fixture {
        let mut bank = TokenBank::new();
        let lp = AccountId::deterministic("lp");
        let custody = AccountId::deterministic("custody");
        let caller = AccountId::deterministic("caller");
        let mut router =
            ConstantProductRouter::new(AccountId::deterministic("router"), AssetId::new("WETH"));

        bank.mint(lp, &AssetId::new("USDC"), 1_000_000).unwrap();
        bank.mint(lp, &AssetId::new("GOV"), 1_000_000).unwrap();
        router
            .add_liquidity(
                &mut bank,
                lp,
                &AssetId::new("USDC"),
                1_000_000,
                &AssetId::new("GOV"),
                1_000_000,
            )
            .unwrap();
        bank.mint(caller, &AssetId::new("USDC"), 5_000).unwrap();

        let adapter = ExchangeAdapter::new(custody, router.account(), AssetId::new("GOV"));
        Fixture {
            bank,
            router,
            adapter,
            custody,
            caller,
        }
    }

    fn order(caller: AccountId, route: &Route, amount_in: Amount) -> Acquisition<'_> {
        let now = Utc::now();
        Acquisition {
            caller,
            input: SwapInput::Asset,
            amount_in,
            min_amount_out: 0,
            route,
            deadline: now + Duration::minutes(10),
            now,
        }
    }

    fn check(adapter: &ExchangeAdapter, symbols: &[&str]) -> TranchelockError {
        adapter
            .validate_route(&Route::from_symbols(symbols))
            .unwrap_err()
    }

    #[test]
    fn route_validation_order() {
        let adapter = ExchangeAdapter::new(
            AccountId::deterministic("custody"),
            AccountId::deterministic("router"),
            AssetId::new("GOV"),
        );
        assert_eq!(check(&adapter, &[]), TranchelockError::InvalidRoute(RouteError::TooShort));
        assert_eq!(check(&adapter, &["GOV"]), TranchelockError::InvalidRoute(RouteError::TooShort));
        assert_eq!(
            check(&adapter, &["USDC", "WETH"]),
            TranchelockError::InvalidRoute(RouteError::WrongOutputAsset)
        );
        // both later checks fail; output is checked first
        assert_eq!(
            check(&adapter, &["GOV", "USDC"]),
            TranchelockError::InvalidRoute(RouteError::WrongOutputAsset)
        );
        assert_eq!(
            check(&adapter, &["GOV", "GOV"]),
            TranchelockError::InvalidRoute(RouteError::InputEqualsOutput)
        );
        assert!(adapter
            .validate_route(&Route::from_symbols(&["USDC", "WETH", "GOV"]))
            .is_ok());
    }

    #[test]
    fn acquire_delivers_target_to_custody() {
        let mut f = fixture();
        let route = Route::from_symbols(&["USDC", "GOV"]);
        f.bank.approve(f.caller, f.custody, &AssetId::new("USDC"), 1_000);

        let out = f
            .adapter
            .acquire(&mut f.bank, &mut f.router, &order(f.caller, &route, 1_000))
            .unwrap();

        assert_eq!(out, 996);
        assert_eq!(f.bank.balance_of(f.custody, &AssetId::new("GOV")), 996);
        assert_eq!(f.bank.balance_of(f.custody, &AssetId::new("USDC")), 0);
        assert_eq!(f.bank.balance_of(f.caller, &AssetId::new("USDC")), 4_000);
        assert_eq!(
            f.bank.allowance(f.custody, f.router.account(), &AssetId::new("USDC")),
            0
        );
    }

    #[test]
    fn missing_allowance_fails_before_swap() {
        let mut f = fixture();
        let route = Route::from_symbols(&["USDC", "GOV"]);
        let err = f
            .adapter
            .acquire(&mut f.bank, &mut f.router, &order(f.caller, &route, 1_000))
            .unwrap_err();
        assert!(matches!(err, TranchelockError::InsufficientAuthorization { .. }));
        assert_eq!(f.bank.balance_of(f.caller, &AssetId::new("USDC")), 5_000);
    }

    #[test]
    fn failed_swap_unwinds() {
        let mut f = fixture();
        let route = Route::from_symbols(&["USDC", "GOV"]);
        f.bank.approve(f.caller, f.custody, &AssetId::new("USDC"), 2_500);

        let mut acquisition = order(f.caller, &route, 1_000);
        acquisition.min_amount_out = 10_000;
        let err = f
            .adapter
            .acquire(&mut f.bank, &mut f.router, &acquisition)
            .unwrap_err();

        assert!(matches!(err, TranchelockError::SlippageExceeded { .. }));
        assert_eq!(f.bank.balance_of(f.caller, &AssetId::new("USDC")), 5_000);
        assert_eq!(f.bank.balance_of(f.custody, &AssetId::new("USDC")), 0);
        assert_eq!(
            f.bank.allowance(f.caller, f.custody, &AssetId::new("USDC")),
            2_500
        );
        assert_eq!(
            f.bank.allowance(f.custody, f.router.account(), &AssetId::new("USDC")),
            0
        );
    }

    #[test]
    fn nothing_delivered_is_reversed() {
        let mut f = fixture();
        let mut exchange = short_changing(&mut f, 0);
        let route = Route::from_symbols(&["USDC", "GOV"]);
        f.bank.approve(f.caller, f.custody, &AssetId::new("USDC"), 2_500);

        let err = f
            .adapter
            .acquire(&mut f.bank, &mut exchange, &order(f.caller, &route, 1_000))
            .unwrap_err();

        assert_eq!(
            err,
            TranchelockError::SlippageExceeded {
                min_amount_out: 0,
                amount_out: 0
            }
        );
        assert_eq!(f.bank.balance_of(f.caller, &AssetId::new("USDC")), 5_000);
        assert_eq!(f.bank.balance_of(f.custody, &AssetId::new("USDC")), 0);
        assert_eq!(f.bank.balance_of(exchange.account, &AssetId::new("USDC")), 0);
        assert_eq!(
            f.bank.allowance(f.caller, f.custody, &AssetId::new("USDC")),
            2_500
        );
        assert_eq!(
            f.bank.allowance(f.custody, exchange.account, &AssetId::new("USDC")),
            0
        );
    }

    #[test]
    fn delivery_below_minimum_is_reversed() {
        let mut f = fixture();
        let mut exchange = short_changing(&mut f, 50);
        let route = Route::from_symbols(&["USDC", "GOV"]);
        f.bank.approve(f.caller, f.custody, &AssetId::new("USDC"), 1_000);

        let mut acquisition = order(f.caller, &route, 1_000);
        acquisition.min_amount_out = 60;
        let err = f
            .adapter
            .acquire(&mut f.bank, &mut exchange, &acquisition)
            .unwrap_err();

        assert_eq!(
            err,
            TranchelockError::SlippageExceeded {
                min_amount_out: 60,
                amount_out: 50
            }
        );
        assert_eq!(f.bank.balance_of(f.caller, &AssetId::new("USDC")), 5_000);
        assert_eq!(f.bank.balance_of(f.custody, &AssetId::new("GOV")), 0);
        assert_eq!(f.bank.balance_of(exchange.account, &AssetId::new("GOV")), 100);
    }

    #[test]
    fn delivery_at_minimum_is_kept() {
        let mut f = fixture();
        let mut exchange = short_changing(&mut f, 50);
        let route = Route::from_symbols(&["USDC", "GOV"]);
        f.bank.approve(f.caller, f.custody, &AssetId::new("USDC"), 1_000);

        let mut acquisition = order(f.caller, &route, 1_000);
        acquisition.min_amount_out = 50;
        let out = f
            .adapter
            .acquire(&mut f.bank, &mut exchange, &acquisition)
            .unwrap();

        // measured delivery, not the reported 1000
        assert_eq!(out, 50);
        assert_eq!(f.bank.balance_of(f.custody, &AssetId::new("GOV")), 50);
    }

    #[test]
    fn unconfigured_exchange_rejected_before_funds_move() {
        let mut f = fixture();
        let route = Route::from_symbols(&["USDC", "GOV"]);
        f.bank.approve(f.caller, f.custody, &AssetId::new("USDC"), 1_000);
        let mut impostor =
            ConstantProductRouter::new(AccountId::deterministic("impostor"), AssetId::new("WETH"));

        let err = f
            .adapter
            .acquire(&mut f.bank, &mut impostor, &order(f.caller, &route, 1_000))
            .unwrap_err();

        assert!(matches!(err, TranchelockError::ExchangeRejected { .. }));
        assert_eq!(f.bank.balance_of(f.caller, &AssetId::new("USDC")), 5_000);
        assert_eq!(
            f.bank.allowance(f.caller, f.custody, &AssetId::new("USDC")),
            1_000
        );
        assert_eq!(
            f.bank.allowance(f.custody, impostor.account(), &AssetId::new("USDC")),
            0
        );
    }

    #[test]
    fn native_source_asset() {
        let route = Route::from_symbols(&["WETH", "GOV"]);
        let mut acquisition = order(AccountId::new(), &route, 1);
        assert_eq!(acquisition.source_asset().unwrap(), AssetId::new("WETH"));
        acquisition.input = SwapInput::Native;
        assert_eq!(acquisition.source_asset().unwrap(), AssetId::native());
    }
}
