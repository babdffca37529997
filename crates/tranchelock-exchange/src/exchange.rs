//! The exchange capability consumed by the vault.

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use tranchelock_types::{AccountId, Amount, AssetTransfer, Result, Route, Timestamp};

/// How the swap input reaches the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapInput {
    /// `amount_in` of the route's first asset, pulled from the payer.
    Asset,
    /// `amount_in` of the native currency, pulled from the payer and
    /// treated as the exchange's wrapped native asset.
    Native,
}

/// Parameters of one exact-input swap.
#[derive(Debug, Clone)]
pub struct SwapRequest<'a> {
    /// Account the input is pulled from; must have approved the exchange.
    pub payer: AccountId,
    /// Account the output is delivered to.
    pub recipient: AccountId,
    pub input: SwapInput,
    pub amount_in: Amount,
    /// Output floor; anything below fails with `SlippageExceeded`.
    pub min_amount_out: Amount,
    pub route: &'a Route,
    /// Last instant at which the swap may execute.
    pub deadline: Timestamp,
    /// Time of the calling operation.
    pub now: Timestamp,
}

/// Amounts along a route for a given input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// `amounts[0]` is the input, `amounts[i]` the output of hop `i`.
    pub amounts: Vec<Amount>,
}

impl Quote {
    #[must_use]
    pub fn amount_in(&self) -> Amount {
        self.amounts.first().copied().unwrap_or_default()
    }

    #[must_use]
    pub fn amount_out(&self) -> Amount {
        self.amounts.last().copied().unwrap_or_default()
    }

    /// Output units received per input unit, for display and logs.
    #[must_use]
    pub fn execution_price(&self) -> Option<Decimal> {
        let amount_in = Decimal::from_u128(self.amount_in())?;
        let amount_out = Decimal::from_u128(self.amount_out())?;
        amount_out.checked_div(amount_in)
    }
}

/// An external exchange: pure quotes and exact-input swaps.
///
/// `swap` owns the deadline and slippage checks. It must either complete
/// every transfer it makes or fail before making any.
pub trait Exchange {
    /// Account that pulls input from the payer and holds the exchange's
    /// funds.
    fn account(&self) -> AccountId;

    /// What `amount_in` would buy along `route` right now.
    fn quote(&self, amount_in: Amount, route: &Route) -> Result<Quote>;

    /// Execute the swap and return the amount delivered to the recipient.
    ///
    /// # Errors
    /// - `Expired` if `now > deadline`
    /// - `SlippageExceeded` if the output is below `min_amount_out`
    /// - transfer errors if the payer cannot cover `amount_in`
    fn swap<B: AssetTransfer>(&mut self, bank: &mut B, request: &SwapRequest<'_>)
    -> Result<Amount>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_endpoints() {
        let quote = Quote {
            amounts: vec![1000, 500, 250],
        };
        assert_eq!(quote.amount_in(), 1000);
        assert_eq!(quote.amount_out(), 250);
        assert_eq!(quote.execution_price(), Some(Decimal::new(25, 2)));
    }

    #[test]
    fn zero_input_has_no_price() {
        let quote = Quote {
            amounts: vec![0, 0],
        };
        assert_eq!(quote.execution_price(), None);
    }
}
