use derive_more::Constructor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// An account entity (spec.md §3). `balance`, `used_margin` and
/// `margin_ratio` are last-reported-by-broker values; `equity` and
/// `free_margin` are recomputed by the dispatcher on every tick that
/// touches one of the account's symbols (see
/// `primefx-dispatch::pnl::recompute_account`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Constructor)]
pub struct Account {
    pub account_id: SmolStr,
    pub securities_account_id: Option<SmolStr>,
    pub base_currency: SmolStr,
    pub balance: Decimal,
    pub used_margin: Decimal,
    pub margin_ratio: Decimal,
    pub contract_size: Decimal,
    pub hedging: bool,
    pub min_trade_size: Decimal,
    pub equity: Decimal,
    pub free_margin: Decimal,
}

impl Account {
    /// `equity = balance + sum of position P&L` (spec.md §3 / §4.9).
    pub fn equity(&self, pnl_sum: Decimal) -> Decimal {
        self.balance + pnl_sum
    }

    /// `free_margin = equity - used_margin`.
    pub fn free_margin(&self, equity: Decimal) -> Decimal {
        equity - self.used_margin
    }

    /// `margin_ratio % = equity / used_margin * 100`, 0 when no margin is in use.
    pub fn margin_ratio_pct(&self, equity: Decimal) -> Decimal {
        if self.used_margin.is_zero() {
            Decimal::ZERO
        } else {
            equity / self.used_margin * Decimal::from(100)
        }
    }

    /// Recompute and store `equity`, `free_margin` and `margin_ratio` given
    /// the current sum of open-position P&L.
    pub fn refresh_derived(&mut self, pnl_sum: Decimal) {
        let equity = self.equity(pnl_sum);
        self.free_margin = self.free_margin(equity);
        self.margin_ratio = self.margin_ratio_pct(equity);
        self.equity = equity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn account() -> Account {
        Account::new(
            SmolStr::new("ACC1"),
            None,
            SmolStr::new("USD"),
            dec!(10000),
            dec!(0),
            dec!(0),
            dec!(100000),
            false,
            dec!(1),
            dec!(10000),
            dec!(10000),
        )
    }

    #[test]
    fn refresh_derived_matches_s2_scenario() {
        let mut acc = account();
        acc.used_margin = dec!(0);
        acc.refresh_derived(dec!(0));
        assert_eq!(acc.equity, dec!(10000));
        assert_eq!(acc.free_margin, dec!(10000));
        assert_eq!(acc.margin_ratio, dec!(0));
    }

    #[test]
    fn margin_ratio_is_zero_with_no_margin_in_use() {
        let acc = account();
        assert_eq!(acc.margin_ratio_pct(dec!(10000)), dec!(0));
    }

    #[test]
    fn margin_ratio_scales_with_equity_over_used_margin() {
        let mut acc = account();
        acc.used_margin = dec!(5000);
        assert_eq!(acc.margin_ratio_pct(dec!(10000)), dec!(200));
    }
}
