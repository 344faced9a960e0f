use primefx_cache::{Account, Position};
use primefx_instrument::Side;
use rust_decimal::Decimal;

/// Step 1 (spec.md §4.5): pip value in the instrument's quote currency,
/// divided by the account-currency conversion rate when the two differ.
/// `conversion_rate` is the counter pair's latest bid (account-currency per
/// quote-currency unit); `None` when the instrument is already denominated
/// in the account currency.
pub fn pip_value(point_size: Decimal, quantity: Decimal, conversion_rate: Option<Decimal>) -> Decimal {
    let raw = point_size * quantity;
    match conversion_rate {
        Some(rate) if !rate.is_zero() => raw / rate,
        _ => raw,
    }
}

/// Steps 2–3 (spec.md §4.5): recompute a position's P&L against the
/// instrument's current bid/ask. Longs mark against `bid`, shorts against
/// `ask` — the price a closing trade would realize.
pub fn recompute_position_pnl(
    position: &Position,
    point_size: Decimal,
    bid: Decimal,
    ask: Decimal,
    conversion_rate: Option<Decimal>,
) -> Decimal {
    let current = match position.side {
        Side::Buy => bid,
        Side::Sell => ask,
    };
    let diff = match position.side {
        Side::Buy => current - position.entry_price,
        Side::Sell => position.entry_price - current,
    };
    let pips_moved = diff.abs() / point_size;
    let sign = if diff.is_sign_negative() { -Decimal::ONE } else { Decimal::ONE };
    let value_per_pip = pip_value(point_size, position.quantity, conversion_rate);
    pips_moved * value_per_pip * sign
}

/// Step 4 (spec.md §4.5): recompute `equity`/`free_margin`/`margin_ratio`
/// from the live sum of open positions' P&L.
pub fn recompute_account_derived(account: &mut Account, pnl_sum: Decimal) {
    account.refresh_derived(pnl_sum);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use smol_str::SmolStr;

    fn position(side: Side, entry_price: Decimal) -> Position {
        Position::new(
            SmolStr::new("P1"),
            SmolStr::new("C1"),
            None,
            SmolStr::new("ACC1"),
            SmolStr::new("EUR/USD"),
            side,
            dec!(10000),
            entry_price,
            None,
            None,
            None,
            dec!(0),
            Utc::now(),
            None,
        )
    }

    #[test]
    fn long_position_gains_when_bid_rises_above_entry() {
        let pos = position(Side::Buy, dec!(1.17200));
        let pnl = recompute_position_pnl(&pos, dec!(0.0001), dec!(1.17220), dec!(1.17222), None);
        assert_eq!(pnl, dec!(2));
    }

    #[test]
    fn short_position_gains_when_ask_falls_below_entry() {
        let pos = position(Side::Sell, dec!(1.17200));
        let pnl = recompute_position_pnl(&pos, dec!(0.0001), dec!(1.17178), dec!(1.17180), None);
        assert_eq!(pnl, dec!(2));
    }

    #[test]
    fn conversion_rate_divides_pip_value() {
        let pos = position(Side::Buy, dec!(1.17200));
        let pnl = recompute_position_pnl(&pos, dec!(0.0001), dec!(1.17220), dec!(1.17222), Some(dec!(2)));
        assert_eq!(pnl, dec!(1));
    }

    /// Testable property 5 (spec.md §8): a long and a matching short opened
    /// at the same entry price diverge only by the bid/ask spread.
    #[test]
    fn long_and_short_pnl_differ_only_by_spread() {
        let entry = dec!(1.17200);
        let bid = dec!(1.17210);
        let ask = dec!(1.17212);
        let long = position(Side::Buy, entry);
        let short = position(Side::Sell, entry);
        let long_pnl = recompute_position_pnl(&long, dec!(0.0001), bid, ask, None);
        let short_pnl = recompute_position_pnl(&short, dec!(0.0001), bid, ask, None);
        let qty = dec!(10000);
        assert_eq!(long_pnl + short_pnl, -(ask - bid) * qty);
    }
}
