use rust_decimal::Decimal;

/// Unit size for an entry sized against `stop_pips` (spec.md §4.9).
///
/// `conversion_rate` is `None` when the instrument's quote currency already
/// matches the account's base currency; otherwise it is the counter-pair
/// rate used to convert risk money into the instrument's quote currency.
pub fn unit_size(
    free_margin: Decimal,
    risk_pct: Decimal,
    stop_pips: Decimal,
    conversion_rate: Option<Decimal>,
    point_size: Decimal,
) -> Decimal {
    if stop_pips <= Decimal::ZERO || point_size <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut risk_money = free_margin * risk_pct / Decimal::from(100);
    if let Some(rate) = conversion_rate {
        if rate > Decimal::ZERO {
            risk_money *= rate;
        }
    }

    let value_per_pip = risk_money / stop_pips;
    value_per_pip / point_size
}

/// `F × R / 100` — the money amount a trade is allowed to risk.
pub fn amount_at_risk(free_margin: Decimal, risk_pct: Decimal) -> Decimal {
    free_margin * risk_pct / Decimal::from(100)
}
