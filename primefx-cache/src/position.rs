use chrono::{DateTime, Utc};
use derive_more::Constructor;
use primefx_instrument::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// An owned FX exposure ("MarketOrder" in the original source), keyed by the
/// broker-assigned position id. See spec.md §3.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Constructor)]
pub struct Position {
    pub position_id: SmolStr,
    pub client_order_id: SmolStr,
    pub broker_order_id: Option<SmolStr>,
    pub account_id: SmolStr,
    pub symbol: SmolStr,
    pub side: Side,
    pub quantity: Decimal,
    pub entry_price: Decimal,
    pub stop_price: Option<Decimal>,
    pub take_profit_price: Option<Decimal>,
    pub close_price: Option<Decimal>,
    pub pnl: Decimal,
    pub time_exchange: DateTime<Utc>,
    pub time_close: Option<DateTime<Utc>>,
}

impl Position {
    /// The side that would close this position.
    pub fn close_side(&self) -> Side {
        self.side.close_side()
    }

    pub fn is_closed(&self) -> bool {
        self.time_close.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position() -> Position {
        Position::new(
            SmolStr::new("P1"),
            SmolStr::new("C1"),
            None,
            SmolStr::new("ACC1"),
            SmolStr::new("EUR/USD"),
            Side::Buy,
            dec!(10000),
            dec!(1.17216),
            None,
            None,
            None,
            dec!(0),
            Utc::now(),
            None,
        )
    }

    #[test]
    fn close_side_is_opposite_of_entry_side() {
        assert_eq!(position().close_side(), Side::Sell);
    }

    #[test]
    fn is_closed_reflects_time_close() {
        let mut pos = position();
        assert!(!pos.is_closed());
        pos.time_close = Some(Utc::now());
        assert!(pos.is_closed());
    }
}
