use chrono::{DateTime, Utc};
use derive_more::Constructor;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A market snapshot for a single [`crate::Instrument`].
///
/// Ticks are append-only per instrument; the cache keeps at least the latest
/// one (see `primefx-cache::store::StateCache`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Constructor)]
pub struct Tick {
    pub symbol: SmolStr,
    /// Broker-provided sending time, UTC millisecond precision.
    pub time_exchange: DateTime<Utc>,
    pub bid: Decimal,
    pub ask: Decimal,
    pub session_high: Decimal,
    pub session_low: Decimal,
}

impl Tick {
    /// `|ask - bid|`.
    pub fn spread(&self) -> Decimal {
        (self.ask - self.bid).abs()
    }

    /// Spread expressed in points of the given instrument's `point_size`.
    pub fn spread_in_points(&self, point_size: Decimal) -> Decimal {
        self.spread() / point_size
    }
}
