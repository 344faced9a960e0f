use chrono::{DateTime, Utc};
use derive_more::{Constructor, Display};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display,
)]
pub enum Direction {
    Up,
    Down,
}

/// A single Renko bar: a discrete price-movement unit of fixed size,
/// independent of time (spec.md §3 / GLOSSARY).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Constructor)]
pub struct RenkoBrick {
    pub symbol: SmolStr,
    pub time_open: DateTime<Utc>,
    pub time_close: DateTime<Utc>,
    pub open: Decimal,
    pub close: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub direction: Direction,
    pub period: Decimal,
    pub point_size: Decimal,
    pub tick_count: u64,
}

impl RenkoBrick {
    /// `|close - open| / point_size`, which every emitted brick must equal
    /// `period` (testable property 3, spec.md §8).
    pub fn movement_in_points(&self) -> Decimal {
        (self.close - self.open).abs() / self.point_size
    }
}
