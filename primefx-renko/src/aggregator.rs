use crate::brick::{Direction, RenkoBrick};
use chrono::{DateTime, Utc};
use fnv::FnvHashMap;
use rust_decimal::Decimal;
use smol_str::SmolStr;

struct SymbolState {
    open_price: Decimal,
    open_time: DateTime<Utc>,
    tick_volume: u64,
}

/// C7 — Renko Aggregator.
///
/// Stateful per symbol: `open_price`/`open_time`/`tick_volume` of the brick
/// currently being built. Holds no tick history — the streaming form
/// mandated by spec.md §9 (the bounded-memory policy, not the full-history
/// variant found alongside it in `original_source/deprecated/`).
pub struct RenkoAggregator {
    /// Brick size, expressed in points of the instrument's `point_size`.
    brick_period: Decimal,
    states: FnvHashMap<SmolStr, SymbolState>,
}

impl RenkoAggregator {
    pub fn new(brick_period: Decimal) -> Self {
        Self {
            brick_period,
            states: FnvHashMap::default(),
        }
    }

    /// Feed one tick's price for `symbol`. Emits at most one brick — if the
    /// move exceeds `brick_period`, the close is clamped to exactly one
    /// brick's worth and the remainder stays latent in the new open price,
    /// to be picked up by a future tick (spec.md §4.7 Edge case).
    pub fn on_tick(
        &mut self,
        symbol: impl Into<SmolStr>,
        point_size: Decimal,
        price: Decimal,
        time: DateTime<Utc>,
    ) -> Option<RenkoBrick> {
        let symbol = symbol.into();
        let state = self.states.entry(symbol.clone()).or_insert_with(|| SymbolState {
            open_price: price,
            open_time: time,
            tick_volume: 0,
        });
        state.tick_volume += 1;

        let diff = price - state.open_price;
        let pips_moved = diff.abs() / point_size;
        if pips_moved < self.brick_period {
            return None;
        }

        let direction = if diff.is_sign_positive() { Direction::Up } else { Direction::Down };
        let step = self.brick_period * point_size;
        let close = match direction {
            Direction::Up => state.open_price + step,
            Direction::Down => state.open_price - step,
        };
        let (high, low) = match direction {
            Direction::Up => (close, state.open_price),
            Direction::Down => (state.open_price, close),
        };

        let brick = RenkoBrick::new(
            symbol,
            state.open_time,
            time,
            state.open_price,
            close,
            high,
            low,
            direction,
            self.brick_period,
            point_size,
            state.tick_volume,
        );

        state.open_price = close;
        state.open_time = time;
        state.tick_volume = 0;

        Some(brick)
    }
}
