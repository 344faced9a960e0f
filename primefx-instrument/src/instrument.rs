use crate::{error::InstrumentError, tick::Tick};
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::VecDeque;

/// Default depth of the per-instrument recent-tick ring (see `SPEC_FULL.md` §3).
pub const DEFAULT_TICK_RING_DEPTH: usize = 8;

/// Broker product classification (`FXCM_FIELD_PRODUCT_ID`, tag 9080).
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize, Display,
)]
pub enum ProductClass {
    Currency,
    Index,
    Commodity,
}

/// A tradable symbol, created once from the broker's security list and
/// immutable thereafter except for its status/price fields.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Instrument {
    pub symbol: SmolStr,
    pub base_currency: SmolStr,
    pub quote_currency: SmolStr,
    pub price_precision: u8,
    pub point_size: Decimal,
    pub round_lot_size: Decimal,
    pub min_order_qty: Decimal,
    pub max_order_qty: Decimal,
    pub contract_multiplier: Decimal,
    pub product_class: ProductClass,
    pub subscribed: bool,
    pub trading_enabled: bool,
    ticks: VecDeque<Tick>,
    tick_ring_depth: usize,
}

impl Instrument {
    /// Construct an `Instrument` from a broker security-list entry.
    ///
    /// `symbol` must be of the form `BASE/QUOTE`; `point_size` must be
    /// positive. Both are invariants spec.md §3 requires the cache to
    /// uphold for every instrument it holds.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: impl Into<SmolStr>,
        price_precision: u8,
        point_size: Decimal,
        round_lot_size: Decimal,
        min_order_qty: Decimal,
        max_order_qty: Decimal,
        contract_multiplier: Decimal,
        product_class: ProductClass,
    ) -> Result<Self, InstrumentError> {
        let symbol = symbol.into();

        if point_size <= Decimal::ZERO {
            return Err(InstrumentError::NonPositivePointSize(symbol.to_string()));
        }

        let (base_currency, quote_currency) = split_symbol(&symbol)?;

        Ok(Self {
            symbol,
            base_currency,
            quote_currency,
            price_precision,
            point_size,
            round_lot_size,
            min_order_qty,
            max_order_qty,
            contract_multiplier,
            product_class,
            subscribed: false,
            trading_enabled: true,
            ticks: VecDeque::with_capacity(DEFAULT_TICK_RING_DEPTH),
            tick_ring_depth: DEFAULT_TICK_RING_DEPTH,
        })
    }

    /// `(base, quote)` derived by splitting [`Self::symbol`] on `/`.
    pub fn currency_pair(&self) -> (&str, &str) {
        (&self.base_currency, &self.quote_currency)
    }

    /// Push a new tick onto the recent-tick ring, evicting the oldest entry
    /// once `tick_ring_depth` is exceeded.
    pub fn push_tick(&mut self, tick: Tick) {
        if self.ticks.len() == self.tick_ring_depth {
            self.ticks.pop_front();
        }
        self.ticks.push_back(tick);
    }

    /// The most recently pushed tick, if any.
    pub fn latest_tick(&self) -> Option<&Tick> {
        self.ticks.back()
    }

    pub fn recent_ticks(&self) -> impl Iterator<Item = &Tick> {
        self.ticks.iter()
    }
}

fn split_symbol(symbol: &str) -> Result<(SmolStr, SmolStr), InstrumentError> {
    let mut parts = symbol.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(base), Some(quote), None) if !base.is_empty() && !quote.is_empty() => {
            Ok((SmolStr::new(base), SmolStr::new(quote)))
        }
        _ => Err(InstrumentError::MalformedSymbol(symbol.to_string())),
    }
}
