use crate::{
    config::StrategyConfig,
    indicators::SimpleMovingAverage,
    order_client::OrderClient,
    risk,
    strategy::{PositionStatus, Strategy, StrategyContext, StrategySignal},
};
use chrono::Utc;
use primefx_cache::{Position, StateCache};
use primefx_dispatch::DispatchEvent;
use primefx_instrument::{Side, Tick};
use primefx_renko::RenkoAggregator;
use primefx_sequence::SequenceStore;
use rust_decimal::Decimal;
use smol_str::SmolStr;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

/// C8 — Strategy Dispatcher.
///
/// Owns every registered [`Strategy`], the shared Renko/SMA indicator state,
/// and resolves the signals strategies raise into orders via C4/C1,
/// submitted through a narrow [`OrderClient`] (spec.md §4.8).
pub struct StrategyDispatcher<'a> {
    config: StrategyConfig,
    cache: &'a StateCache,
    sequence: &'a SequenceStore,
    order_client: &'a dyn OrderClient,
    strategies: Vec<Box<dyn Strategy>>,
    renko: RenkoAggregator,
    sma: HashMap<SmolStr, SimpleMovingAverage>,
    brick_counts: HashMap<SmolStr, u32>,
    known_positions: HashMap<SmolStr, Position>,
    primary_account: Option<SmolStr>,
    initialized: bool,
}

impl<'a> StrategyDispatcher<'a> {
    pub fn new(
        config: StrategyConfig,
        cache: &'a StateCache,
        sequence: &'a SequenceStore,
        order_client: &'a dyn OrderClient,
    ) -> Self {
        let renko = RenkoAggregator::new(config.renko_size);
        Self {
            config,
            cache,
            sequence,
            order_client,
            strategies: Vec::new(),
            renko,
            sma: HashMap::new(),
            brick_counts: HashMap::new(),
            known_positions: HashMap::new(),
            primary_account: None,
            initialized: false,
        }
    }

    /// Register a strategy. `on_init` fires later, on the first
    /// `AccountReady` event, not at registration time.
    pub fn register(&mut self, strategy: Box<dyn Strategy>) {
        self.strategies.push(strategy);
    }

    /// Apply one [`DispatchEvent`] from C5. Any orders the resolved
    /// strategy signals raise are submitted through the [`OrderClient`]
    /// directly, as a side effect of this call.
    pub fn handle_event(&mut self, event: &DispatchEvent) {
        match event {
            DispatchEvent::AccountReady(account) => {
                self.primary_account = Some(account.account_id.clone());
                if !self.initialized {
                    self.initialized = true;
                    self.broadcast(|s, ctx| s.on_init(ctx));
                }
                let account = account.clone();
                self.broadcast(|s, ctx| s.on_account_change(ctx, &account));
            }
            DispatchEvent::AccountChanged(account) => {
                self.primary_account = Some(account.account_id.clone());
                let account = account.clone();
                self.broadcast(|s, ctx| s.on_account_change(ctx, &account));
            }
            DispatchEvent::Tick(tick) => self.on_tick(tick),
            DispatchEvent::PositionNew(position) => {
                self.known_positions.insert(position.position_id.clone(), position.clone());
                let symbol = position.symbol.clone();
                let position = position.clone();
                self.dispatch_symbol(&symbol, |s, ctx| {
                    s.on_position_change(ctx, &position, PositionStatus::Opened)
                });
            }
            DispatchEvent::PositionUpdate(position) => {
                self.known_positions.insert(position.position_id.clone(), position.clone());
                let symbol = position.symbol.clone();
                let position = position.clone();
                self.dispatch_symbol(&symbol, |s, ctx| {
                    s.on_position_change(ctx, &position, PositionStatus::Updated)
                });
            }
            DispatchEvent::PositionRemoved(position_id) => {
                if let Some(position) = self.known_positions.remove(position_id.as_str()) {
                    let symbol = position.symbol.clone();
                    self.dispatch_symbol(&symbol, |s, ctx| {
                        s.on_position_change(ctx, &position, PositionStatus::Closed)
                    });
                }
            }
            DispatchEvent::RequestAck { kind, text } => {
                let kind = kind.clone();
                let text = text.clone();
                self.broadcast(|s, ctx| s.on_request_ack(ctx, &kind, &text));
            }
            DispatchEvent::TradingDeskOpen(_) | DispatchEvent::InstrumentDefined(_) => {}
        }
    }

    /// Drain every strategy's `on_exit`, e.g. on session shutdown.
    pub fn shutdown(&mut self) {
        self.broadcast(|s, ctx| s.on_exit(ctx));
    }

    fn on_tick(&mut self, tick: &Tick) {
        let symbol = tick.symbol.clone();
        if !self.config.symbols.iter().any(|s| s.as_str() == symbol.as_str()) {
            return;
        }
        let Some(instrument) = self.cache.instrument(symbol.as_str()) else { return };

        let mid = (tick.bid + tick.ask) / Decimal::TWO;
        let brick = self.renko.on_tick(symbol.clone(), instrument.point_size, mid, tick.time_exchange);

        self.sma.entry(symbol.clone()).or_insert_with(|| SimpleMovingAverage::new(self.config.sma_size)).push(mid);

        self.dispatch_symbol(&symbol, |s, ctx| s.on_tick(ctx, tick));

        if let Some(brick) = brick {
            let count = self.brick_counts.entry(symbol.clone()).or_insert(0);
            *count += 1;
            if *count >= self.config.wait_bricks {
                self.dispatch_symbol(&symbol, |s, ctx| s.on_bar(ctx, &brick));
            }
        }
    }

    /// Call `call` on every registered strategy with an empty-symbol
    /// context, resolving whatever signals it raises immediately after.
    fn broadcast<F>(&mut self, mut call: F)
    where
        F: FnMut(&mut dyn Strategy, &mut StrategyContext),
    {
        let (config, cache, sequence, order_client, account) =
            (&self.config, self.cache, self.sequence, self.order_client, self.primary_account.clone());
        for strategy in self.strategies.iter_mut() {
            let mut ctx = StrategyContext::new(SmolStr::new(""));
            run_guarded(AssertUnwindSafe(|| call(strategy.as_mut(), &mut ctx)));
            resolve(config, cache, sequence, order_client, account.as_ref(), ctx.into_signals());
        }
    }

    /// Like [`Self::broadcast`] but only for strategies subscribed to `symbol`.
    fn dispatch_symbol<F>(&mut self, symbol: &SmolStr, mut call: F)
    where
        F: FnMut(&mut dyn Strategy, &mut StrategyContext),
    {
        let (config, cache, sequence, order_client, account) =
            (&self.config, self.cache, self.sequence, self.order_client, self.primary_account.clone());
        for strategy in self.strategies.iter_mut() {
            if !strategy.symbols().iter().any(|s| s.as_str() == symbol.as_str()) {
                continue;
            }
            let mut ctx = StrategyContext::new(symbol.clone());
            run_guarded(AssertUnwindSafe(|| call(strategy.as_mut(), &mut ctx)));
            resolve(config, cache, sequence, order_client, account.as_ref(), ctx.into_signals());
        }
    }
}

fn resolve(
    config: &StrategyConfig,
    cache: &StateCache,
    sequence: &SequenceStore,
    order_client: &dyn OrderClient,
    account_id: Option<&SmolStr>,
    signals: Vec<StrategySignal>,
) {
    for signal in signals {
        match signal {
            StrategySignal::Entry { symbol, side } => {
                if let Err(error) = process_entry(config, cache, sequence, order_client, account_id, &symbol, side) {
                    tracing::warn!(symbol = %symbol, %error, "failed to submit entry bracket");
                }
            }
            StrategySignal::CloseAll { symbol, side } => {
                process_close_all(cache, sequence, order_client, &symbol, side);
            }
            StrategySignal::Bar(brick) => {
                tracing::debug!(symbol = %brick.symbol, direction = %brick.direction, "bar_signal raised");
            }
        }
    }
}

/// Resolve an `entry_signal` into a sized bracket order (spec.md §4.8/§4.9).
fn process_entry(
    config: &StrategyConfig,
    cache: &StateCache,
    sequence: &SequenceStore,
    order_client: &dyn OrderClient,
    account_id: Option<&SmolStr>,
    symbol: &str,
    side: Side,
) -> Result<(), crate::error::StrategyError> {
    let Some(account_id) = account_id else {
        tracing::warn!(symbol, "entry signal dropped, no account known yet");
        return Ok(());
    };
    let Some(account) = cache.account(account_id.as_str()) else { return Ok(()) };
    let Some(instrument) = cache.instrument(symbol) else { return Ok(()) };
    let Some(tick) = cache.latest_tick(symbol) else { return Ok(()) };

    if tick.spread_in_points(instrument.point_size) > config.max_spread {
        tracing::debug!(symbol, "entry signal dropped, spread too wide");
        return Ok(());
    }

    let open = cache.positions_for_symbol(symbol);
    let long_count = open.iter().filter(|p| p.side == Side::Buy).count() as u32;
    let short_count = open.iter().filter(|p| p.side == Side::Sell).count() as u32;
    match side {
        Side::Buy if long_count >= config.max_long_pos => return Ok(()),
        Side::Sell if short_count >= config.max_short_pos => return Ok(()),
        _ => {}
    }

    let conversion_rate = if account.base_currency == instrument.quote_currency {
        None
    } else {
        primefx_instrument::counter_pair(symbol, &account.base_currency)
            .and_then(|pair| cache.latest_tick(pair.as_str()))
            .map(|t| t.bid)
    };

    let mut units = risk::unit_size(account.free_margin, config.max_risk, config.max_pip_risk, conversion_rate, instrument.point_size);
    if units > config.max_qty {
        units = config.max_qty;
    }
    if units <= Decimal::ZERO {
        return Ok(());
    }

    let stop_px = match side {
        Side::Buy => tick.bid - config.max_pip_risk * instrument.point_size,
        Side::Sell => tick.ask + config.max_pip_risk * instrument.point_size,
    };

    let entry_id = sequence.next_order_id()?;
    let stop_id = sequence.next_order_id()?;
    let list_id = sequence.next_request_id();

    let msg = primefx_request::els_bracket(
        list_id,
        &[entry_id, stop_id],
        account_id.as_str(),
        symbol,
        Utc::now(),
        units,
        side,
        stop_px,
        None,
    )?;
    order_client.submit(msg)
}

/// Resolve a `close_all_signal` into one close order per matching position.
fn process_close_all(cache: &StateCache, sequence: &SequenceStore, order_client: &dyn OrderClient, symbol: &str, side: Option<Side>) {
    for position in cache.positions_for_symbol(symbol) {
        if let Some(filter) = side {
            if position.side != filter {
                continue;
            }
        }

        let cl_ord_id = match sequence.next_order_id() {
            Ok(id) => id,
            Err(error) => {
                tracing::warn!(%error, position_id = %position.position_id, "failed to allocate close order id");
                continue;
            }
        };

        let result = primefx_request::close_by_id_order(
            cl_ord_id,
            position.account_id.as_str(),
            position.symbol.as_str(),
            Utc::now(),
            position.quantity,
            position.side,
            position.position_id.as_str(),
        )
        .map_err(crate::error::StrategyError::from)
        .and_then(|msg| order_client.submit(msg));

        if let Err(error) = result {
            tracing::warn!(%error, position_id = %position.position_id, "failed to submit close order");
        }
    }
}

/// Run a strategy callback, logging and swallowing a panic rather than
/// taking the whole dispatcher down (spec.md §7: "Strategies must not raise
/// out of callbacks").
fn run_guarded<F: FnOnce()>(f: AssertUnwindSafe<F>) {
    if let Err(payload) = panic::catch_unwind(f) {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        tracing::error!(panic = %message, "strategy callback panicked, continuing with other strategies");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use parking_lot::Mutex;
    use primefx_cache::Account;
    use primefx_instrument::{Instrument, ProductClass};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct RecordingClient {
        sent: Arc<Mutex<Vec<primefx_codec::Message>>>,
    }

    impl OrderClient for RecordingClient {
        fn submit(&self, message: primefx_codec::Message) -> Result<(), crate::error::StrategyError> {
            self.sent.lock().push(message);
            Ok(())
        }
    }

    struct BuyOnFirstTick {
        symbols: Vec<SmolStr>,
        fired: bool,
    }

    impl Strategy for BuyOnFirstTick {
        fn symbols(&self) -> &[SmolStr] {
            &self.symbols
        }

        fn on_tick(&mut self, ctx: &mut StrategyContext, _tick: &Tick) {
            if !self.fired {
                self.fired = true;
                ctx.entry_signal(Side::Buy);
            }
        }
    }

    struct PanicsOnTick {
        symbols: Vec<SmolStr>,
    }

    impl Strategy for PanicsOnTick {
        fn symbols(&self) -> &[SmolStr] {
            &self.symbols
        }

        fn on_tick(&mut self, _ctx: &mut StrategyContext, _tick: &Tick) {
            panic!("strategy exploded");
        }
    }

    fn config() -> StrategyConfig {
        StrategyConfig {
            max_short_pos: 1,
            max_long_pos: 1,
            max_pip_risk: dec!(10),
            max_risk: dec!(1.0),
            max_qty: dec!(1_000_000),
            max_spread: dec!(5),
            renko_size: dec!(2),
            sma_size: 3,
            wait_bricks: 1,
            symbols: vec!["EUR/USD".to_string()],
        }
    }

    fn eur_usd() -> Instrument {
        Instrument::new("EUR/USD", 5, dec!(0.0001), dec!(1000), dec!(1), dec!(5_000_000), dec!(1), ProductClass::Currency).unwrap()
    }

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

    fn tick(bid: Decimal, ask: Decimal) -> Tick {
        Tick::new(SmolStr::new("EUR/USD"), Utc.with_ymd_and_hms(2018, 8, 5, 21, 3, 56).unwrap(), bid, ask, dec!(1.17300), dec!(1.17100))
    }

    #[test]
    fn on_tick_entry_signal_sizes_and_submits_a_bracket() {
        let cache = StateCache::new();
        cache.insert_instrument(eur_usd());
        cache.upsert_account(account());
        cache.record_tick(tick(dec!(1.17206), dec!(1.17216)));
        let sequence = SequenceStore::in_memory();
        let sent = Arc::new(Mutex::new(Vec::new()));
        let client = RecordingClient { sent: sent.clone() };

        let mut dispatcher = StrategyDispatcher::new(config(), &cache, &sequence, &client);
        dispatcher.register(Box::new(BuyOnFirstTick { symbols: vec![SmolStr::new("EUR/USD")], fired: false }));

        dispatcher.handle_event(&DispatchEvent::AccountReady(account()));
        dispatcher.handle_event(&DispatchEvent::Tick(tick(dec!(1.17206), dec!(1.17216))));

        let sent = sent.lock();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].get_int(primefx_codec::tags::CONTINGENCY_TYPE).unwrap(), Some(101));
        let legs = sent[0].group(primefx_codec::tags::NO_ORDERS, primefx_codec::tags::CL_ORD_ID).unwrap();
        assert_eq!(legs[0].get_decimal(primefx_codec::tags::ORDER_QTY).unwrap(), Some(dec!(100000)));
    }

    #[test]
    fn a_panicking_strategy_does_not_stop_other_strategies_from_running() {
        let cache = StateCache::new();
        cache.insert_instrument(eur_usd());
        cache.upsert_account(account());
        cache.record_tick(tick(dec!(1.17206), dec!(1.17216)));
        let sequence = SequenceStore::in_memory();
        let sent = Arc::new(Mutex::new(Vec::new()));
        let client = RecordingClient { sent: sent.clone() };

        let mut dispatcher = StrategyDispatcher::new(config(), &cache, &sequence, &client);
        dispatcher.register(Box::new(PanicsOnTick { symbols: vec![SmolStr::new("EUR/USD")] }));
        dispatcher.register(Box::new(BuyOnFirstTick { symbols: vec![SmolStr::new("EUR/USD")], fired: false }));

        dispatcher.handle_event(&DispatchEvent::AccountReady(account()));
        dispatcher.handle_event(&DispatchEvent::Tick(tick(dec!(1.17206), dec!(1.17216))));

        // The first strategy panicked; the second still ran and its entry
        // signal was still resolved into a submitted order.
        assert_eq!(sent.lock().len(), 1);
    }

    #[test]
    fn close_all_signal_submits_one_close_per_matching_position() {
        let cache = StateCache::new();
        cache.insert_instrument(eur_usd());
        cache
            .insert_position(primefx_cache::Position::new(
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
            ))
            .unwrap();
        let sequence = SequenceStore::in_memory();
        let sent = Arc::new(Mutex::new(Vec::new()));
        let client = RecordingClient { sent: sent.clone() };

        process_close_all(&cache, &sequence, &client, "EUR/USD", None);

        assert_eq!(sent.lock().len(), 1);
    }
}
