//! Cross-component integration tests wiring C1 (sequence), C5 (inbound
//! dispatcher), C6 (state cache), C7/C8 (renko + strategy dispatcher) and C4
//! (request factory) together against the seed scenarios in spec.md §8.
//! Single-crate behaviour (Renko exactness, counter-pair math, codec
//! round-trips, sequence persistence) is already covered in its owning
//! crate; these tests exist to prove the pieces compose.

use parking_lot::Mutex;
use primefx_cache::{Position, StateCache};
use primefx_codec::{tags, Message};
use primefx_dispatch::{AccountDefaults, InboundDispatcher, PendingEvents};
use primefx_instrument::{Side, Tick};
use primefx_renko::RenkoBrick;
use primefx_sequence::SequenceStore;
use primefx_strategy::{
    OrderClient, PositionStatus, Strategy, StrategyConfig, StrategyContext, StrategyDispatcher, StrategyError,
};
use rust_decimal_macros::dec;
use smol_str::SmolStr;
use std::sync::Arc;

/// Records every submitted order without forwarding it anywhere.
#[derive(Default)]
struct RecordingClient {
    sent: Mutex<Vec<Message>>,
}

impl OrderClient for RecordingClient {
    fn submit(&self, message: Message) -> Result<(), StrategyError> {
        self.sent.lock().push(message);
        Ok(())
    }
}

/// Shared counters a [`RecordingStrategy`] writes into, so the test can
/// inspect them after the strategy itself has been moved into the
/// dispatcher's `Box<dyn Strategy>`.
#[derive(Default)]
struct Recorded {
    ticks: usize,
    bars: usize,
    position_events: Vec<PositionStatus>,
    acks: Vec<(String, String)>,
}

/// Fires an entry on the first tick it sees (when `buy_on_first_tick` is
/// set), then records everything else the dispatcher hands it.
struct RecordingStrategy {
    symbols: Vec<SmolStr>,
    buy_on_first_tick: bool,
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingStrategy {
    fn new(symbols: Vec<&str>) -> (Self, Arc<Mutex<Recorded>>) {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let strategy = Self {
            symbols: symbols.into_iter().map(SmolStr::new).collect(),
            buy_on_first_tick: false,
            recorded: Arc::clone(&recorded),
        };
        (strategy, recorded)
    }
}

impl Strategy for RecordingStrategy {
    fn symbols(&self) -> &[SmolStr] {
        &self.symbols
    }

    fn on_tick(&mut self, ctx: &mut StrategyContext, _tick: &Tick) {
        let mut recorded = self.recorded.lock();
        recorded.ticks += 1;
        if self.buy_on_first_tick && recorded.ticks == 1 {
            drop(recorded);
            ctx.entry_signal(Side::Buy);
        }
    }

    fn on_bar(&mut self, _ctx: &mut StrategyContext, _brick: &RenkoBrick) {
        self.recorded.lock().bars += 1;
    }

    fn on_position_change(&mut self, _ctx: &mut StrategyContext, _position: &Position, status: PositionStatus) {
        self.recorded.lock().position_events.push(status);
    }

    fn on_request_ack(&mut self, _ctx: &mut StrategyContext, kind: &str, text: &str) {
        self.recorded.lock().acks.push((kind.to_string(), text.to_string()));
    }
}

fn strategy_config() -> StrategyConfig {
    StrategyConfig {
        max_short_pos: 1,
        max_long_pos: 1,
        max_pip_risk: dec!(10),
        max_risk: dec!(1.0),
        max_qty: dec!(100000),
        max_spread: dec!(5),
        renko_size: dec!(10),
        sma_size: 5,
        wait_bricks: 1,
        symbols: vec!["EUR/USD".to_string()],
    }
}

/// Synthesized `TradingSessionStatus(h)` carrying one security list entry
/// for `EUR/USD`, matching S1's point size, plus the broker base-currency
/// parameter the collateral report handler reads back out of the cache.
fn trading_session_status() -> Message {
    Message::builder(tags::msg_type::TRADING_SESSION_STATUS)
        .field(tags::TRAD_SES_STATUS, "3")
        .group_counter(tags::NO_RELATED_SYM, 1)
        .field(tags::SYMBOL, "EUR/USD")
        .field(tags::fxcm::SYM_PRECISION, 5_i64)
        .field(tags::fxcm::SYM_POINT_SIZE, dec!(0.0001))
        .field(tags::ROUND_LOT, dec!(1000))
        .field(tags::fxcm::MIN_QUANTITY, dec!(1))
        .field(tags::fxcm::MAX_QUANTITY, dec!(5000000))
        .field(tags::CONTRACT_MULTIPLIER, dec!(1))
        .group_counter(tags::fxcm::NO_PARAMS, 1)
        .field(tags::fxcm::PARAM_NAME, "BASE_CRNCY")
        .field(tags::fxcm::PARAM_VALUE, "USD")
        .build()
}

fn collateral_report() -> Message {
    Message::builder(tags::msg_type::COLLATERAL_REPORT)
        .field(tags::ACCOUNT, "ACC1")
        .field(tags::CASH_OUTSTANDING, dec!(10000))
        .field(tags::fxcm::USED_MARGIN, dec!(0))
        .group_counter(tags::NO_PARTY_IDS, 1)
        .field(tags::PARTY_ID, "FXCM ID")
        .group_counter(tags::NO_PARTY_SUB_IDS, 1)
        .field(tags::PARTY_SUB_ID_TYPE, 2_i64)
        .field(tags::PARTY_SUB_ID, "SEC1")
        .build()
}

fn market_data_snapshot(bid: rust_decimal::Decimal, ask: rust_decimal::Decimal) -> Message {
    Message::builder(tags::msg_type::MARKET_DATA_SNAPSHOT_FULL_REFRESH)
        .field(tags::SYMBOL, "EUR/USD")
        .field(tags::SENDING_TIME, "20180805-21:03:56.102")
        .group_counter(tags::NO_MD_ENTRIES, 2)
        .field(tags::MD_ENTRY_TYPE, tags::md_entry_type::BID)
        .field(tags::MD_ENTRY_PX, bid)
        .field(tags::MD_ENTRY_TYPE, tags::md_entry_type::OFFER)
        .field(tags::MD_ENTRY_PX, ask)
        .build()
}

struct Harness {
    cache: StateCache,
    sequence: SequenceStore,
    pending: PendingEvents,
}

impl Harness {
    fn new() -> Self {
        Self { cache: StateCache::new(), sequence: SequenceStore::in_memory(), pending: PendingEvents::new() }
    }

    fn dispatcher(&self) -> InboundDispatcher<'_> {
        InboundDispatcher::new(&self.cache, &self.sequence, &self.pending, AccountDefaults::default())
    }
}

fn bring_up_account(dispatcher: &InboundDispatcher<'_>, strategies: &mut StrategyDispatcher<'_>) {
    for event in dispatcher.dispatch(&trading_session_status()).unwrap().events {
        strategies.handle_event(&event);
    }
    for event in dispatcher.dispatch(&collateral_report()).unwrap().events {
        strategies.handle_event(&event);
    }
}

/// S1 — Subscribe and first tick: `TradingSessionStatus` plus
/// `CollateralReport` bring up the instrument and account, then one
/// `MarketDataSnapshotFullRefresh` reaches the strategy's `on_tick` exactly
/// once.
#[test]
fn s1_subscribe_and_first_tick() {
    let harness = Harness::new();
    let dispatcher = harness.dispatcher();
    let client = RecordingClient::default();
    let mut strategies = StrategyDispatcher::new(strategy_config(), &harness.cache, &harness.sequence, &client);

    let (strategy, recorded) = RecordingStrategy::new(vec!["EUR/USD"]);
    strategies.register(Box::new(strategy));

    bring_up_account(&dispatcher, &mut strategies);
    for event in dispatcher.dispatch(&market_data_snapshot(dec!(1.17206), dec!(1.17216))).unwrap().events {
        strategies.handle_event(&event);
    }

    assert_eq!(harness.cache.latest_tick("EUR/USD").unwrap().bid, dec!(1.17206));
    assert_eq!(recorded.lock().ticks, 1);
}

/// S2 — Open, attach SL, then stop-out, driven end to end: the strategy's
/// entry signal sizes and submits a bracket order, a simulated fill opens
/// the position, a simulated stop attach records the stop price, and a
/// simulated stop-out removes it — with the strategy's own
/// `on_position_change` firing at every step.
#[test]
fn s2_open_attach_stop_then_stop_out_end_to_end() {
    let harness = Harness::new();
    let dispatcher = harness.dispatcher();
    let client = RecordingClient::default();
    let mut strategies = StrategyDispatcher::new(strategy_config(), &harness.cache, &harness.sequence, &client);

    let (mut strategy, recorded) = RecordingStrategy::new(vec!["EUR/USD"]);
    strategy.buy_on_first_tick = true;
    strategies.register(Box::new(strategy));

    bring_up_account(&dispatcher, &mut strategies);

    for event in dispatcher.dispatch(&market_data_snapshot(dec!(1.17206), dec!(1.17216))).unwrap().events {
        strategies.handle_event(&event);
    }

    let sent = client.sent.lock();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].get_int(tags::CONTINGENCY_TYPE).unwrap(), Some(101));
    let legs = sent[0].group(tags::NO_ORDERS, tags::CL_ORD_ID).unwrap();
    assert_eq!(legs[0].get_decimal(tags::ORDER_QTY).unwrap(), Some(dec!(100000)));
    drop(sent);

    let fill = Message::builder(tags::msg_type::EXECUTION_REPORT)
        .field(tags::EXEC_TYPE, "F")
        .field(tags::ORD_STATUS, "2")
        .field(tags::ORD_TYPE, "1")
        .field(tags::fxcm::POS_ID, "P1")
        .field(tags::ACCOUNT, "ACC1")
        .field(tags::SYMBOL, "EUR/USD")
        .field(tags::SIDE, "1")
        .field(tags::LAST_QTY, dec!(100000))
        .field(tags::LAST_PX, dec!(1.17216))
        .field(tags::TRANSACT_TIME, chrono::Utc::now())
        .build();
    for event in dispatcher.dispatch(&fill).unwrap().events {
        strategies.handle_event(&event);
    }
    assert_eq!(harness.cache.position("P1").unwrap().entry_price, dec!(1.17216));

    let stop_attach = Message::builder(tags::msg_type::EXECUTION_REPORT)
        .field(tags::EXEC_TYPE, "I")
        .field(tags::ORD_STATUS, "0")
        .field(tags::ORD_TYPE, "3")
        .field(tags::fxcm::POS_ID, "P1")
        .field(tags::PRICE, dec!(1.17116))
        .build();
    for event in dispatcher.dispatch(&stop_attach).unwrap().events {
        strategies.handle_event(&event);
    }
    assert_eq!(harness.cache.position("P1").unwrap().stop_price, Some(dec!(1.17116)));

    let stop_out = Message::builder(tags::msg_type::EXECUTION_REPORT)
        .field(tags::EXEC_TYPE, "F")
        .field(tags::ORD_STATUS, "2")
        .field(tags::ORD_TYPE, "3")
        .field(tags::fxcm::POS_ID, "P1")
        .build();
    for event in dispatcher.dispatch(&stop_out).unwrap().events {
        strategies.handle_event(&event);
    }
    assert!(harness.cache.position("P1").is_none());

    let statuses = recorded.lock().position_events.clone();
    assert_eq!(statuses, vec![PositionStatus::Opened, PositionStatus::Updated, PositionStatus::Closed]);
}

/// S5 — Rejected order surfaces to strategy, routed through the full
/// inbound-dispatcher-to-strategy-dispatcher path rather than the inbound
/// dispatcher in isolation.
#[test]
fn s5_rejected_order_reaches_on_request_ack() {
    let harness = Harness::new();
    let dispatcher = harness.dispatcher();
    let client = RecordingClient::default();
    let mut strategies = StrategyDispatcher::new(strategy_config(), &harness.cache, &harness.sequence, &client);

    let (strategy, recorded) = RecordingStrategy::new(vec!["EUR/USD"]);
    strategies.register(Box::new(strategy));
    bring_up_account(&dispatcher, &mut strategies);

    let reject = Message::builder(tags::msg_type::EXECUTION_REPORT)
        .field(tags::EXEC_TYPE, "8")
        .field(tags::ORD_STATUS, "8")
        .field(tags::TEXT, "Insufficient margin")
        .build();
    for event in dispatcher.dispatch(&reject).unwrap().events {
        strategies.handle_event(&event);
    }

    assert_eq!(harness.cache.position_count(), 0);
    assert_eq!(
        recorded.lock().acks,
        vec![("ExecutionReport:Reject".to_string(), "Insufficient margin".to_string())]
    );
}

/// Bricks produced by the shared Renko aggregator inside
/// [`StrategyDispatcher`] reach `on_bar` once `wait_bricks` closed bricks
/// have accumulated — exercised here with `wait_bricks = 1` so a single
/// emitted brick is enough.
#[test]
fn renko_bricks_flow_through_to_on_bar() {
    let harness = Harness::new();
    let dispatcher = harness.dispatcher();
    let client = RecordingClient::default();
    let mut strategies = StrategyDispatcher::new(strategy_config(), &harness.cache, &harness.sequence, &client);

    let (strategy, recorded) = RecordingStrategy::new(vec!["EUR/USD"]);
    strategies.register(Box::new(strategy));
    bring_up_account(&dispatcher, &mut strategies);

    // renko_size = 10 points = 0.0010 of mid-price movement.
    for event in dispatcher.dispatch(&market_data_snapshot(dec!(1.17200), dec!(1.17200))).unwrap().events {
        strategies.handle_event(&event);
    }
    for event in dispatcher.dispatch(&market_data_snapshot(dec!(1.17320), dec!(1.17320))).unwrap().events {
        strategies.handle_event(&event);
    }

    assert!(recorded.lock().bars >= 1);
}
