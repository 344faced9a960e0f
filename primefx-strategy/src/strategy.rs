use primefx_cache::{Account, Position};
use primefx_instrument::{Side, Tick};
use primefx_renko::RenkoBrick;
use smol_str::SmolStr;

/// What changed about a [`Position`] passed to `on_position_change`.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PositionStatus {
    Opened,
    Updated,
    Closed,
}

/// An outbound request a strategy raised during a callback, collected by its
/// [`StrategyContext`] and resolved by the dispatcher once the callback
/// returns (spec.md §4.8). Keeping the strategy on the far side of a queue
/// rather than handing it a live order-submission handle is what breaks the
/// cyclic strategy/manager ownership the source has (spec.md §9).
#[derive(Debug, Clone)]
pub enum StrategySignal {
    Entry { symbol: SmolStr, side: Side },
    CloseAll { symbol: SmolStr, side: Option<Side> },
    Bar(RenkoBrick),
}

/// Narrow per-callback handle a [`Strategy`] uses to raise signals. Carries
/// the symbol the current callback is about, so `entry_signal` doesn't need
/// one spelled out at every call site.
pub struct StrategyContext {
    symbol: SmolStr,
    signals: Vec<StrategySignal>,
}

impl StrategyContext {
    pub(crate) fn new(symbol: impl Into<SmolStr>) -> Self {
        Self { symbol: symbol.into(), signals: Vec::new() }
    }

    pub fn symbol(&self) -> &str {
        self.symbol.as_str()
    }

    /// Request an entry on the context's current symbol.
    pub fn entry_signal(&mut self, side: Side) {
        self.signals.push(StrategySignal::Entry { symbol: self.symbol.clone(), side });
    }

    /// Request that every open position on `symbol` (optionally narrowed to
    /// one `side`) be closed.
    pub fn close_all_signal(&mut self, symbol: impl Into<SmolStr>, side: Option<Side>) {
        self.signals.push(StrategySignal::CloseAll { symbol: symbol.into(), side });
    }

    pub fn bar_signal(&mut self, brick: RenkoBrick) {
        self.signals.push(StrategySignal::Bar(brick));
    }

    pub(crate) fn into_signals(self) -> Vec<StrategySignal> {
        self.signals
    }
}

/// Strategy capability set (spec.md §4.8/§9). Default bodies are no-ops so a
/// strategy only implements the callbacks it cares about.
pub trait Strategy: Send {
    /// The symbols this strategy subscribes to.
    fn symbols(&self) -> &[SmolStr];

    /// Called once, the first time the account reaches a usable state.
    fn on_init(&mut self, _ctx: &mut StrategyContext) {}

    fn on_tick(&mut self, _ctx: &mut StrategyContext, _tick: &Tick) {}

    fn on_bar(&mut self, _ctx: &mut StrategyContext, _brick: &RenkoBrick) {}

    fn on_position_change(&mut self, _ctx: &mut StrategyContext, _position: &Position, _status: PositionStatus) {}

    fn on_account_change(&mut self, _ctx: &mut StrategyContext, _account: &Account) {}

    fn on_request_ack(&mut self, _ctx: &mut StrategyContext, _kind: &str, _text: &str) {}

    fn on_exit(&mut self, _ctx: &mut StrategyContext) {}
}
