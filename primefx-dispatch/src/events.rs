use primefx_cache::{Account, Position};
use primefx_instrument::{Instrument, Tick};
use smol_str::SmolStr;

/// Output of dispatching one inbound message: the strategy-facing events it
/// produced (spec.md §4.8's `on_*` callback names) plus any outbound
/// messages C5 triggers as a side effect (e.g. a collateral inquiry after
/// `TradingSessionStatus`, a mass status request after `PositionReport`).
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    pub events: Vec<DispatchEvent>,
    pub outbound: Vec<primefx_codec::Message>,
}

impl DispatchOutcome {
    pub fn with_event(event: DispatchEvent) -> Self {
        Self { events: vec![event], outbound: Vec::new() }
    }

    pub fn push_event(&mut self, event: DispatchEvent) {
        self.events.push(event);
    }

    pub fn push_outbound(&mut self, message: primefx_codec::Message) {
        self.outbound.push(message);
    }
}

/// One fact the dispatcher surfaces to the strategy layer (C8).
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchEvent {
    TradingDeskOpen(bool),
    InstrumentDefined(Instrument),
    /// The account entity reached a state where `on_init` may safely fire —
    /// fired once the first `CollateralReport` is merged in (spec.md §4.5).
    AccountReady(Account),
    AccountChanged(Account),
    Tick(Tick),
    PositionNew(Position),
    PositionUpdate(Position),
    PositionRemoved(SmolStr),
    /// `on_request_ack(kind, text)` (spec.md §4.8).
    RequestAck { kind: SmolStr, text: SmolStr },
}
