use primefx_codec::Message;
use primefx_strategy::{OrderClient, StrategyError};
use tokio::sync::mpsc;

/// Adapts the order session's outbound queue to the narrow [`OrderClient`]
/// interface C8 submits resolved signals through. `submit` is called from
/// inside a synchronous strategy-callback resolution path, so it hands off
/// with `try_send` rather than awaiting — a full outbound queue means the
/// order is dropped and logged, not that the caller blocks the dispatch loop.
pub struct SessionOrderClient {
    outbound: mpsc::Sender<Message>,
}

impl SessionOrderClient {
    pub fn new(outbound: mpsc::Sender<Message>) -> Self {
        Self { outbound }
    }
}

impl OrderClient for SessionOrderClient {
    fn submit(&self, message: Message) -> Result<(), StrategyError> {
        self.outbound
            .try_send(message)
            .map_err(|error| StrategyError::Submit(error.to_string()))
    }
}
