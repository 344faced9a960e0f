use crate::error::StrategyError;
use primefx_codec::Message;

/// Narrow order-submission interface the dispatcher submits resolved
/// signals through (spec.md §9's "narrow `OrderClient` interface"). The
/// concrete implementation — a handle onto a live C3 session's outbound
/// queue — lives at the wiring layer, not here, so this crate stays free of
/// any transport dependency.
pub trait OrderClient {
    fn submit(&self, message: Message) -> Result<(), StrategyError>;
}
