/// C8 error taxonomy (spec.md §7's "Business" category, plus the id/request
/// plumbing errors C8 can surface while building an order).
#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error(transparent)]
    Request(#[from] primefx_request::RequestError),
    #[error(transparent)]
    Sequence(#[from] primefx_sequence::SequenceError),
    #[error("order submission failed: {0}")]
    Submit(String),
}
