use thiserror::Error;

/// C5 — Inbound Dispatcher errors. Codec-level failures are not
/// represented here: per spec.md §7 a malformed frame is logged and
/// dropped by C3 before it ever reaches the dispatcher. What remains are
/// the dispatcher's own decode-then-route failures against an
/// otherwise-well-formed message.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("message carries unrecognized MsgType `{0}`")]
    UnknownMsgType(String),
    #[error("malformed security list entry: {0}")]
    MalformedSecurityListEntry(String),
    #[error(transparent)]
    Codec(#[from] primefx_codec::CodecError),
    #[error(transparent)]
    Cache(#[from] primefx_cache::CacheError),
    #[error(transparent)]
    Request(#[from] primefx_request::RequestError),
    #[error(transparent)]
    Sequence(#[from] primefx_sequence::SequenceError),
}
