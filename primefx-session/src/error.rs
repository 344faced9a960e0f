use crate::state::SessionState;
use thiserror::Error;

/// C3 — Session-level errors (spec.md §7). Transport and codec failures
/// are recoverable by reconnect; the rest are surfaced to the caller.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Transport(#[from] std::io::Error),

    #[error(transparent)]
    Codec(#[from] primefx_codec::CodecError),

    #[error(transparent)]
    Sequence(#[from] primefx_sequence::SequenceError),

    #[error("logon did not complete within the configured timeout")]
    LogonTimedOut,

    #[error("counterparty did not acknowledge logout within the configured timeout")]
    LogoutTimedOut,

    #[error("no inbound traffic after TestRequest; forcing disconnect")]
    HeartbeatTimedOut,

    #[error("counterparty rejected a message (RefMsgType={ref_msg_type:?}, RefTagID={ref_tag_id:?}): {text}")]
    Rejected {
        ref_msg_type: Option<String>,
        ref_tag_id: Option<String>,
        text: String,
    },

    #[error("invalid session transition: cannot reach {to} from {from:?}")]
    InvalidTransition { from: SessionState, to: &'static str },

    #[error("session configuration error: {0}")]
    Configuration(String),
}
