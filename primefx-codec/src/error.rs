use thiserror::Error;

/// All malformed-framing, checksum, and field-coercion errors raised by the
/// codec (spec.md §4.2). The codec never returns a semantic/business error —
/// those belong to `primefx-dispatch`.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum CodecError {
    #[error("message too short to contain a header and trailer")]
    Truncated,

    #[error("malformed tag=value pair: {0:?}")]
    MalformedField(String),

    #[error("checksum mismatch: expected {expected:03}, got {actual}")]
    ChecksumMismatch { expected: u8, actual: String },

    #[error("body length mismatch: header declared {declared}, actual {actual}")]
    BodyLengthMismatch { declared: usize, actual: usize },

    #[error("missing required tag {0}")]
    MissingTag(u32),

    #[error("tag {tag} value {value:?} is not a valid {expected}")]
    TypeCoercion {
        tag: u32,
        value: String,
        expected: &'static str,
    },

    #[error("tag {tag} group counter {counter} did not match {actual} elements found")]
    GroupCountMismatch {
        tag: u32,
        counter: usize,
        actual: usize,
    },
}
