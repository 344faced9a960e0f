use thiserror::Error;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum InstrumentError {
    #[error("symbol '{0}' is not of the form BASE/QUOTE")]
    MalformedSymbol(String),

    #[error("point size must be positive, got {0}")]
    NonPositivePointSize(String),
}
