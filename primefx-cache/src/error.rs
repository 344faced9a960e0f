use smol_str::SmolStr;
use thiserror::Error;

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum CacheError {
    #[error("position {0} already exists, broker is authoritative, ignoring insert")]
    DuplicatePosition(SmolStr),

    #[error("no position with id {0}")]
    UnknownPosition(SmolStr),

    #[error("no account with id {0}")]
    UnknownAccount(SmolStr),

    #[error("no instrument for symbol {0}")]
    UnknownInstrument(SmolStr),
}
