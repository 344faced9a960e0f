use thiserror::Error;

/// C4 — Request Factory errors. Every factory function is a pure
/// constructor; the only way one can fail is a missing mandatory
/// business-level field (spec.md §4.4).
#[derive(Debug, Error, Eq, PartialEq)]
pub enum RequestError {
    #[error("missing or invalid argument `{field}`: {reason}")]
    ArgumentError { field: &'static str, reason: &'static str },
}

impl RequestError {
    pub fn missing(field: &'static str) -> Self {
        Self::ArgumentError { field, reason: "required" }
    }

    pub fn invalid(field: &'static str, reason: &'static str) -> Self {
        Self::ArgumentError { field, reason }
    }
}
