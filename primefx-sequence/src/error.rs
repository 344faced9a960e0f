use thiserror::Error;

#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("failed to persist order-id counter to {path}: {source}")]
    Persist {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
