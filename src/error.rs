use thiserror::Error;

/// Input tree problems found before any layout or rendering happens.
#[derive(Debug, Error)]
pub enum InvalidDataError {
    #[error("node `{name}` has negative size {size}")]
    NegativeSize { name: String, size: f64 },

    #[error("node `{name}` has a non-finite size")]
    NonFiniteSize { name: String },

    #[error("malformed hierarchy record: {0}")]
    Malformed(#[from] serde_json::Error),
}
