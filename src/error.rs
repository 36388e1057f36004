//! Library error types.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Two aligned series that should share a timeline do not.
    /// Signals a broken invariant upstream, never bad input data.
    #[error("shape mismatch: '{left}' has {left_len} points but '{right}' has {right_len}")]
    ShapeMismatch {
        left: String,
        left_len: usize,
        right: String,
        right_len: usize,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to load source '{source_id}': {message}")]
    SourceLoad { source_id: String, message: String },

    #[error("unknown series '{0}'")]
    UnknownSeries(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
