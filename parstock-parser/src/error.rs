//! Grid loading errors.
//!
//! Parsing itself never fails; these cover reading an exported grid from
//! disk before it reaches the parser.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to open '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported grid shape: {0}")]
    UnsupportedShape(String),
}

/// Result type alias for grid loading.
pub type LoadResult<T> = Result<T, LoadError>;
