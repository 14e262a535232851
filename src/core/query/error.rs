//! Query Understanding Error Types
//!
//! Error handling for query parsing and vocabulary loading.

use thiserror::Error;

/// Query understanding errors
#[derive(Error, Debug)]
pub enum QueryError {
    /// The linguistic normalizer could not tokenize the query. Parsing cannot
    /// proceed without tokens, so this is fatal for the call.
    #[error("Query understanding unavailable: {0}")]
    NormalizerUnavailable(String),

    #[error("Invalid seed data: {0}")]
    InvalidSeed(String),

    #[error("Invalid rewrite pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for query operations
pub type Result<T> = std::result::Result<T, QueryError>;
