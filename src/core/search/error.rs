//! Search Error Types
//!
//! Error handling for backend access, candidate expansion and the search
//! service facade.

use std::time::Duration;

use thiserror::Error;

use crate::core::query::QueryError;

/// Search operation errors
#[derive(Error, Debug)]
pub enum SearchError {
    /// The backend could not be reached or rejected a request.
    #[error("Search backend error: {0}")]
    Backend(String),

    #[error("Search request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Query must not be empty")]
    EmptyQuery,

    #[error("Invalid product: {0}")]
    InvalidProduct(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for search operations
pub type Result<T> = std::result::Result<T, SearchError>;
