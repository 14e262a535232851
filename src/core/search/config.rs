//! Search Configuration
//!
//! Limits for the candidate fan-out against the search backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ============================================================================
// Defaults
// ============================================================================

/// Default cap on backend requests in flight for one search
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 4;
/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

// ============================================================================
// Search Configuration
// ============================================================================

/// Fan-out limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Backend requests allowed in flight at once (0 is treated as 1)
    pub max_concurrent_requests: usize,
    /// Timeout applied to each backend request, in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl SearchConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn concurrency(&self) -> usize {
        self.max_concurrent_requests.max(1)
    }
}
