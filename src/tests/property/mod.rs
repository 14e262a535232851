//! Property-based tests for the query pipeline
//!
//! Property tests verify invariants that should hold for all inputs, rather
//! than testing specific cases.
//!
//! ## Test Modules
//!
//! - `price_props`: price phrase extraction
//!   - Bounds round-trip through every supported phrasing
//!   - `between` always yields min <= max
//!   - Text without digits never yields a range
//!
//! - `fuzzy_props`: string similarity scorers
//!   - Scores stay within 0..=100
//!   - Identical strings score 100
//!   - `ratio` is symmetric
//!
//! - `parser_props`: query parsing
//!   - Parsing is deterministic
//!   - Extracted fields always come from the vocabulary
//!
//! - `merge_props`: result merging
//!   - No duplicates survive
//!   - Every input document is kept once
//!
//! By default, proptest runs 256 cases per property. This can be configured
//! via the `PROPTEST_CASES` environment variable:
//!
//! ```sh
//! PROPTEST_CASES=1000 cargo test property --release
//! ```

mod fuzzy_props;
mod merge_props;
mod parser_props;
mod price_props;
