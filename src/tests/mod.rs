//! Crate-level test suites
//!
//! - `mocks`: mockall helpers for the normalizer and backend seams
//! - `property`: proptest invariants over the query pipeline and merger

mod mocks;
mod property;
