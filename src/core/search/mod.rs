//! Product Search
//!
//! Candidate expansion against an abstract [`SearchBackend`] and the
//! [`ProductSearchService`] facade.
//!
//! # Components
//!
//! - `SearchBackend`: async product index contract; `InMemorySearchBackend`
//!   implements it over an in-process catalog
//! - `CandidateExpander`: category × brand × color fan-out, bounded concurrent
//!   execution, ordered dedupe merge
//! - `ProductSearchService`: parse, search, add product, vocabulary lists

pub mod backend;
pub mod config;
pub mod error;
pub mod expander;
pub mod models;
pub mod service;

pub use backend::{InMemorySearchBackend, SearchBackend};
pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use expander::{merge_results, CandidateExpander, ExpansionTable};
pub use models::{PriceFilter, ProductRecord, SearchRequest, SearchResults};
pub use service::{AddProductOutcome, AddedTerm, ProductSearchService, VocabularySizes};
