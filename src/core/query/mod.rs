//! Shopping Query Understanding
//!
//! Turns a free-text shopping query into structured filters.
//!
//! # Pipeline
//!
//! ```text
//!   raw query
//!      |  lowercase + multiword rewrites      (synonyms)
//!      v
//!   rewritten query ----------------------> price range   (price)
//!      |  tokenize + lemmatize                (normalizer)
//!      v
//!   tokens
//!      |  category > brand > color > gender > keyword
//!      |  exact match, then fuzzy match       (classifier, fuzzy)
//!      v
//!   ParsedQuery                               (parser)
//! ```
//!
//! The classifier reads candidate pools from the shared
//! [`VocabularyRegistry`], which grows as products are registered.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use crate::core::query::{ClassifierConfig, QueryParser, RuleBasedNormalizer, SeedData};
//!
//! let seed = SeedData::builtin();
//! let parser = QueryParser::from_seed(
//!     &seed,
//!     ClassifierConfig::default(),
//!     Arc::new(RuleBasedNormalizer::new()),
//!     Arc::new(seed.registry()),
//! )?;
//!
//! let parsed = parser.parse("red sneakers for women below 1500")?;
//! assert_eq!(parsed.category.as_deref(), Some("shoe"));
//! ```

pub mod classifier;
pub mod error;
pub mod fuzzy;
pub mod normalizer;
pub mod parser;
pub mod price;
pub mod seed;
pub mod synonyms;
pub mod vocabulary;

pub use classifier::{ClassifierConfig, EntityClassifier, FieldMatchConfig, ScorerRule};
pub use error::{QueryError, Result};
pub use fuzzy::Scorer;
pub use normalizer::{lemmatize_phrase, LinguisticNormalizer, NormalizerError, RuleBasedNormalizer, Token};
pub use parser::{ParsedQuery, QueryParser};
pub use price::{extract_price, PriceRange};
pub use seed::SeedData;
pub use synonyms::{MultiwordRewriter, RewriteRule, SynonymMap};
pub use vocabulary::{VocabField, VocabularyRegistry, VocabularySnapshot};
