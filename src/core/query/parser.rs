//! Query Parser
//!
//! Orchestrates query understanding:
//! 1. Lowercase the raw query
//! 2. Apply multiword rewrites ("smart phones" → "smartphone")
//! 3. Extract the price range from the whole rewritten string
//! 4. Tokenize and lemmatize through the injected normalizer
//! 5. Classify tokens against one consistent vocabulary view

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::classifier::{ClassifierConfig, EntityClassifier};
use super::error::{QueryError, Result};
use super::normalizer::LinguisticNormalizer;
use super::price::{extract_price, PriceRange};
use super::seed::SeedData;
use super::synonyms::MultiwordRewriter;
use super::vocabulary::VocabularyRegistry;

/// Structured filters extracted from a free-text query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedQuery {
    /// Residual tokens that matched no field (sorted)
    pub keywords: BTreeSet<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub gender: Option<String>,
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
}

impl ParsedQuery {
    pub fn price_range(&self) -> PriceRange {
        PriceRange {
            min: self.price_min,
            max: self.price_max,
        }
    }

    /// Whether any field besides keywords was extracted.
    pub fn has_structured_fields(&self) -> bool {
        self.category.is_some()
            || self.brand.is_some()
            || self.color.is_some()
            || self.gender.is_some()
            || !self.price_range().is_empty()
    }
}

/// Free-text query parser.
pub struct QueryParser {
    normalizer: Arc<dyn LinguisticNormalizer>,
    rewriter: MultiwordRewriter,
    classifier: EntityClassifier,
    vocabulary: Arc<VocabularyRegistry>,
}

impl QueryParser {
    pub fn new(
        normalizer: Arc<dyn LinguisticNormalizer>,
        rewriter: MultiwordRewriter,
        classifier: EntityClassifier,
        vocabulary: Arc<VocabularyRegistry>,
    ) -> Self {
        Self {
            normalizer,
            rewriter,
            classifier,
            vocabulary,
        }
    }

    /// Build a parser from seed tables sharing the given registry.
    pub fn from_seed(
        seed: &SeedData,
        config: ClassifierConfig,
        normalizer: Arc<dyn LinguisticNormalizer>,
        vocabulary: Arc<VocabularyRegistry>,
    ) -> Result<Self> {
        let rewriter = seed.rewriter()?;
        let classifier = EntityClassifier::new(seed.synonyms.clone(), config);
        Ok(Self::new(normalizer, rewriter, classifier, vocabulary))
    }

    pub fn vocabulary(&self) -> &Arc<VocabularyRegistry> {
        &self.vocabulary
    }

    pub fn normalizer(&self) -> &Arc<dyn LinguisticNormalizer> {
        &self.normalizer
    }

    /// Parse a query into structured filters.
    ///
    /// Fails only when the normalizer is unavailable.
    pub fn parse(&self, query: &str) -> Result<ParsedQuery> {
        let rewritten = self.rewriter.apply(&query.to_lowercase());
        let price = extract_price(&rewritten);

        let tokens = self
            .normalizer
            .tokenize_and_lemmatize(&rewritten)
            .map_err(|e| QueryError::NormalizerUnavailable(e.0))?;

        let entities = {
            let vocab = self.vocabulary.read();
            self.classifier.classify(&tokens, &vocab)
        };

        let parsed = ParsedQuery {
            keywords: entities.keywords,
            category: entities.category,
            brand: entities.brand,
            color: entities.color,
            gender: entities.gender,
            price_min: price.min,
            price_max: price.max,
        };

        log::debug!("Parsed '{}' -> {:?}", query, parsed);
        Ok(parsed)
    }
}
