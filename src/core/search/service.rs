//! Product Search Service
//!
//! Facade tying the query parser, the vocabulary registry and the candidate
//! expander together:
//!
//! - `parse`: query → [`ParsedQuery`]
//! - `search`: query → parse → fan-out → merged [`SearchResults`]
//! - `add_product`: normalize a product, grow the vocabulary, index it
//! - `vocabulary`: current vocabulary lists

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::backend::SearchBackend;
use super::config::SearchConfig;
use super::error::{Result, SearchError};
use super::expander::CandidateExpander;
use super::models::{ProductRecord, SearchResults};
use crate::config::AppConfig;
use crate::core::query::{
    lemmatize_phrase, ClassifierConfig, LinguisticNormalizer, ParsedQuery, QueryError, QueryParser,
    SeedData, VocabField, VocabularyRegistry, VocabularySnapshot,
};

// ============================================================================
// Outcomes
// ============================================================================

/// A vocabulary term added by product registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedTerm {
    pub field: VocabField,
    pub term: String,
}

/// Vocabulary list sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularySizes {
    pub categories: usize,
    pub colors: usize,
    pub brands: usize,
    pub genders: usize,
}

impl VocabularySizes {
    fn of(registry: &VocabularyRegistry) -> Self {
        let sets = registry.read();
        Self {
            categories: sets.terms(VocabField::Category).len(),
            colors: sets.terms(VocabField::Color).len(),
            brands: sets.terms(VocabField::Brand).len(),
            genders: sets.terms(VocabField::Gender).len(),
        }
    }
}

/// Result of registering a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddProductOutcome {
    /// The record as indexed, after normalization
    pub product: ProductRecord,
    pub added_terms: Vec<AddedTerm>,
    pub vocabulary_sizes: VocabularySizes,
}

// ============================================================================
// Service
// ============================================================================

pub struct ProductSearchService {
    parser: QueryParser,
    expander: CandidateExpander,
}

impl ProductSearchService {
    pub fn new(parser: QueryParser, expander: CandidateExpander) -> Self {
        Self { parser, expander }
    }

    /// Wire a service from seed tables and configuration.
    pub fn build(
        seed: &SeedData,
        classifier: ClassifierConfig,
        search: SearchConfig,
        normalizer: Arc<dyn LinguisticNormalizer>,
        backend: Arc<dyn SearchBackend>,
    ) -> Result<Self> {
        let vocabulary = Arc::new(seed.registry());
        let parser = QueryParser::from_seed(seed, classifier, normalizer, vocabulary)?;
        let expander = CandidateExpander::new(backend, seed.expansions.clone(), search);
        Ok(Self::new(parser, expander))
    }

    /// Wire a service from the application config, loading the seed file it
    /// names (or the built-in seed).
    pub fn from_config(
        config: &AppConfig,
        normalizer: Arc<dyn LinguisticNormalizer>,
        backend: Arc<dyn SearchBackend>,
    ) -> Result<Self> {
        let seed = SeedData::load(config.vocabulary.seed_path.as_deref())?;
        Self::build(
            &seed,
            config.classifier.clone(),
            config.search.clone(),
            normalizer,
            backend,
        )
    }

    pub fn vocabulary_registry(&self) -> &Arc<VocabularyRegistry> {
        self.parser.vocabulary()
    }

    /// Feed existing catalog terms into the vocabulary without re-indexing
    /// the products. Returns how many new terms were added.
    pub fn register_catalog(&self, products: &[ProductRecord]) -> usize {
        let registry = self.vocabulary_registry();
        let added: usize = products
            .iter()
            .map(|product| registry.register_product(product).len())
            .sum();
        log::debug!("Registered {} catalog products, {} new terms", products.len(), added);
        added
    }

    fn require_query(query: &str) -> Result<&str> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(query)
    }

    /// Parse a query without searching.
    pub fn parse(&self, query: &str) -> Result<ParsedQuery> {
        let query = Self::require_query(query)?;
        Ok(self.parser.parse(query)?)
    }

    /// Parse a query and run the expanded search.
    ///
    /// An empty result set is a success; backend failures are errors.
    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        let query = Self::require_query(query)?;
        let parsed = self.parser.parse(query)?;
        self.expander.search(&parsed, query).await
    }

    /// Normalize a product, grow the vocabulary from it and index it.
    ///
    /// Name, description, category and color are replaced by their lemmas;
    /// brand and gender are lowercased.
    pub async fn add_product(&self, product: ProductRecord) -> Result<AddProductOutcome> {
        if product.name().is_none() {
            return Err(SearchError::InvalidProduct("name is required".to_string()));
        }
        match product.price {
            Some(price) if price.is_finite() && price >= 0.0 => {}
            Some(price) => {
                return Err(SearchError::InvalidProduct(format!("invalid price {}", price)));
            }
            None => return Err(SearchError::InvalidProduct("price is required".to_string())),
        }

        let product = self.normalize_product(product)?;

        let registry = self.vocabulary_registry();
        let added_terms: Vec<AddedTerm> = registry
            .register_product(&product)
            .into_iter()
            .map(|(field, term)| AddedTerm { field, term })
            .collect();

        self.expander.backend().register(&product).await?;

        let vocabulary_sizes = VocabularySizes::of(registry);
        log::info!(
            "Added product {:?} ({} new vocabulary terms)",
            product.name,
            added_terms.len()
        );

        Ok(AddProductOutcome {
            product,
            added_terms,
            vocabulary_sizes,
        })
    }

    fn normalize_product(&self, product: ProductRecord) -> Result<ProductRecord> {
        let normalizer = self.parser.normalizer();
        let lemmatize = |value: Option<String>| -> Result<Option<String>> {
            match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                Some(text) => {
                    let lemmas = lemmatize_phrase(normalizer.as_ref(), text)
                        .map_err(|e| QueryError::NormalizerUnavailable(e.0))?;
                    Ok(Some(lemmas).filter(|l| !l.is_empty()))
                }
                None => Ok(None),
            }
        };
        let lowercase = |value: Option<String>| {
            value
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
        };

        Ok(ProductRecord {
            name: lemmatize(product.name)?,
            description: lemmatize(product.description)?,
            category: lemmatize(product.category)?,
            brand: lowercase(product.brand),
            color: lemmatize(product.color)?,
            gender: lowercase(product.gender),
            ..product
        })
    }

    /// Current vocabulary lists.
    pub fn vocabulary(&self) -> VocabularySnapshot {
        self.vocabulary_registry().snapshot_all()
    }
}
