//! Mock-driven tests
//!
//! Exercises the service against mockall doubles of its two seams: the
//! linguistic normalizer and the search backend.

use std::sync::Arc;

use serde_json::json;

use crate::core::query::normalizer::MockLinguisticNormalizer;
use crate::core::query::{
    ClassifierConfig, NormalizerError, QueryError, RuleBasedNormalizer, SeedData, Token,
};
use crate::core::search::backend::MockSearchBackend;
use crate::core::search::{
    PriceFilter, ProductRecord, ProductSearchService, SearchBackend, SearchConfig, SearchError,
};

// ============================================================================
// Helpers
// ============================================================================

fn word(surface: &str, lemma: &str) -> Token {
    Token {
        surface: surface.to_string(),
        lemma: lemma.to_string(),
        is_stopword: false,
        is_punct: false,
        is_numeric: false,
    }
}

/// Normalizer that answers every call with the same tokens.
fn fixed_normalizer(tokens: Vec<Token>) -> MockLinguisticNormalizer {
    let mut normalizer = MockLinguisticNormalizer::new();
    normalizer
        .expect_tokenize_and_lemmatize()
        .returning(move |_| Ok(tokens.clone()));
    normalizer
}

fn failing_normalizer() -> MockLinguisticNormalizer {
    let mut normalizer = MockLinguisticNormalizer::new();
    normalizer
        .expect_tokenize_and_lemmatize()
        .returning(|_| Err(NormalizerError("model not loaded".to_string())));
    normalizer
}

fn service(
    normalizer: impl crate::core::query::LinguisticNormalizer + 'static,
    backend: impl SearchBackend + 'static,
) -> ProductSearchService {
    ProductSearchService::build(
        &SeedData::builtin(),
        ClassifierConfig::default(),
        SearchConfig::default(),
        Arc::new(normalizer),
        Arc::new(backend),
    )
    .unwrap()
}

// ============================================================================
// Normalizer seam
// ============================================================================

#[test]
fn test_injected_lemmas_drive_classification() {
    // A model-backed normalizer may know lemmas the rule-based one does not
    let normalizer = fixed_normalizer(vec![word("kicks", "sneaker"), word("scarlet", "red")]);
    let service = service(normalizer, MockSearchBackend::new());

    let parsed = service.parse("scarlet kicks").unwrap();
    assert_eq!(parsed.category.as_deref(), Some("shoe"));
    assert!(parsed.keywords.contains("scarlet"));
    assert_eq!(parsed.color, None);
}

#[test]
fn test_normalizer_failure_fails_parse() {
    let service = service(failing_normalizer(), MockSearchBackend::new());
    let err = service.parse("red shoes").unwrap_err();
    assert!(matches!(
        err,
        SearchError::Query(QueryError::NormalizerUnavailable(ref msg)) if msg == "model not loaded"
    ));
}

#[tokio::test]
async fn test_normalizer_failure_blocks_add_product() {
    let mut backend = MockSearchBackend::new();
    backend.expect_register().never();
    let service = service(failing_normalizer(), backend);

    let product = ProductRecord {
        name: Some("anything".to_string()),
        price: Some(10.0),
        ..Default::default()
    };
    let err = service.add_product(product).await.unwrap_err();
    assert!(matches!(err, SearchError::Query(_)));
}

// ============================================================================
// Backend seam
// ============================================================================

#[tokio::test]
async fn test_requests_carry_shared_filters() {
    let mut backend = MockSearchBackend::new();
    backend
        .expect_search()
        .withf(|request| {
            request.color.as_deref() == Some("red")
                && request.gender.as_deref() == Some("women")
                && request.brand.is_none()
                && request.price == Some(PriceFilter::Lte { value: 1500 })
                && request.query.is_none()
        })
        .times(3)
        .returning(|request| Ok(vec![json!({"category": request.category.clone()})]));

    let service = service(RuleBasedNormalizer::new(), backend);
    let results = service.search("red sneakers for women below 1500").await.unwrap();

    assert_eq!(results.total, 3);
    assert_eq!(
        results.results,
        vec![
            json!({"category": "shoe"}),
            json!({"category": "shoes"}),
            json!({"category": "sneakers"}),
        ]
    );
}

#[tokio::test]
async fn test_unstructured_query_searches_full_text() {
    let mut backend = MockSearchBackend::new();
    backend
        .expect_search()
        .withf(|request| {
            request.category.is_none()
                && request.price.is_none()
                && request.query.as_deref() == Some("comfortable for jogging")
        })
        .times(1)
        .returning(|_| Ok(Vec::new()));

    let service = service(RuleBasedNormalizer::new(), backend);
    let results = service.search("comfortable for jogging").await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_register_failure_surfaces() {
    let mut backend = MockSearchBackend::new();
    backend
        .expect_register()
        .times(1)
        .returning(|_| Err(SearchError::Backend("index is read-only".to_string())));

    let service = service(RuleBasedNormalizer::new(), backend);
    let product = ProductRecord {
        name: Some("canvas tote".to_string()),
        price: Some(499.0),
        ..Default::default()
    };
    let err = service.add_product(product).await.unwrap_err();
    assert!(matches!(err, SearchError::Backend(_)));
}
