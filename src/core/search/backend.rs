//! Search Backend
//!
//! The [`SearchBackend`] trait is the only way the search subsystem talks to a
//! product index. [`InMemorySearchBackend`] implements the full backend
//! contract over an in-process catalog:
//!
//! - exact term filters on category, brand, color and gender
//! - numeric price filter
//! - fuzzy multi-field free text, at least one clause must match
//! - sort by relevance, rating, discount (all descending), then price ascending

use std::cmp::Ordering;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::error::{Result, SearchError};
use super::models::{ProductRecord, SearchRequest};

// ============================================================================
// Contract
// ============================================================================

/// Product index consumed by the expander and the service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Ordered matching documents for one request.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Value>>;

    /// Index a product. The product is visible to `search` once this returns.
    async fn register(&self, record: &ProductRecord) -> Result<()>;
}

// ============================================================================
// Text Matching
// ============================================================================

/// A weighted set of fields matched together with one fuzziness prefix.
struct TextClause {
    fields: &'static [(TextField, f64)],
    prefix_length: usize,
}

#[derive(Clone, Copy)]
enum TextField {
    Name,
    Description,
    Category,
    Brand,
}

const TEXT_CLAUSES: &[TextClause] = &[
    TextClause {
        fields: &[
            (TextField::Name, 3.0),
            (TextField::Description, 1.0),
            (TextField::Category, 1.0),
        ],
        prefix_length: 2,
    },
    TextClause {
        fields: &[(TextField::Brand, 2.0), (TextField::Name, 3.0)],
        prefix_length: 1,
    },
];

/// Score contribution of a fuzzy (non-exact) term match
const FUZZY_MATCH_SCORE: f64 = 0.5;

fn field_text(record: &ProductRecord, field: TextField) -> Option<&str> {
    match field {
        TextField::Name => record.name.as_deref(),
        TextField::Description => record.description.as_deref(),
        TextField::Category => record.category.as_deref(),
        TextField::Brand => record.brand.as_deref(),
    }
}

fn analyze(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '&')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Allowed edit distance for a term, by its length in chars.
fn auto_fuzziness(term: &str) -> usize {
    match term.chars().count() {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

fn term_score(query_term: &str, field_term: &str, prefix_length: usize) -> f64 {
    if query_term == field_term {
        return 1.0;
    }
    let max_edits = auto_fuzziness(query_term);
    if max_edits == 0 {
        return 0.0;
    }
    let same_prefix = query_term
        .chars()
        .take(prefix_length)
        .eq(field_term.chars().take(prefix_length));
    if same_prefix && strsim::levenshtein(query_term, field_term) <= max_edits {
        FUZZY_MATCH_SCORE
    } else {
        0.0
    }
}

/// Best-field score of one clause: the highest weighted field score, where a
/// field scores the sum of its best per-term matches.
fn clause_score(clause: &TextClause, query_terms: &[String], record: &ProductRecord) -> f64 {
    clause
        .fields
        .iter()
        .filter_map(|(field, weight)| {
            let field_terms = analyze(field_text(record, *field)?);
            let score: f64 = query_terms
                .iter()
                .map(|q| {
                    field_terms
                        .iter()
                        .map(|f| term_score(q, f, clause.prefix_length))
                        .fold(0.0, f64::max)
                })
                .sum();
            Some(score * weight)
        })
        .fold(0.0, f64::max)
}

fn text_score(query: &str, record: &ProductRecord) -> f64 {
    let terms = analyze(query);
    TEXT_CLAUSES
        .iter()
        .map(|clause| clause_score(clause, &terms, record))
        .sum()
}

fn term_matches(value: Option<&str>, term: &Option<String>) -> bool {
    match term {
        None => true,
        Some(term) => value.is_some_and(|v| v.trim().eq_ignore_ascii_case(term.trim())),
    }
}

fn passes_filters(request: &SearchRequest, record: &ProductRecord) -> bool {
    term_matches(record.category.as_deref(), &request.category)
        && term_matches(record.brand.as_deref(), &request.brand)
        && term_matches(record.color.as_deref(), &request.color)
        && term_matches(record.gender.as_deref(), &request.gender)
        && request
            .price
            .map_or(true, |filter| record.price.is_some_and(|p| filter.matches(p)))
}

fn descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    b.unwrap_or(0.0).total_cmp(&a.unwrap_or(0.0))
}

// ============================================================================
// In-memory Backend
// ============================================================================

/// Product index held in memory.
#[derive(Debug, Default)]
pub struct InMemorySearchBackend {
    products: RwLock<Vec<ProductRecord>>,
}

impl InMemorySearchBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<ProductRecord>) -> Self {
        Self {
            products: RwLock::new(products),
        }
    }

    /// Load a catalog from a JSON array of product records.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let products: Vec<ProductRecord> = serde_json::from_str(&content)?;
        log::info!("Loaded {} products from {:?}", products.len(), path);
        Ok(Self::with_products(products))
    }

    pub async fn len(&self) -> usize {
        self.products.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.products.read().await.is_empty()
    }

    /// Copy of every indexed product, in insertion order.
    pub async fn products(&self) -> Vec<ProductRecord> {
        self.products.read().await.clone()
    }
}

#[async_trait]
impl SearchBackend for InMemorySearchBackend {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<Value>> {
        let products = self.products.read().await;
        let text = request.query.as_deref().map(str::trim).filter(|q| !q.is_empty());

        let mut hits: Vec<(f64, &ProductRecord)> = products
            .iter()
            .filter(|record| passes_filters(request, record))
            .filter_map(|record| match text {
                Some(query) => {
                    let score = text_score(query, record);
                    (score > 0.0).then_some((score, record))
                }
                None => Some((0.0, record)),
            })
            .collect();

        hits.sort_by(|(score_a, a), (score_b, b)| {
            score_b
                .total_cmp(score_a)
                .then_with(|| descending(a.rating, b.rating))
                .then_with(|| descending(a.discount.map(f64::from), b.discount.map(f64::from)))
                .then_with(|| {
                    a.price
                        .unwrap_or(f64::INFINITY)
                        .total_cmp(&b.price.unwrap_or(f64::INFINITY))
                })
        });

        log::debug!("In-memory search {:?}: {} hits", request, hits.len());

        hits.into_iter()
            .map(|(_, record)| record.to_document().map_err(SearchError::from))
            .collect()
    }

    async fn register(&self, record: &ProductRecord) -> Result<()> {
        self.products.write().await.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::search::models::PriceFilter;

    fn product(name: &str, category: &str, brand: &str, color: &str, price: f64, rating: f64) -> ProductRecord {
        ProductRecord {
            name: Some(name.to_string()),
            category: Some(category.to_string()),
            brand: Some(brand.to_string()),
            color: Some(color.to_string()),
            gender: Some("women".to_string()),
            price: Some(price),
            rating: Some(rating),
            ..Default::default()
        }
    }

    fn names(docs: &[Value]) -> Vec<&str> {
        docs.iter().filter_map(|d| d["name"].as_str()).collect()
    }

    fn backend() -> InMemorySearchBackend {
        InMemorySearchBackend::with_products(vec![
            product("red nike sneakers", "shoe", "nike", "red", 1400.0, 4.6),
            product("blue adidas shoes", "shoes", "adidas", "blue", 2100.0, 4.2),
            product("pink sparx slippers", "slipper", "sparx", "pink", 800.0, 4.0),
            product("red running shoe", "shoe", "puma", "red", 900.0, 4.8),
        ])
    }

    #[test]
    fn test_auto_fuzziness() {
        assert_eq!(auto_fuzziness("hi"), 0);
        assert_eq!(auto_fuzziness("nike"), 1);
        assert_eq!(auto_fuzziness("sneakers"), 2);
    }

    #[test]
    fn test_term_score_respects_prefix() {
        assert_eq!(term_score("nike", "nike", 2), 1.0);
        assert_eq!(term_score("nkie", "nike", 1), 0.0);
        assert_eq!(term_score("nikr", "nike", 2), FUZZY_MATCH_SCORE);
        assert_eq!(term_score("mike", "nike", 1), 0.0);
    }

    #[tokio::test]
    async fn test_term_filters() {
        let backend = backend();
        let request = SearchRequest {
            category: Some("shoe".to_string()),
            color: Some("red".to_string()),
            ..Default::default()
        };
        let docs = backend.search(&request).await.unwrap();
        // Equal relevance, so higher rating first
        assert_eq!(names(&docs), vec!["red running shoe", "red nike sneakers"]);
    }

    #[tokio::test]
    async fn test_price_filter() {
        let backend = backend();
        let request = SearchRequest {
            price: Some(PriceFilter::Lte { value: 1000 }),
            ..Default::default()
        };
        let docs = backend.search(&request).await.unwrap();
        assert_eq!(names(&docs), vec!["red running shoe", "pink sparx slippers"]);
    }

    #[tokio::test]
    async fn test_text_requires_a_match() {
        let backend = backend();
        let request = SearchRequest {
            query: Some("slipers".to_string()),
            ..Default::default()
        };
        let docs = backend.search(&request).await.unwrap();
        assert_eq!(names(&docs), vec!["pink sparx slippers"]);

        let request = SearchRequest {
            query: Some("laptop".to_string()),
            ..Default::default()
        };
        assert!(backend.search(&request).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_relevance_beats_rating() {
        let backend = backend();
        let request = SearchRequest {
            query: Some("nike".to_string()),
            ..Default::default()
        };
        let docs = backend.search(&request).await.unwrap();
        assert_eq!(names(&docs), vec!["red nike sneakers"]);
    }

    #[tokio::test]
    async fn test_register_is_visible() {
        let backend = InMemorySearchBackend::new();
        assert!(backend.is_empty().await);

        backend
            .register(&product("green fila flats", "flat", "fila", "green", 500.0, 3.9))
            .await
            .unwrap();

        let request = SearchRequest {
            brand: Some("FILA".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&backend.search(&request).await.unwrap()), vec!["green fila flats"]);
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            r#"[{"name": "iphone 12", "brand": "apple", "price": 50000}]"#,
        )
        .unwrap();

        let backend = InMemorySearchBackend::from_json_file(file.path()).unwrap();
        assert_eq!(backend.len().await, 1);
    }
}
