//! Candidate Expander & Merger
//!
//! Fans a parsed query out into concrete backend requests and merges the
//! answers back into one list.
//!
//! Category and brand values expand through an [`ExpansionTable`] into the
//! literal terms the backend indexes ("shoe" → shoe, shoes, sneakers). The
//! requests are the cartesian product category × brand × color, built in that
//! loop order (category outermost). Gender, price and free text are shared by
//! every request.
//!
//! Requests run with bounded concurrency and a per-request timeout. Results are
//! merged in request order; identical documents keep their first position.
//! The first failing request fails the whole search and cancels the rest.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::backend::SearchBackend;
use super::config::SearchConfig;
use super::error::{Result, SearchError};
use super::models::{PriceFilter, SearchRequest, SearchResults};
use crate::core::query::ParsedQuery;

// ============================================================================
// Expansion Table
// ============================================================================

/// Canonical value → literal backend terms, for categories and brands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionTable {
    pub categories: IndexMap<String, Vec<String>>,
    pub brands: IndexMap<String, Vec<String>>,
}

fn expand(table: &IndexMap<String, Vec<String>>, value: Option<&str>) -> Vec<Option<String>> {
    match value {
        None => vec![None],
        Some(value) => match table.get(value) {
            Some(terms) if !terms.is_empty() => terms.iter().cloned().map(Some).collect(),
            _ => vec![Some(value.to_string())],
        },
    }
}

impl ExpansionTable {
    /// Candidate category terms; `[None]` when no category was extracted.
    pub fn expand_category(&self, category: Option<&str>) -> Vec<Option<String>> {
        expand(&self.categories, category)
    }

    /// Candidate brand terms; `[None]` when no brand was extracted.
    pub fn expand_brand(&self, brand: Option<&str>) -> Vec<Option<String>> {
        expand(&self.brands, brand)
    }
}

// ============================================================================
// Expander
// ============================================================================

/// Cartesian search fan-out over a backend.
pub struct CandidateExpander {
    backend: Arc<dyn SearchBackend>,
    expansions: ExpansionTable,
    config: SearchConfig,
}

impl CandidateExpander {
    pub fn new(backend: Arc<dyn SearchBackend>, expansions: ExpansionTable, config: SearchConfig) -> Self {
        Self {
            backend,
            expansions,
            config,
        }
    }

    pub fn backend(&self) -> &Arc<dyn SearchBackend> {
        &self.backend
    }

    /// Free text shared by every request: the whole query when nothing
    /// structured was extracted, otherwise the residual keywords (if any).
    pub fn free_text(parsed: &ParsedQuery, original_query: &str) -> Option<String> {
        if !parsed.has_structured_fields() {
            let query = original_query.trim();
            return (!query.is_empty()).then(|| query.to_string());
        }
        if parsed.keywords.is_empty() {
            return None;
        }
        Some(parsed.keywords.iter().map(String::as_str).collect::<Vec<_>>().join(" "))
    }

    /// One request per category × brand × color combination.
    pub fn build_requests(&self, parsed: &ParsedQuery, original_query: &str) -> Vec<SearchRequest> {
        let categories = self.expansions.expand_category(parsed.category.as_deref());
        let brands = self.expansions.expand_brand(parsed.brand.as_deref());
        let colors = vec![parsed.color.clone()];

        let price = PriceFilter::from_range(parsed.price_range());
        let query = Self::free_text(parsed, original_query);

        let mut requests = Vec::with_capacity(categories.len() * brands.len() * colors.len());
        for category in &categories {
            for brand in &brands {
                for color in &colors {
                    requests.push(SearchRequest {
                        category: category.clone(),
                        brand: brand.clone(),
                        color: color.clone(),
                        gender: parsed.gender.clone(),
                        price,
                        query: query.clone(),
                    });
                }
            }
        }
        requests
    }

    /// Run every request and merge the answers in request order.
    pub async fn execute(&self, requests: &[SearchRequest]) -> Result<Vec<Value>> {
        let timeout = self.config.request_timeout();
        log::debug!(
            "Executing {} search requests (concurrency {}, timeout {:?})",
            requests.len(),
            self.config.concurrency(),
            timeout
        );

        let batches: Vec<Vec<Value>> = stream::iter(requests)
            .map(|request| async move {
                match tokio::time::timeout(timeout, self.backend.search(request)).await {
                    Ok(result) => result,
                    Err(_) => Err(SearchError::Timeout(timeout)),
                }
            })
            .buffered(self.config.concurrency())
            .try_collect()
            .await?;

        Ok(merge_results(batches))
    }

    /// Build, execute and merge.
    pub async fn search(&self, parsed: &ParsedQuery, original_query: &str) -> Result<SearchResults> {
        let requests = self.build_requests(parsed, original_query);
        let results = self.execute(&requests).await?;
        log::info!(
            "Search '{}' issued {} requests, {} unique results",
            original_query,
            requests.len(),
            results.len()
        );
        Ok(SearchResults::new(results))
    }
}

/// Concatenate batches, dropping documents identical to an earlier one.
pub fn merge_results(batches: Vec<Vec<Value>>) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for doc in batches.into_iter().flatten() {
        if seen.insert(canonical(&doc).to_string()) {
            merged.push(doc);
        }
    }
    merged
}

/// Copy of `value` with every object's keys in sorted order, so documents
/// that differ only in key order serialize identically.
fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), canonical(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::search::backend::MockSearchBackend;
    use serde_json::json;
    use std::collections::BTreeSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn table() -> ExpansionTable {
        let mut table = ExpansionTable::default();
        table.categories.insert(
            "shoe".to_string(),
            vec!["shoe".to_string(), "shoes".to_string(), "sneakers".to_string()],
        );
        table
            .brands
            .insert("iphone".to_string(), vec!["apple".to_string(), "iphone".to_string()]);
        table
    }

    fn expander(backend: MockSearchBackend) -> CandidateExpander {
        CandidateExpander::new(Arc::new(backend), table(), SearchConfig::default())
    }

    fn keywords(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_expand_unmapped_and_absent() {
        let table = table();
        assert_eq!(table.expand_category(Some("boot")), vec![Some("boot".to_string())]);
        assert_eq!(table.expand_category(None), vec![None]);
        assert_eq!(table.expand_brand(Some("iphone")).len(), 2);
    }

    #[test]
    fn test_request_count_is_product_of_candidates() {
        let expander = expander(MockSearchBackend::new());
        let parsed = ParsedQuery {
            category: Some("shoe".to_string()),
            brand: Some("iphone".to_string()),
            color: Some("red".to_string()),
            gender: Some("women".to_string()),
            price_max: Some(1500),
            ..Default::default()
        };

        let requests = expander.build_requests(&parsed, "whatever");
        assert_eq!(requests.len(), 3 * 2 * 1);

        // Category is the outer loop
        let order: Vec<(Option<&str>, Option<&str>)> = requests
            .iter()
            .map(|r| (r.category.as_deref(), r.brand.as_deref()))
            .collect();
        assert_eq!(
            order,
            vec![
                (Some("shoe"), Some("apple")),
                (Some("shoe"), Some("iphone")),
                (Some("shoes"), Some("apple")),
                (Some("shoes"), Some("iphone")),
                (Some("sneakers"), Some("apple")),
                (Some("sneakers"), Some("iphone")),
            ]
        );
        for request in &requests {
            assert_eq!(request.gender.as_deref(), Some("women"));
            assert_eq!(request.color.as_deref(), Some("red"));
            assert_eq!(request.price, Some(PriceFilter::Lte { value: 1500 }));
            assert_eq!(request.query, None);
        }
    }

    #[test]
    fn test_free_text_rules() {
        let unstructured = ParsedQuery {
            keywords: keywords(&["comfortable"]),
            ..Default::default()
        };
        assert_eq!(
            CandidateExpander::free_text(&unstructured, " comfortable for jogging "),
            Some("comfortable for jogging".to_string())
        );

        let structured = ParsedQuery {
            keywords: keywords(&["jogging", "comfortable"]),
            price_min: Some(10),
            ..Default::default()
        };
        assert_eq!(
            CandidateExpander::free_text(&structured, "ignored"),
            Some("comfortable jogging".to_string())
        );

        let no_keywords = ParsedQuery {
            color: Some("red".to_string()),
            ..Default::default()
        };
        assert_eq!(CandidateExpander::free_text(&no_keywords, "red"), None);
    }

    #[test]
    fn test_merge_dedupes_in_first_appearance_order() {
        let a = json!({"name": "a", "price": 1});
        let b = json!({"price": 2, "name": "b"});
        let b_again = json!({"name": "b", "price": 2});
        let merged = merge_results(vec![vec![a.clone(), b.clone()], vec![b_again, a.clone()]]);
        assert_eq!(merged, vec![a, b]);
    }

    #[test]
    fn test_merge_ignores_key_order() {
        let mut reordered = serde_json::Map::new();
        reordered.insert("tags".to_string(), json!(["b", "a"]));
        reordered.insert("meta".to_string(), json!({"stock": 3, "discount": 10}));
        reordered.insert("id".to_string(), json!(1));

        let merged = merge_results(vec![
            vec![json!({"id": 1, "meta": {"discount": 10, "stock": 3}, "tags": ["b", "a"]})],
            vec![Value::Object(reordered), json!({"id": 1, "tags": ["a", "b"]})],
        ]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1], json!({"id": 1, "tags": ["a", "b"]}));
    }

    #[test]
    fn test_canonical_sorts_nested_keys() {
        let mut inner = serde_json::Map::new();
        inner.insert("z".to_string(), json!(1));
        inner.insert("a".to_string(), json!(2));
        let mut outer = serde_json::Map::new();
        outer.insert("list".to_string(), json!([Value::Object(inner)]));
        outer.insert("b".to_string(), json!(null));

        assert_eq!(
            canonical(&Value::Object(outer)).to_string(),
            r#"{"b":null,"list":[{"a":2,"z":1}]}"#
        );
    }

    #[tokio::test]
    async fn test_execute_merges_identical_records() {
        let mut backend = MockSearchBackend::new();
        backend
            .expect_search()
            .times(3)
            .returning(|request| {
                let shared = json!({"name": "red nike sneakers"});
                let own = json!({"name": request.category.clone()});
                Ok(vec![shared, own])
            });

        let expander = expander(backend);
        let parsed = ParsedQuery {
            category: Some("shoe".to_string()),
            ..Default::default()
        };
        let results = expander.search(&parsed, "shoe").await.unwrap();

        assert_eq!(results.total, 4);
        assert_eq!(
            results.results,
            vec![
                json!({"name": "red nike sneakers"}),
                json!({"name": "shoe"}),
                json!({"name": "shoes"}),
                json!({"name": "sneakers"}),
            ]
        );
    }

    #[tokio::test]
    async fn test_backend_failure_fails_operation() {
        let mut backend = MockSearchBackend::new();
        backend.expect_search().returning(|request| {
            if request.category.as_deref() == Some("shoes") {
                Err(SearchError::Backend("connection refused".to_string()))
            } else {
                Ok(vec![json!({"name": "x"})])
            }
        });

        let expander = expander(backend);
        let parsed = ParsedQuery {
            category: Some("shoe".to_string()),
            ..Default::default()
        };
        let err = expander.search(&parsed, "shoe").await.unwrap_err();
        assert!(matches!(err, SearchError::Backend(ref msg) if msg == "connection refused"));
    }

    struct SlowBackend;

    #[async_trait::async_trait]
    impl SearchBackend for SlowBackend {
        async fn search(&self, _request: &SearchRequest) -> Result<Vec<Value>> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Vec::new())
        }

        async fn register(&self, _record: &crate::core::search::models::ProductRecord) -> Result<()> {
            Ok(())
        }
    }

    /// Records how many searches are running at once.
    #[derive(Default)]
    struct CountingBackend {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl SearchBackend for CountingBackend {
        async fn search(&self, request: &SearchRequest) -> Result<Vec<Value>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(running, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(20)).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![json!({"category": request.category, "brand": request.brand})])
        }

        async fn register(&self, _record: &crate::core::search::models::ProductRecord) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_capped() {
        let backend = Arc::new(CountingBackend::default());
        let config = SearchConfig {
            max_concurrent_requests: 2,
            ..Default::default()
        };
        let expander = CandidateExpander::new(backend.clone(), table(), config);
        let parsed = ParsedQuery {
            category: Some("shoe".to_string()),
            brand: Some("iphone".to_string()),
            ..Default::default()
        };

        let results = expander.search(&parsed, "apple shoes").await.unwrap();

        assert_eq!(backend.calls.load(Ordering::SeqCst), 6);
        assert_eq!(backend.peak.load(Ordering::SeqCst), 2);
        assert_eq!(results.total, 6);
        assert_eq!(results.results[0], json!({"category": "shoe", "brand": "apple"}));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let config = SearchConfig {
            request_timeout_ms: 50,
            ..Default::default()
        };
        let expander = CandidateExpander::new(Arc::new(SlowBackend), table(), config);
        let err = expander
            .search(&ParsedQuery::default(), "anything")
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Timeout(d) if d == Duration::from_millis(50)));
    }
}
