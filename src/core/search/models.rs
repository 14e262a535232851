//! Search Models
//!
//! Product records, backend search requests, price filters and merged results.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::query::vocabulary::VocabField;
use crate::core::query::PriceRange;

// ============================================================================
// Product Record
// ============================================================================

/// A catalog product. Every field is optional; empty or whitespace-only
/// strings count as not provided.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photo_links: Vec<String>,
}

fn provided(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ProductRecord {
    /// Value of a vocabulary field, if provided.
    pub fn vocab_value(&self, field: VocabField) -> Option<&str> {
        match field {
            VocabField::Category => provided(&self.category),
            VocabField::Brand => provided(&self.brand),
            VocabField::Color => provided(&self.color),
            VocabField::Gender => provided(&self.gender),
        }
    }

    pub fn name(&self) -> Option<&str> {
        provided(&self.name)
    }

    pub fn description(&self) -> Option<&str> {
        provided(&self.description)
    }

    /// Serialize into the document shape returned by search backends.
    pub fn to_document(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

// ============================================================================
// Price Filter
// ============================================================================

/// Numeric price condition applied by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operator", rename_all = "snake_case")]
pub enum PriceFilter {
    /// Inclusive on both ends
    Between { min: u64, max: u64 },
    Lt { value: u64 },
    Lte { value: u64 },
    Gt { value: u64 },
    Gte { value: u64 },
}

impl PriceFilter {
    /// Both bounds → `Between`, min only → `Gte`, max only → `Lte`.
    pub fn from_bounds(min: Option<u64>, max: Option<u64>) -> Option<Self> {
        match (min, max) {
            (Some(min), Some(max)) => Some(PriceFilter::Between { min, max }),
            (Some(min), None) => Some(PriceFilter::Gte { value: min }),
            (None, Some(max)) => Some(PriceFilter::Lte { value: max }),
            (None, None) => None,
        }
    }

    pub fn from_range(range: PriceRange) -> Option<Self> {
        Self::from_bounds(range.min, range.max)
    }

    pub fn matches(&self, price: f64) -> bool {
        match *self {
            PriceFilter::Between { min, max } => price >= min as f64 && price <= max as f64,
            PriceFilter::Lt { value } => price < value as f64,
            PriceFilter::Lte { value } => price <= value as f64,
            PriceFilter::Gt { value } => price > value as f64,
            PriceFilter::Gte { value } => price >= value as f64,
        }
    }
}

// ============================================================================
// Requests and Results
// ============================================================================

/// One concrete backend request built from a candidate combination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Exact-match category term
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Exact-match brand term
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    /// Exact-match color term
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Exact-match gender term
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<PriceFilter>,

    /// Free text for fuzzy multi-field matching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

/// Merged, deduplicated search output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResults {
    pub total: usize,
    pub results: Vec<Value>,
}

impl SearchResults {
    pub fn new(results: Vec<Value>) -> Self {
        Self {
            total: results.len(),
            results,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
