//! Vocabulary Registry
//!
//! Process-wide, append-only sets of known categories, colors, brands and
//! genders. The registry supplies exact-match lookups and fuzzy candidate
//! pools to the classifier and grows whenever a product is registered.
//!
//! # Thread Safety
//!
//! All sets live behind one `std::sync::RwLock`. Classification takes a read
//! guard for the duration of a parse; registrations take the write guard only
//! long enough to append.

use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::synonyms::SynonymMap;
use crate::core::search::models::ProductRecord;

// ============================================================================
// Fields
// ============================================================================

/// A vocabulary field that can be extracted from a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VocabField {
    Category,
    Brand,
    Color,
    Gender,
}

impl VocabField {
    /// Synonym scan order.
    pub const ALL: [VocabField; 4] = [
        VocabField::Category,
        VocabField::Brand,
        VocabField::Color,
        VocabField::Gender,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VocabField::Category => "category",
            VocabField::Brand => "brand",
            VocabField::Color => "color",
            VocabField::Gender => "gender",
        }
    }
}

impl fmt::Display for VocabField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Term Sets
// ============================================================================

/// The four term sets. Terms are stored lowercase and trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VocabularySets {
    categories: IndexSet<String>,
    colors: IndexSet<String>,
    brands: IndexSet<String>,
    genders: IndexSet<String>,
}

impl VocabularySets {
    pub fn terms(&self, field: VocabField) -> &IndexSet<String> {
        match field {
            VocabField::Category => &self.categories,
            VocabField::Brand => &self.brands,
            VocabField::Color => &self.colors,
            VocabField::Gender => &self.genders,
        }
    }

    fn terms_mut(&mut self, field: VocabField) -> &mut IndexSet<String> {
        match field {
            VocabField::Category => &mut self.categories,
            VocabField::Brand => &mut self.brands,
            VocabField::Color => &mut self.colors,
            VocabField::Gender => &mut self.genders,
        }
    }

    /// Case-insensitive membership.
    pub fn contains(&self, field: VocabField, term: &str) -> bool {
        self.terms(field).contains(&term.trim().to_lowercase())
    }

    fn insert(&mut self, field: VocabField, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return false;
        }
        self.terms_mut(field).insert(term)
    }
}

/// Serializable copy of the current vocabulary lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularySnapshot {
    pub categories: Vec<String>,
    pub colors: Vec<String>,
    pub brands: Vec<String>,
    pub genders: Vec<String>,
}

impl VocabularySnapshot {
    pub fn len(&self, field: VocabField) -> usize {
        match field {
            VocabField::Category => self.categories.len(),
            VocabField::Brand => self.brands.len(),
            VocabField::Color => self.colors.len(),
            VocabField::Gender => self.genders.len(),
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Shared vocabulary registry. Wrap in an `Arc` to share between the parser
/// and the product registration path.
#[derive(Debug, Default)]
pub struct VocabularyRegistry {
    sets: RwLock<VocabularySets>,
}

impl VocabularyRegistry {
    /// Create an empty registry.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a registry from seed lists plus every canonical synonym key.
    pub fn seeded(
        categories: &[String],
        colors: &[String],
        brands: &[String],
        genders: &[String],
        synonyms: &SynonymMap,
    ) -> Self {
        let mut sets = VocabularySets::default();
        let seeds = [
            (VocabField::Category, categories),
            (VocabField::Color, colors),
            (VocabField::Brand, brands),
            (VocabField::Gender, genders),
        ];
        for (field, terms) in seeds {
            for term in terms {
                sets.insert(field, term);
            }
            for canonical in synonyms.canonical_terms(field) {
                sets.insert(field, canonical);
            }
        }

        log::info!(
            "Vocabulary seeded: {} categories, {} colors, {} brands, {} genders",
            sets.categories.len(),
            sets.colors.len(),
            sets.brands.len(),
            sets.genders.len()
        );

        Self {
            sets: RwLock::new(sets),
        }
    }

    /// Read guard over all sets; hold it for a whole parse to see one
    /// consistent vocabulary.
    pub fn read(&self) -> RwLockReadGuard<'_, VocabularySets> {
        self.sets.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Case-insensitive membership check.
    pub fn contains(&self, field: VocabField, term: &str) -> bool {
        self.read().contains(field, term)
    }

    /// Add a term if not already present (case-insensitive).
    ///
    /// Returns `true` when the term was new. Blank terms are ignored.
    pub fn add(&self, field: VocabField, term: &str) -> bool {
        if term.trim().is_empty() || self.contains(field, term) {
            return false;
        }

        let added = self
            .sets
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(field, term);

        if added {
            log::info!("Added {}: {}", field, term.trim().to_lowercase());
        }
        added
    }

    /// Grow the vocabulary from a product's category, color, brand and gender.
    ///
    /// Returns the `(field, term)` pairs that were new.
    pub fn register_product(&self, record: &ProductRecord) -> Vec<(VocabField, String)> {
        let mut added = Vec::new();
        for field in [
            VocabField::Category,
            VocabField::Color,
            VocabField::Brand,
            VocabField::Gender,
        ] {
            if let Some(value) = record.vocab_value(field) {
                if self.add(field, value) {
                    added.push((field, value.trim().to_lowercase()));
                }
            }
        }
        added
    }

    /// Every member of one field exactly once, in insertion order.
    pub fn snapshot(&self, field: VocabField) -> Vec<String> {
        self.read().terms(field).iter().cloned().collect()
    }

    /// Copy of all four lists.
    pub fn snapshot_all(&self) -> VocabularySnapshot {
        let sets = self.read();
        VocabularySnapshot {
            categories: sets.categories.iter().cloned().collect(),
            colors: sets.colors.iter().cloned().collect(),
            brands: sets.brands.iter().cloned().collect(),
            genders: sets.genders.iter().cloned().collect(),
        }
    }

    pub fn len(&self, field: VocabField) -> usize {
        self.read().terms(field).len()
    }
}
