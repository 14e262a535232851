//! Entity Classifier
//!
//! Single left-to-right scan over normalized tokens that assigns each token to
//! at most one of category, brand, color or gender, falling back to keywords.
//!
//! Precedence per token is fixed (category, brand, color, gender, keyword) and
//! a field resolved by an earlier token is never overridden by a later one.
//! Exact vocabulary membership always wins over fuzzy scoring; fuzzy scoring is
//! driven by the per-field [`ClassifierConfig`] table.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::fuzzy::{extract_one, Scorer};
use super::normalizer::Token;
use super::synonyms::SynonymMap;
use super::vocabulary::{VocabField, VocabularySets};

// ============================================================================
// Configuration
// ============================================================================

/// One fuzzy scoring method and the minimum score it must reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorerRule {
    pub scorer: Scorer,
    pub threshold: f64,
    /// Discard this method's match when the token is a substring of any
    /// category term ("shoe" inside "snowshoe").
    #[serde(default)]
    pub reject_category_substring: bool,
}

impl ScorerRule {
    pub fn new(scorer: Scorer, threshold: f64) -> Self {
        Self {
            scorer,
            threshold,
            reject_category_substring: false,
        }
    }

    pub fn rejecting_category_substrings(mut self) -> Self {
        self.reject_category_substring = true;
        self
    }
}

/// Ordered scoring methods for one field. Order breaks score ties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldMatchConfig {
    #[serde(default)]
    pub scorers: Vec<ScorerRule>,
}

impl FieldMatchConfig {
    pub fn single(scorer: Scorer, threshold: f64) -> Self {
        Self {
            scorers: vec![ScorerRule::new(scorer, threshold)],
        }
    }
}

/// Per-field fuzzy matching table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub category: FieldMatchConfig,
    pub brand: FieldMatchConfig,
    pub color: FieldMatchConfig,
    pub gender: FieldMatchConfig,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            category: FieldMatchConfig::single(Scorer::Ratio, 60.0),
            brand: FieldMatchConfig {
                scorers: vec![
                    ScorerRule::new(Scorer::Ratio, 80.0),
                    ScorerRule::new(Scorer::PartialRatio, 70.0).rejecting_category_substrings(),
                    ScorerRule::new(Scorer::TokenSortRatio, 80.0),
                    ScorerRule::new(Scorer::TokenSetRatio, 70.0).rejecting_category_substrings(),
                ],
            },
            color: FieldMatchConfig::single(Scorer::Ratio, 60.0),
            gender: FieldMatchConfig::single(Scorer::Ratio, 60.0),
        }
    }
}

impl ClassifierConfig {
    pub fn field(&self, field: VocabField) -> &FieldMatchConfig {
        match field {
            VocabField::Category => &self.category,
            VocabField::Brand => &self.brand,
            VocabField::Color => &self.color,
            VocabField::Gender => &self.gender,
        }
    }
}

// ============================================================================
// Classification
// ============================================================================

/// Fields extracted from a token stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedEntities {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub gender: Option<String>,
    pub keywords: BTreeSet<String>,
}

impl ClassifiedEntities {
    fn slot(&mut self, field: VocabField) -> &mut Option<String> {
        match field {
            VocabField::Category => &mut self.category,
            VocabField::Brand => &mut self.brand,
            VocabField::Color => &mut self.color,
            VocabField::Gender => &mut self.gender,
        }
    }
}

/// Token forms after synonym canonicalization.
struct TokenForms {
    raw: String,
    lemma: String,
}

/// Precedence-ordered token classifier.
#[derive(Debug, Clone)]
pub struct EntityClassifier {
    synonyms: SynonymMap,
    config: ClassifierConfig,
}

impl EntityClassifier {
    pub fn new(synonyms: SynonymMap, config: ClassifierConfig) -> Self {
        Self { synonyms, config }
    }

    pub fn synonyms(&self) -> &SynonymMap {
        &self.synonyms
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a token stream against one consistent vocabulary view.
    pub fn classify(&self, tokens: &[Token], vocab: &VocabularySets) -> ClassifiedEntities {
        let mut entities = ClassifiedEntities::default();

        for token in tokens {
            if token.is_punct {
                continue;
            }

            let forms = TokenForms {
                raw: self.synonyms.normalize(&token.surface),
                lemma: self.synonyms.normalize(&token.lemma),
            };

            if let Some((field, value)) = self.resolve(&forms, vocab, &entities) {
                log::debug!("Token '{}' resolved as {}: {}", token.surface, field, value);
                *entities.slot(field) = Some(value);
                continue;
            }

            if !token.is_stopword && !token.is_numeric {
                entities.keywords.insert(token.surface.clone());
            }
        }

        entities
    }

    /// First field (in precedence order) this token resolves.
    fn resolve(
        &self,
        forms: &TokenForms,
        vocab: &VocabularySets,
        resolved: &ClassifiedEntities,
    ) -> Option<(VocabField, String)> {
        if resolved.category.is_none() {
            if let Some(category) = self.match_category(forms, vocab) {
                return Some((VocabField::Category, category));
            }
        }

        if resolved.brand.is_none() && !self.is_category_term(forms, vocab) {
            if let Some(brand) = self.match_exact_or_fuzzy(VocabField::Brand, &forms.raw, vocab) {
                return Some((VocabField::Brand, brand));
            }
        }

        for field in [VocabField::Color, VocabField::Gender] {
            let unresolved = match field {
                VocabField::Color => resolved.color.is_none(),
                _ => resolved.gender.is_none(),
            };
            if unresolved {
                if let Some(value) = self.match_exact_or_fuzzy(field, &forms.raw, vocab) {
                    return Some((field, value));
                }
            }
        }

        None
    }

    fn match_category(&self, forms: &TokenForms, vocab: &VocabularySets) -> Option<String> {
        for candidate in [&forms.raw, &forms.lemma] {
            if vocab.contains(VocabField::Category, candidate) {
                return Some(candidate.clone());
            }
        }
        self.fuzzy_match(VocabField::Category, &forms.lemma, vocab)
    }

    fn is_category_term(&self, forms: &TokenForms, vocab: &VocabularySets) -> bool {
        vocab.contains(VocabField::Category, &forms.raw)
            || vocab.contains(VocabField::Category, &forms.lemma)
    }

    fn match_exact_or_fuzzy(
        &self,
        field: VocabField,
        token: &str,
        vocab: &VocabularySets,
    ) -> Option<String> {
        if vocab.contains(field, token) {
            return Some(token.to_string());
        }
        self.fuzzy_match(field, token, vocab)
    }

    /// Best candidate across the field's scoring methods that clears its
    /// threshold. Equal scores keep the earlier method's candidate.
    fn fuzzy_match(&self, field: VocabField, token: &str, vocab: &VocabularySets) -> Option<String> {
        let pool = vocab.terms(field);
        if pool.is_empty() || token.is_empty() {
            return None;
        }

        let categories = vocab.terms(VocabField::Category);
        let inside_category = categories.iter().any(|c| c.contains(token));

        let mut best: Option<(&str, f64)> = None;
        for rule in &self.config.field(field).scorers {
            if rule.reject_category_substring && inside_category {
                continue;
            }
            let Some((choice, score)) = extract_one(token, pool.iter().map(String::as_str), rule.scorer)
            else {
                continue;
            };
            if score < rule.threshold {
                continue;
            }
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((choice, score));
            }
        }

        best.map(|(choice, score)| {
            log::trace!("Fuzzy {} match '{}' -> '{}' ({:.1})", field, token, choice, score);
            choice.to_string()
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
