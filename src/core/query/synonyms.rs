//! Synonym Resolution
//!
//! Field-scoped synonym table (canonical term → aliases) and the ordered
//! multiword rewrite rules applied to the raw query before tokenization.

use indexmap::IndexMap;
use regex::{NoExpand, Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::error::{QueryError, Result};
use super::vocabulary::VocabField;

// ============================================================================
// Synonym Map
// ============================================================================

/// Per-field mapping from canonical term to its aliases.
///
/// Lookups scan fields in the order categories, brands, colors, genders and
/// return the first canonical term listing the alias.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynonymMap {
    pub categories: IndexMap<String, Vec<String>>,
    pub brands: IndexMap<String, Vec<String>>,
    pub colors: IndexMap<String, Vec<String>>,
    pub genders: IndexMap<String, Vec<String>>,
}

impl SynonymMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, field: VocabField) -> &IndexMap<String, Vec<String>> {
        match field {
            VocabField::Category => &self.categories,
            VocabField::Brand => &self.brands,
            VocabField::Color => &self.colors,
            VocabField::Gender => &self.genders,
        }
    }

    fn table_mut(&mut self, field: VocabField) -> &mut IndexMap<String, Vec<String>> {
        match field {
            VocabField::Category => &mut self.categories,
            VocabField::Brand => &mut self.brands,
            VocabField::Color => &mut self.colors,
            VocabField::Gender => &mut self.genders,
        }
    }

    /// Add aliases for a canonical term (both stored lowercase).
    pub fn add(&mut self, field: VocabField, canonical: &str, aliases: &[&str]) {
        let entry = self
            .table_mut(field)
            .entry(canonical.trim().to_lowercase())
            .or_default();
        for alias in aliases {
            let alias = alias.trim().to_lowercase();
            if !alias.is_empty() && !entry.contains(&alias) {
                entry.push(alias);
            }
        }
    }

    /// Map a token to its canonical term, or return it lowercased unchanged.
    pub fn normalize(&self, token: &str) -> String {
        let token = token.to_lowercase();
        for field in VocabField::ALL {
            if let Some(canonical) = self.lookup(field, &token) {
                return canonical.to_string();
            }
        }
        token
    }

    /// Canonical term for an alias within a single field.
    pub fn lookup(&self, field: VocabField, alias: &str) -> Option<&str> {
        self.table(field)
            .iter()
            .find(|(_, aliases)| aliases.iter().any(|a| a.eq_ignore_ascii_case(alias)))
            .map(|(canonical, _)| canonical.as_str())
    }

    /// Canonical terms of a field, in table order.
    pub fn canonical_terms(&self, field: VocabField) -> impl Iterator<Item = &str> {
        self.table(field).keys().map(String::as_str)
    }

    /// Aliases registered for a canonical term.
    pub fn aliases(&self, field: VocabField, canonical: &str) -> Option<&[String]> {
        self.table(field)
            .get(&canonical.to_lowercase())
            .map(Vec::as_slice)
    }

    /// Lowercase every key and alias (for tables read from files).
    pub fn normalized(self) -> Self {
        let mut out = Self::new();
        for field in VocabField::ALL {
            for (canonical, aliases) in self.table(field) {
                let aliases: Vec<&str> = aliases.iter().map(String::as_str).collect();
                out.add(field, canonical, &aliases);
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        VocabField::ALL.iter().all(|f| self.table(*f).is_empty())
    }
}

// ============================================================================
// Multiword Rewrites
// ============================================================================

/// A single `pattern → replacement` rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRule {
    pub pattern: String,
    pub replacement: String,
}

impl RewriteRule {
    pub fn new(pattern: &str, replacement: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

/// Ordered, case-insensitive phrase rewrites ("smart phone" → "smartphone").
#[derive(Debug, Clone)]
pub struct MultiwordRewriter {
    rules: Vec<(Regex, String)>,
}

impl MultiwordRewriter {
    /// Compile the rules in order.
    pub fn new(rules: &[RewriteRule]) -> Result<Self> {
        let compiled = rules
            .iter()
            .map(|rule| {
                RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (re, rule.replacement.clone()))
                    .map_err(|source| QueryError::InvalidPattern {
                        pattern: rule.pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules: compiled })
    }

    /// Apply every rule in listed order, each globally.
    pub fn apply(&self, query: &str) -> String {
        let mut rewritten = query.to_string();
        for (re, replacement) in &self.rules {
            rewritten = re
                .replace_all(&rewritten, NoExpand(replacement.as_str()))
                .into_owned();
        }
        rewritten
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
