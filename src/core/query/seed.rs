//! Seed Data
//!
//! Built-in vocabulary, synonym table, multiword rewrites and search expansion
//! table. A TOML file can replace any section; sections missing from the file
//! keep their built-in values.
//!
//! ```toml
//! categories = ["shoe", "jacket"]
//!
//! [synonyms.categories]
//! jacket = ["jackets", "coat"]
//!
//! [[rewrites]]
//! pattern = "smart phones?"
//! replacement = "smartphone"
//!
//! [expansions.categories]
//! jacket = ["jacket", "jackets"]
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::{QueryError, Result};
use super::synonyms::{MultiwordRewriter, RewriteRule, SynonymMap};
use super::vocabulary::{VocabField, VocabularyRegistry};
use crate::core::search::expander::ExpansionTable;

// ============================================================================
// Built-in tables
// ============================================================================

pub const DEFAULT_CATEGORIES: &[&str] = &[
    "shoe", "sandal", "boot", "heel", "flat", "slipper",
    "smartphone", "earphone", "electronics",
];

pub const DEFAULT_COLORS: &[&str] = &[
    "red", "blue", "black", "white", "green", "yellow",
    "pink", "brown", "grey", "orange", "purple",
];

pub const DEFAULT_GENDERS: &[&str] = &["men", "women", "boys", "girls", "unisex"];

pub const DEFAULT_BRANDS: &[&str] = &[
    "nike", "adidas", "puma", "reebok", "skechers", "new balance", "fila",
    "converse", "vans", "woodland", "bata", "h&m", "zara", "campus", "sparx",
    "crocs", "iphone", "samsung", "apple", "xiaomi", "oneplus", "oppo", "vivo",
];

const CATEGORY_SYNONYMS: &[(&str, &[&str])] = &[
    ("shoe", &["shoes", "sneaker", "sneakers", "trainer", "trainers", "footwear"]),
    ("smartphone", &["phone", "phones", "mobile", "mobiles", "cellphone", "smartphones"]),
    ("earphone", &["earphones", "earbuds", "earbud", "headphone", "headphones"]),
    ("sandal", &["sandals"]),
    ("boot", &["boots"]),
    ("heel", &["heels"]),
    ("flat", &["flats"]),
    ("slipper", &["slippers"]),
    ("electronics", &["electronic", "gadget", "gadgets"]),
];

const BRAND_SYNONYMS: &[(&str, &[&str])] = &[
    ("h&m", &["hm"]),
    ("new balance", &["nb"]),
    ("adidas", &["addidas"]),
];

const COLOR_SYNONYMS: &[(&str, &[&str])] = &[("grey", &["gray"])];

const GENDER_SYNONYMS: &[(&str, &[&str])] = &[
    ("men", &["man", "male", "males", "mens", "gents"]),
    ("women", &["woman", "female", "females", "womens", "ladies", "lady"]),
    ("boys", &["boy"]),
    ("girls", &["girl"]),
];

pub const MULTIWORD_REWRITES: &[(&str, &str)] = &[
    (r"smart phones?", "smartphone"),
    (r"running shoes?", "sports shoes"),
];

const CATEGORY_EXPANSIONS: &[(&str, &[&str])] = &[
    ("shoe", &["shoe", "shoes", "sneakers"]),
    ("smartphone", &["smartphone", "phone"]),
];

const BRAND_EXPANSIONS: &[(&str, &[&str])] = &[("iphone", &["apple", "iphone"])];

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Built-in synonym table.
pub fn default_synonyms() -> SynonymMap {
    let mut map = SynonymMap::new();
    let tables = [
        (VocabField::Category, CATEGORY_SYNONYMS),
        (VocabField::Brand, BRAND_SYNONYMS),
        (VocabField::Color, COLOR_SYNONYMS),
        (VocabField::Gender, GENDER_SYNONYMS),
    ];
    for (field, entries) in tables {
        for (canonical, aliases) in entries {
            map.add(field, canonical, aliases);
        }
    }
    map
}

/// Built-in multiword rewrite rules.
pub fn default_rewrites() -> Vec<RewriteRule> {
    MULTIWORD_REWRITES
        .iter()
        .map(|(pattern, replacement)| RewriteRule::new(pattern, replacement))
        .collect()
}

/// Built-in category/brand fan-out table.
pub fn default_expansions() -> ExpansionTable {
    let mut table = ExpansionTable::default();
    for (canonical, terms) in CATEGORY_EXPANSIONS {
        table.categories.insert(canonical.to_string(), to_strings(terms));
    }
    for (canonical, terms) in BRAND_EXPANSIONS {
        table.brands.insert(canonical.to_string(), to_strings(terms));
    }
    table
}

// ============================================================================
// Seed Data
// ============================================================================

/// Everything needed to build the query pipeline's static state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub categories: Vec<String>,
    pub colors: Vec<String>,
    pub brands: Vec<String>,
    pub genders: Vec<String>,
    pub synonyms: SynonymMap,
    pub rewrites: Vec<RewriteRule>,
    pub expansions: ExpansionTable,
}

impl Default for SeedData {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SeedData {
    /// Built-in seed.
    pub fn builtin() -> Self {
        Self {
            categories: to_strings(DEFAULT_CATEGORIES),
            colors: to_strings(DEFAULT_COLORS),
            brands: to_strings(DEFAULT_BRANDS),
            genders: to_strings(DEFAULT_GENDERS),
            synonyms: default_synonyms(),
            rewrites: default_rewrites(),
            expansions: default_expansions(),
        }
    }

    /// Load a seed override from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let seed: SeedData = toml::from_str(&content)?;
        let seed = seed.normalized();
        seed.validate()?;

        log::info!("Loaded seed data from {:?}", path);
        Ok(seed)
    }

    /// Seed from `path` when given and present, otherwise the built-in seed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) if path.exists() => Self::from_toml_file(path),
            Some(path) => {
                log::warn!("Seed file {:?} not found, using built-in seed", path);
                Ok(Self::builtin())
            }
            None => Ok(Self::builtin()),
        }
    }

    fn normalized(mut self) -> Self {
        for list in [
            &mut self.categories,
            &mut self.colors,
            &mut self.brands,
            &mut self.genders,
        ] {
            for term in list.iter_mut() {
                *term = term.trim().to_lowercase();
            }
        }
        self.synonyms = self.synonyms.normalized();
        self
    }

    fn validate(&self) -> Result<()> {
        let lists = [
            (VocabField::Category, &self.categories),
            (VocabField::Color, &self.colors),
            (VocabField::Brand, &self.brands),
            (VocabField::Gender, &self.genders),
        ];
        for (field, terms) in lists {
            if terms.iter().any(|t| t.is_empty()) {
                return Err(QueryError::InvalidSeed(format!("blank {} term", field)));
            }
        }
        if self.rewrites.iter().any(|r| r.pattern.trim().is_empty()) {
            return Err(QueryError::InvalidSeed("blank rewrite pattern".to_string()));
        }
        Ok(())
    }

    /// Fresh vocabulary registry seeded from the lists and synonym keys.
    pub fn registry(&self) -> VocabularyRegistry {
        VocabularyRegistry::seeded(
            &self.categories,
            &self.colors,
            &self.brands,
            &self.genders,
            &self.synonyms,
        )
    }

    /// Compile the multiword rewrite rules.
    pub fn rewriter(&self) -> Result<MultiwordRewriter> {
        MultiwordRewriter::new(&self.rewrites)
    }
}
