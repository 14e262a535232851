//! Linguistic Normalizer
//!
//! Tokenization and lemmatization contract consumed by the query parser, plus a
//! rule-based implementation that needs no language model. A model-backed
//! normalizer can be injected anywhere a [`LinguisticNormalizer`] is accepted.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

// ============================================================================
// Contract
// ============================================================================

/// A single token produced by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Text as it appeared in the input
    pub surface: String,
    /// Dictionary base form, lowercase
    pub lemma: String,
    pub is_stopword: bool,
    pub is_punct: bool,
    /// Looks like a number ("1500", "1,500", "2.5")
    pub is_numeric: bool,
}

/// The normalizer could not process the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("normalizer failure: {0}")]
pub struct NormalizerError(pub String);

/// Tokenize + lemmatize capability.
///
/// Implementations must be order-preserving and produce a finite token
/// sequence in a single pass.
#[cfg_attr(test, mockall::automock)]
pub trait LinguisticNormalizer: Send + Sync {
    fn tokenize_and_lemmatize(&self, text: &str) -> Result<Vec<Token>, NormalizerError>;
}

/// Lemmatize a phrase, dropping punctuation and joining lemmas with spaces.
pub fn lemmatize_phrase(
    normalizer: &dyn LinguisticNormalizer,
    text: &str,
) -> Result<String, NormalizerError> {
    let tokens = normalizer.tokenize_and_lemmatize(&text.to_lowercase())?;
    Ok(tokens
        .iter()
        .filter(|t| !t.is_punct)
        .map(|t| t.lemma.as_str())
        .collect::<Vec<_>>()
        .join(" "))
}

// ============================================================================
// Constants
// ============================================================================

/// English stop words
const STOP_WORDS: &[&str] = &[
    // Articles
    "a", "an", "the",
    // Pronouns
    "i", "you", "he", "she", "it", "we", "they",
    "me", "him", "her", "us", "them",
    "my", "your", "his", "its", "our", "their",
    "this", "that", "these", "those",
    "who", "whom", "whose", "which", "what",
    // Prepositions
    "in", "on", "at", "to", "for", "of", "with",
    "by", "from", "as", "into", "through", "during",
    "before", "after", "above", "below", "between",
    "under", "over", "out", "up", "down", "off",
    "about", "against", "among", "around", "than",
    // Conjunctions
    "and", "or", "but", "nor", "so", "yet",
    "because", "although", "while", "if", "unless",
    // Verbs (common)
    "is", "are", "was", "were", "be", "been", "being",
    "have", "has", "had", "having",
    "do", "does", "did", "doing",
    "will", "would", "could", "should", "may", "might", "must",
    "can", "shall",
    // Adverbs
    "not", "no", "very", "just", "only", "also",
    "too", "more", "most", "less", "least",
    "now", "then", "here", "there", "when", "where",
    "why", "how", "all", "each", "every", "both",
    "few", "many", "some", "any", "other", "such",
    "own", "same", "please", "show", "want", "need",
];

/// Irregular plural → lemma
const IRREGULAR_LEMMAS: &[(&str, &str)] = &[
    ("women", "woman"),
    ("men", "man"),
    ("children", "child"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("mice", "mouse"),
    ("people", "person"),
    ("knives", "knife"),
    ("wives", "wife"),
    ("leaves", "leaf"),
];

/// Words ending in "s" that are already base forms
const SINGULAR_S_WORDS: &[&str] = &[
    "dress", "glass", "plus", "bus", "gas", "lens", "series", "species",
    "this", "yes", "jeans", "shorts", "pants", "trousers", "sunglasses",
];

// ============================================================================
// Rule-based normalizer
// ============================================================================

/// Dictionary- and suffix-rule-based normalizer for English shopping queries.
#[derive(Debug, Clone)]
pub struct RuleBasedNormalizer {
    stop_words: HashSet<String>,
    irregular: HashMap<String, String>,
    singular_s: HashSet<String>,
}

impl Default for RuleBasedNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleBasedNormalizer {
    pub fn new() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().map(|s| s.to_string()).collect(),
            irregular: IRREGULAR_LEMMAS
                .iter()
                .map(|(word, lemma)| (word.to_string(), lemma.to_string()))
                .collect(),
            singular_s: SINGULAR_S_WORDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Check if a word is a stop word.
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word.to_lowercase())
    }

    /// Reduce a lowercase word to its base form.
    pub fn lemma(&self, word: &str) -> String {
        let word = word.to_lowercase();
        let word = word
            .strip_suffix("'s")
            .or_else(|| word.strip_suffix("\u{2019}s"))
            .unwrap_or(&word)
            .to_string();

        if let Some(lemma) = self.irregular.get(&word) {
            return lemma.clone();
        }
        if self.singular_s.contains(&word) || !word.chars().all(|c| c.is_alphabetic()) {
            return word;
        }

        let len = word.chars().count();
        if len > 4 && word.ends_with("ies") {
            return format!("{}y", &word[..word.len() - 3]);
        }
        if len > 4
            && (word.ends_with("sses")
                || word.ends_with("shes")
                || word.ends_with("ches")
                || word.ends_with("xes")
                || word.ends_with("zes"))
        {
            return word[..word.len() - 2].to_string();
        }
        if len > 3
            && word.ends_with('s')
            && !word.ends_with("ss")
            && !word.ends_with("us")
            && !word.ends_with("is")
        {
            return word[..word.len() - 1].to_string();
        }

        word
    }

    fn is_numeric(word: &str) -> bool {
        word.chars().any(|c| c.is_ascii_digit())
            && word
                .chars()
                .all(|c| c.is_ascii_digit() || c == ',' || c == '.')
    }

    fn punct_token(c: char) -> Token {
        Token {
            surface: c.to_string(),
            lemma: c.to_string(),
            is_stopword: false,
            is_punct: true,
            is_numeric: false,
        }
    }

    fn word_token(&self, word: &str) -> Token {
        let lower = word.to_lowercase();
        Token {
            surface: word.to_string(),
            lemma: self.lemma(&lower),
            is_stopword: self.stop_words.contains(&lower),
            is_punct: false,
            is_numeric: Self::is_numeric(&lower),
        }
    }
}

fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation() || (!c.is_alphanumeric() && !c.is_whitespace())
}

impl LinguisticNormalizer for RuleBasedNormalizer {
    fn tokenize_and_lemmatize(&self, text: &str) -> Result<Vec<Token>, NormalizerError> {
        let mut tokens = Vec::new();

        for chunk in text.split_whitespace() {
            // Peel punctuation off both ends; inner punctuation ("h&m", "t-shirt") stays
            let start = chunk
                .char_indices()
                .find(|(_, c)| !is_punctuation(*c))
                .map(|(i, _)| i);

            let Some(start) = start else {
                tokens.extend(chunk.chars().map(Self::punct_token));
                continue;
            };
            let end = chunk
                .char_indices()
                .rev()
                .find(|(_, c)| !is_punctuation(*c))
                .map(|(i, c)| i + c.len_utf8())
                .unwrap_or(chunk.len());

            tokens.extend(chunk[..start].chars().map(Self::punct_token));
            tokens.push(self.word_token(&chunk[start..end]));
            tokens.extend(chunk[end..].chars().map(Self::punct_token));
        }

        Ok(tokens)
    }
}

// ============================================================================
// Tests
// ============================================================================
