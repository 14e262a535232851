//! Fuzzy String Scoring
//!
//! Similarity scorers on a 0–100 scale and best-candidate extraction over a
//! candidate pool.
//!
//! All scorers are built on the Indel similarity from `rapidfuzz`:
//! `ratio(a, b) = 100 * 2 * LCS(a, b) / (|a| + |b|)`, measured in chars.
//! The window and token-set logic on top stays local so `partial_ratio` only
//! scores full-length windows.

use std::collections::BTreeSet;

use rapidfuzz::distance::indel;
use serde::{Deserialize, Serialize};

/// Scoring method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scorer {
    /// Whole-string similarity
    Ratio,
    /// Best alignment of the shorter string inside the longer one
    PartialRatio,
    /// Ratio after sorting whitespace-separated tokens
    TokenSortRatio,
    /// Ratio over token intersection and differences
    TokenSetRatio,
}

impl Scorer {
    pub fn score(&self, a: &str, b: &str) -> f64 {
        match self {
            Scorer::Ratio => ratio(a, b),
            Scorer::PartialRatio => partial_ratio(a, b),
            Scorer::TokenSortRatio => token_sort_ratio(a, b),
            Scorer::TokenSetRatio => token_set_ratio(a, b),
        }
    }
}

/// Indel similarity of two char sequences, scaled to 0–100.
///
/// `indel::similarity` is `|a| + |b| - indel_distance`, i.e. `2 * LCS(a, b)`.
fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    let common = indel::similarity(a.iter().copied(), b.iter().copied());
    100.0 * common as f64 / total as f64
}

/// Normalized Indel similarity. Two empty strings score 100.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Best ratio of the shorter string against every equal-length window of
/// the longer string.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let mut best = 0.0f64;
    for window in long.windows(short.len()) {
        let score = ratio_chars(&short, window);
        if score > best {
            best = score;
            if best >= 100.0 {
                break;
            }
        }
    }
    best
}

fn sorted_tokens(s: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens
}

/// Ratio after sorting tokens alphabetically.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a).join(" "), &sorted_tokens(b).join(" "))
}

/// Ratio over the token intersection and the two differences. Scores 100
/// whenever one token set contains the other; 0 if either side has no tokens.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let join = |set: Vec<&str>| set.join(" ");
    let sect = join(tokens_a.intersection(&tokens_b).copied().collect());
    let diff_ab = join(tokens_a.difference(&tokens_b).copied().collect());
    let diff_ba = join(tokens_b.difference(&tokens_a).copied().collect());

    let combined_ab = format!("{sect} {diff_ab}").trim().to_string();
    let combined_ba = format!("{sect} {diff_ba}").trim().to_string();

    ratio(&sect, &combined_ab)
        .max(ratio(&sect, &combined_ba))
        .max(ratio(&combined_ab, &combined_ba))
}

/// Best-scoring choice for `query`. Ties keep the earliest choice; an empty
/// pool yields `None`.
pub fn extract_one<'a, I>(query: &str, choices: I, scorer: Scorer) -> Option<(&'a str, f64)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&'a str, f64)> = None;
    for choice in choices {
        let score = scorer.score(query, choice);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((choice, score)),
        }
    }
    best
}
