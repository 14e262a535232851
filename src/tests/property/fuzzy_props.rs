//! Property-based tests for fuzzy scorers
//!
//! Tests invariants:
//! - Every scorer returns a score in 0..=100
//! - A non-empty string scores 100 against itself
//! - `ratio` is symmetric

use proptest::prelude::*;

use crate::core::query::fuzzy::{ratio, Scorer};

fn scorer() -> impl Strategy<Value = Scorer> {
    prop::sample::select(vec![
        Scorer::Ratio,
        Scorer::PartialRatio,
        Scorer::TokenSortRatio,
        Scorer::TokenSetRatio,
    ])
}

proptest! {
    #[test]
    fn score_is_bounded(scorer in scorer(), a in "[a-z &]{0,20}", b in "[a-z &]{0,20}") {
        let score = scorer.score(&a, &b);
        prop_assert!((0.0..=100.0).contains(&score), "score {} out of range", score);
    }

    #[test]
    fn identical_strings_score_full(scorer in scorer(), a in "[a-z]{1,12}( [a-z]{1,12}){0,2}") {
        prop_assert_eq!(scorer.score(&a, &a), 100.0);
    }

    #[test]
    fn ratio_is_symmetric(a in "[a-z ]{0,16}", b in "[a-z ]{0,16}") {
        prop_assert_eq!(ratio(&a, &b), ratio(&b, &a));
    }
}
