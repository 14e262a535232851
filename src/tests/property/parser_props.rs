//! Property-based tests for query parsing
//!
//! Tests invariants:
//! - Parsing the same query twice gives the same result
//! - Category, brand, color and gender are always vocabulary terms
//! - Keywords are never stopwords or numbers

use std::sync::Arc;

use proptest::prelude::*;

use crate::core::query::{
    ClassifierConfig, QueryParser, RuleBasedNormalizer, SeedData, VocabField,
};

fn parser() -> QueryParser {
    let seed = SeedData::builtin();
    QueryParser::from_seed(
        &seed,
        ClassifierConfig::default(),
        Arc::new(RuleBasedNormalizer::new()),
        Arc::new(seed.registry()),
    )
    .unwrap()
}

fn query_word() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec![
            "red", "blue", "gray", "sneakers", "phones", "nike", "addidas", "women", "for",
            "the", "comfortable", "under", "1500", "between", "and", "leather", "men's",
        ])
        .prop_map(str::to_string),
        "[a-z]{1,10}",
    ]
}

fn query() -> impl Strategy<Value = String> {
    prop::collection::vec(query_word(), 1..8).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn parse_is_deterministic(query in query()) {
        let parser = parser();
        let first = parser.parse(&query).unwrap();
        let second = parser.parse(&query).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn fields_come_from_vocabulary(query in query()) {
        let parser = parser();
        let parsed = parser.parse(&query).unwrap();
        let vocabulary = parser.vocabulary();

        let fields = [
            (VocabField::Category, &parsed.category),
            (VocabField::Brand, &parsed.brand),
            (VocabField::Color, &parsed.color),
            (VocabField::Gender, &parsed.gender),
        ];
        for (field, value) in fields {
            if let Some(value) = value {
                prop_assert!(vocabulary.contains(field, value), "{} '{}' not in vocabulary", field, value);
            }
        }
    }

    #[test]
    fn keywords_skip_stopwords_and_numbers(query in query()) {
        let parsed = parser().parse(&query).unwrap();
        let normalizer = RuleBasedNormalizer::new();
        for keyword in &parsed.keywords {
            prop_assert!(!normalizer.is_stop_word(keyword), "stopword '{}' kept", keyword);
            prop_assert!(!keyword.chars().any(|c| c.is_ascii_digit()), "number '{}' kept", keyword);
        }
    }
}
