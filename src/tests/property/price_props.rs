//! Property-based tests for price extraction
//!
//! Tests invariants:
//! - Every "max" phrasing yields exactly an upper bound
//! - Every "min" phrasing yields exactly a lower bound
//! - `between` is order-insensitive and yields min <= max
//! - Queries without digits yield no range

use proptest::prelude::*;

use crate::core::query::{extract_price, PriceRange};

fn max_phrase() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["under", "below", "less than", "up to", "upto"])
}

fn min_phrase() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["above", "over", "greater than"])
}

proptest! {
    #[test]
    fn max_phrase_yields_upper_bound(
        phrase in max_phrase(),
        amount in 0u64..10_000_000,
        dollar in any::<bool>(),
    ) {
        let sign = if dollar { "$" } else { "" };
        let query = format!("red shoes {} {}{}", phrase, sign, amount);
        prop_assert_eq!(extract_price(&query), PriceRange { min: None, max: Some(amount) });
    }

    #[test]
    fn min_phrase_yields_lower_bound(phrase in min_phrase(), amount in 0u64..10_000_000) {
        let query = format!("{} {} nike", phrase, amount);
        prop_assert_eq!(extract_price(&query), PriceRange { min: Some(amount), max: None });
    }

    #[test]
    fn between_is_ordered(a in 0u64..1_000_000, b in 0u64..1_000_000) {
        let range = extract_price(&format!("phones between {} and {}", a, b));
        prop_assert_eq!(range.min, Some(a.min(b)));
        prop_assert_eq!(range.max, Some(a.max(b)));
    }

    #[test]
    fn no_digits_no_range(query in "[a-z $]{0,40}") {
        prop_assert!(extract_price(&query).is_empty());
    }
}
