//! Property-based tests for result merging
//!
//! Tests invariants:
//! - The merged list contains no duplicate documents
//! - Every document from any batch appears in the merged list
//! - First appearances keep their relative order

use proptest::prelude::*;
use serde_json::{json, Value};

use crate::core::search::merge_results;

fn batches() -> impl Strategy<Value = Vec<Vec<Value>>> {
    prop::collection::vec(
        prop::collection::vec((0u8..6, 0u32..3).prop_map(|(id, price)| json!({"id": id, "price": price})), 0..6),
        0..5,
    )
}

proptest! {
    #[test]
    fn merged_has_no_duplicates(batches in batches()) {
        let merged = merge_results(batches);
        for (i, doc) in merged.iter().enumerate() {
            prop_assert!(!merged[..i].contains(doc));
        }
    }

    #[test]
    fn merged_keeps_every_document(batches in batches()) {
        let all: Vec<Value> = batches.iter().flatten().cloned().collect();
        let merged = merge_results(batches);
        for doc in &all {
            prop_assert!(merged.contains(doc));
        }
        prop_assert!(merged.len() <= all.len());
    }

    #[test]
    fn merged_follows_first_appearance(batches in batches()) {
        let mut expected: Vec<Value> = Vec::new();
        for doc in batches.iter().flatten() {
            if !expected.contains(doc) {
                expected.push(doc.clone());
            }
        }
        prop_assert_eq!(merge_results(batches), expected);
    }
}
