//! Price Range Extraction
//!
//! Ordered regex patterns over the whole lowercased query. The first pattern
//! that matches decides the range; later patterns are never consulted.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Extracted price bounds (inclusive, whole currency units).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<u64>,
    pub max: Option<u64>,
}

impl PriceRange {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Between,
    Max,
    Min,
}

static PRICE_PATTERNS: Lazy<Vec<(Regex, Bound)>> = Lazy::new(|| {
    [
        (r"between (\d+) and (\d+)", Bound::Between),
        (r"(?:under|below|less than)\s*\$?(\d+)", Bound::Max),
        (r"(?:above|over|greater than)\s*\$?(\d+)", Bound::Min),
        (r"(?:upto|up to)\s*\$?(\d+)", Bound::Max),
    ]
    .into_iter()
    .filter_map(|(pattern, bound)| Regex::new(pattern).ok().map(|re| (re, bound)))
    .collect()
});

fn number(caps: &Captures<'_>, group: usize) -> Option<u64> {
    caps.get(group)?.as_str().parse().ok()
}

/// Extract a price range from a query.
///
/// Malformed or out-of-range numbers yield an empty range, never an error.
/// A reversed `between` range is returned with its bounds swapped.
pub fn extract_price(query: &str) -> PriceRange {
    let query = query.to_lowercase();

    for (re, bound) in PRICE_PATTERNS.iter() {
        let Some(caps) = re.captures(&query) else {
            continue;
        };

        return match bound {
            Bound::Between => match (number(&caps, 1), number(&caps, 2)) {
                (Some(a), Some(b)) => PriceRange {
                    min: Some(a.min(b)),
                    max: Some(a.max(b)),
                },
                _ => PriceRange::default(),
            },
            Bound::Max => PriceRange {
                min: None,
                max: number(&caps, 1),
            },
            Bound::Min => PriceRange {
                min: number(&caps, 1),
                max: None,
            },
        };
    }

    PriceRange::default()
}
