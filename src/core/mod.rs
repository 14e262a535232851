pub mod logging;

// Query understanding: normalization, synonyms, price, vocabulary, classification
pub mod query;

// Candidate expansion over the search backend + service facade
pub mod search;
