//! Keyword extraction shared by ingestion and retrieval.
//!
//! A keyword is a lowercase token of ASCII word characters, longer than
//! three characters, that is not a stop word. The same function runs over
//! chunk text at ingestion time and over the player's query at lookup
//! time, so matching reduces to set intersection.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Words dropped before matching even if they were long enough.
pub const STOP_WORDS: [&str; 12] = [
    "the", "a", "an", "is", "are", "to", "of", "in", "it", "and", "or", "but",
];

/// Minimum keyword length is this value plus one.
const MIN_KEYWORD_LEN: usize = 3;

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s]").unwrap());

/// Extract the unique keywords of `text`, in first-seen order.
pub fn extract_keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");

    let mut seen = HashSet::new();
    stripped
        .split_whitespace()
        .filter(|word| word.len() > MIN_KEYWORD_LEN && !STOP_WORDS.contains(word))
        .filter(|word| seen.insert(*word))
        .map(str::to_string)
        .collect()
}
