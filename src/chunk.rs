//! Paragraph-boundary rulebook chunker.
//!
//! Splits extracted rulebook text into [`RuleChunk`]s, one per paragraph.
//! Paragraphs are separated by one or more blank lines (a blank line may
//! contain whitespace). Fragments of ten characters or fewer after
//! trimming are headings or noise and are discarded.
//!
//! Each chunk receives a random UUID and the keyword set of its text.

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::keywords::extract_keywords;
use crate::models::RuleChunk;

/// Paragraphs at or under this trimmed length are dropped.
pub const MIN_PARAGRAPH_CHARS: usize = 10;

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Split text into trimmed paragraphs longer than [`MIN_PARAGRAPH_CHARS`].
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
        .collect()
}

/// Chunk a rulebook's text into keyword-tagged records for one session.
pub fn chunk_rulebook(session_id: &str, filename: &str, text: &str) -> Vec<RuleChunk> {
    split_paragraphs(text)
        .into_iter()
        .map(|para| make_chunk(session_id, filename, para))
        .collect()
}

fn make_chunk(session_id: &str, filename: &str, text: &str) -> RuleChunk {
    RuleChunk {
        id: Uuid::new_v4().to_string(),
        session_id: session_id.to_string(),
        text: text.to_string(),
        section: None,
        page: None,
        filename: filename.to_string(),
        keywords: extract_keywords(text),
        timestamp: Utc::now(),
    }
}
