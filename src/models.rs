//! Core data models used throughout Rulebook Harness.
//!
//! These types represent the uploaded files, stored rule chunks, and
//! filename records that flow through ingestion and retrieval.

use chrono::{DateTime, Utc};

/// An uploaded rulebook file before text extraction.
#[derive(Debug, Clone)]
pub struct RulebookUpload {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl RulebookUpload {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// A paragraph of rulebook text with its derived keyword set.
///
/// Chunks are immutable once appended to a store. `section` and `page`
/// are never populated since no structural document parsing is done.
#[derive(Debug, Clone)]
pub struct RuleChunk {
    pub id: String,
    pub session_id: String,
    pub text: String,
    pub section: Option<String>,
    pub page: Option<i64>,
    pub filename: String,
    pub keywords: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Record that a file was uploaded to a session.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub session_id: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
}
