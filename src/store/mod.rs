//! Storage abstraction for session rulebooks.
//!
//! The [`RuleStore`] trait is the only shared mutable resource in the
//! system. Ingestion appends to it and retrieval reads from it; nothing
//! updates or deletes. Two backends ship with the crate:
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`memory::InMemoryStore`] | tests and embedding in other processes |
//! | [`sqlite::SqliteStore`] | durable storage behind the CLI and server |
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::RuleChunk;

/// Session-scoped, append-only persistence for rule chunks and filenames.
///
/// Every operation is scoped to one `session_id`; no call ever reads or
/// writes another session's records. A completed write is visible to
/// reads issued after it.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`append`](RuleStore::append) | Store one immutable chunk |
/// | [`append_filename`](RuleStore::append_filename) | Record an uploaded file |
/// | [`query_by_keywords`](RuleStore::query_by_keywords) | Chunks sharing any keyword |
/// | [`list_filenames`](RuleStore::list_filenames) | Unique uploaded filenames |
#[async_trait]
pub trait RuleStore: Send + Sync {
    /// Add one chunk to the session.
    async fn append(&self, session_id: &str, chunk: &RuleChunk) -> Result<()>;

    /// Record that `filename` was uploaded to the session. Duplicates are kept.
    async fn append_filename(&self, session_id: &str, filename: &str) -> Result<()>;

    /// Return up to `limit` chunks whose keyword set intersects `keywords`.
    ///
    /// Order among matches is backend-defined; no relevance ranking is
    /// applied. Callers are expected to have capped `keywords` already.
    async fn query_by_keywords(
        &self,
        session_id: &str,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<RuleChunk>>;

    /// Return the session's uploaded filenames without duplicates,
    /// ordered by first upload.
    async fn list_filenames(&self, session_id: &str) -> Result<Vec<String>>;
}
