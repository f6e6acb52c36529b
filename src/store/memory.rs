//! In-memory [`RuleStore`] implementation for tests and embedding.
//!
//! Uses a `HashMap` of per-session vectors behind `std::sync::RwLock`.
//! Keyword matching is a linear scan in insertion order.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;

use crate::models::{RuleChunk, UploadedFile};

use super::RuleStore;

#[derive(Default)]
struct SessionRules {
    chunks: Vec<RuleChunk>,
    files: Vec<UploadedFile>,
}

/// In-memory store. Contents are lost when it is dropped.
pub struct InMemoryStore {
    sessions: RwLock<HashMap<String, SessionRules>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of chunks stored for a session.
    pub fn chunk_count(&self, session_id: &str) -> usize {
        self.sessions
            .read()
            .map(|s| s.get(session_id).map_or(0, |r| r.chunks.len()))
            .unwrap_or(0)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> anyhow::Error {
    anyhow!("in-memory rule store lock poisoned")
}

#[async_trait]
impl RuleStore for InMemoryStore {
    async fn append(&self, session_id: &str, chunk: &RuleChunk) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let mut stored = chunk.clone();
        stored.session_id = session_id.to_string();
        sessions
            .entry(session_id.to_string())
            .or_default()
            .chunks
            .push(stored);
        Ok(())
    }

    async fn append_filename(&self, session_id: &str, filename: &str) -> Result<()> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .files
            .push(UploadedFile {
                session_id: session_id.to_string(),
                name: filename.to_string(),
                timestamp: Utc::now(),
            });
        Ok(())
    }

    async fn query_by_keywords(
        &self,
        session_id: &str,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<RuleChunk>> {
        if keywords.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let wanted: HashSet<&str> = keywords.iter().map(String::as_str).collect();
        let sessions = self.sessions.read().map_err(poisoned)?;
        let Some(rules) = sessions.get(session_id) else {
            return Ok(Vec::new());
        };
        Ok(rules
            .chunks
            .iter()
            .filter(|c| c.keywords.iter().any(|k| wanted.contains(k.as_str())))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn list_filenames(&self, session_id: &str) -> Result<Vec<String>> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        let Some(rules) = sessions.get(session_id) else {
            return Ok(Vec::new());
        };
        let mut seen = HashSet::new();
        Ok(rules
            .files
            .iter()
            .filter(|f| seen.insert(f.name.as_str()))
            .map(|f| f.name.clone())
            .collect())
    }
}
