//! Ingest → retrieve behaviour checked against every store backend,
//! plus a recording store that pins down what the retriever asks for.

use anyhow::Result;
use async_trait::async_trait;
use rulebook_harness::config::{Config, IngestConfig};
use rulebook_harness::extract::MIME_TEXT;
use rulebook_harness::ingest::process_rulebook;
use rulebook_harness::models::{RuleChunk, RulebookUpload};
use rulebook_harness::retrieve::{
    find_session_rules, MAX_QUERY_KEYWORDS, NO_KEYWORDS, NO_RULES_FOUND, RULES_HEADER,
};
use rulebook_harness::store::memory::InMemoryStore;
use rulebook_harness::store::sqlite::SqliteStore;
use rulebook_harness::store::RuleStore;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const CORE_RULES: &str = "\
Core Rules

Grappling: the attacker makes an Athletics check contested by the target.

Cover grants a bonus to armor class against ranged attacks.

Exhaustion accumulates in levels and imposes cumulative penalties.
";

fn upload(name: &str, text: &str) -> RulebookUpload {
    RulebookUpload::new(name, MIME_TEXT, text.as_bytes().to_vec())
}

/// Runs `check` against a fresh in-memory store and a fresh SQLite store.
async fn for_each_backend<F, Fut>(check: F)
where
    F: Fn(Arc<dyn RuleStore>) -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    check(Arc::new(InMemoryStore::new())).await;

    let tmp = TempDir::new().unwrap();
    let config = Config::minimal(tmp.path().join("rules.sqlite"));
    let sqlite = SqliteStore::open(&config).await.unwrap();
    check(Arc::new(sqlite)).await;
}

#[tokio::test]
async fn ingest_then_lookup_round_trip() {
    for_each_backend(|store| async move {
        process_rulebook(store.as_ref(), &upload("core.txt", CORE_RULES), "s1", &IngestConfig::default())
            .await
            .unwrap();

        let out = find_session_rules(store.as_ref(), "exhaustion", "s1").await;
        assert!(out.starts_with(RULES_HEADER));
        assert!(out.contains("Exhaustion accumulates in levels and imposes cumulative penalties."));
        assert!(!out.contains("Cover grants"));

        assert_eq!(store.list_filenames("s1").await.unwrap(), vec!["core.txt"]);
    })
    .await;
}

#[tokio::test]
async fn every_verbatim_keyword_finds_its_paragraph() {
    for_each_backend(|store| async move {
        process_rulebook(store.as_ref(), &upload("core.txt", CORE_RULES), "s1", &IngestConfig::default())
            .await
            .unwrap();

        for (word, paragraph) in [
            ("Grappling", "Grappling: the attacker"),
            ("armor", "Cover grants a bonus"),
            ("cumulative", "Exhaustion accumulates"),
        ] {
            let out = find_session_rules(store.as_ref(), word, "s1").await;
            assert!(out.contains(paragraph), "{word}: {out}");
        }
    })
    .await;
}

#[tokio::test]
async fn rules_never_leak_across_sessions() {
    for_each_backend(|store| async move {
        process_rulebook(store.as_ref(), &upload("core.txt", CORE_RULES), "session-a", &IngestConfig::default())
            .await
            .unwrap();

        assert_eq!(
            find_session_rules(store.as_ref(), "grappling athletics cover", "session-b").await,
            NO_RULES_FOUND
        );
        assert!(store.list_filenames("session-b").await.unwrap().is_empty());
    })
    .await;
}

#[tokio::test]
async fn concurrent_uploads_into_one_session() {
    for_each_backend(|store| async move {
        let mut handles = Vec::new();
        for i in 0..4 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let text = format!("Homebrew rule {i}: sanity checks use Wisdom saves.");
                process_rulebook(
                    store.as_ref(),
                    &upload(&format!("homebrew-{i}.txt"), &text),
                    "s1",
                    &IngestConfig::default(),
                )
                .await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let mut names = store.list_filenames("s1").await.unwrap();
        names.sort();
        assert_eq!(
            names,
            vec!["homebrew-0.txt", "homebrew-1.txt", "homebrew-2.txt", "homebrew-3.txt"]
        );
        let out = find_session_rules(store.as_ref(), "sanity", "s1").await;
        assert_eq!(out.matches("Homebrew rule").count(), 3);
    })
    .await;
}

// ─── Recording store ────────────────────────────────────────────────

#[derive(Default)]
struct RecordingStore {
    queries: Mutex<Vec<(String, Vec<String>, usize)>>,
}

#[async_trait]
impl RuleStore for RecordingStore {
    async fn append(&self, _: &str, _: &RuleChunk) -> Result<()> {
        Ok(())
    }

    async fn append_filename(&self, _: &str, _: &str) -> Result<()> {
        Ok(())
    }

    async fn query_by_keywords(
        &self,
        session_id: &str,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<RuleChunk>> {
        self.queries
            .lock()
            .unwrap()
            .push((session_id.to_string(), keywords.to_vec(), limit));
        Ok(Vec::new())
    }

    async fn list_filenames(&self, _: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn stop_word_query_never_reaches_the_store() {
    let store = RecordingStore::default();
    assert_eq!(find_session_rules(&store, "the of and", "s1").await, NO_KEYWORDS);
    assert!(store.queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn only_the_first_ten_keywords_are_sent() {
    let store = RecordingStore::default();
    let query = "alpha bravo charlie delta echo foxtrot golf hotel india juliet kilo lima mike";
    find_session_rules(&store, query, "s1").await;

    let queries = store.queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    let (session, keywords, limit) = &queries[0];
    assert_eq!(session, "s1");
    assert_eq!(keywords.len(), MAX_QUERY_KEYWORDS);
    assert_eq!(
        keywords,
        &vec![
            "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india",
            "juliet"
        ]
    );
    assert_eq!(*limit, 3);
}

#[tokio::test]
async fn duplicates_do_not_use_up_the_keyword_cap() {
    let store = RecordingStore::default();
    find_session_rules(&store, "grapple GRAPPLE grapple! shove", "s1").await;
    let queries = store.queries.lock().unwrap();
    assert_eq!(queries[0].1, vec!["grapple", "shove"]);
}
