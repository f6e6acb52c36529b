//! Rule lookup for the narration flow.
//!
//! [`find_session_rules`] answers "which uploaded rules apply to this
//! query" as one string ready to paste into a prompt. It never fails:
//! missing keywords, missing matches, and store errors all come back as
//! fixed sentinel messages, so the game master can carry on with general
//! knowledge.

use anyhow::Result;

use crate::config::Config;
use crate::keywords::extract_keywords;
use crate::store::sqlite::SqliteStore;
use crate::store::RuleStore;

/// Most keywords sent to the store for one any-of match.
pub const MAX_QUERY_KEYWORDS: usize = 10;

/// Chunks returned per lookup unless configured otherwise.
pub const DEFAULT_MAX_RESULTS: usize = 3;

pub const NO_KEYWORDS: &str = "No relevant keywords found in query.";
pub const NO_RULES_FOUND: &str = "No specific rules found for this action. Use general knowledge.";
pub const LOOKUP_FAILED: &str =
    "An error occurred while fetching session-specific rules. Please rely on general knowledge.";
pub const RULES_HEADER: &str = "Relevant Rules Found:";
pub const RULE_SEPARATOR: &str = "\n\n---\n\n";

/// Look up a session's rules for a player query with the default result count.
pub async fn find_session_rules(store: &dyn RuleStore, query: &str, session_id: &str) -> String {
    find_session_rules_with_limit(store, query, session_id, DEFAULT_MAX_RESULTS).await
}

/// Look up a session's rules, returning at most `max_results` chunks.
pub async fn find_session_rules_with_limit(
    store: &dyn RuleStore,
    query: &str,
    session_id: &str,
    max_results: usize,
) -> String {
    let mut keywords = extract_keywords(query);
    if keywords.is_empty() {
        return NO_KEYWORDS.to_string();
    }
    keywords.truncate(MAX_QUERY_KEYWORDS);
    tracing::debug!(session = %session_id, ?keywords, "rule lookup");

    match store
        .query_by_keywords(session_id, &keywords, max_results)
        .await
    {
        Ok(chunks) if chunks.is_empty() => NO_RULES_FOUND.to_string(),
        Ok(chunks) => {
            let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
            format!("{}\n{}", RULES_HEADER, texts.join(RULE_SEPARATOR))
        }
        Err(e) => {
            tracing::error!(session = %session_id, "Error finding session rules: {:#}", e);
            LOOKUP_FAILED.to_string()
        }
    }
}

/// Unique filenames uploaded to a session, for display.
///
/// A store failure is logged and shown as an empty list.
pub async fn list_uploaded_rulebooks(store: &dyn RuleStore, session_id: &str) -> Vec<String> {
    match store.list_filenames(session_id).await {
        Ok(names) => names,
        Err(e) => {
            tracing::error!(session = %session_id, "Error fetching uploaded rulebooks: {:#}", e);
            Vec::new()
        }
    }
}

/// CLI entry point for `rulebook lookup`.
pub async fn run_lookup(config: &Config, session_id: &str, query: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let answer =
        find_session_rules_with_limit(&store, query, session_id, config.retrieval.max_results)
            .await;
    store.close().await;
    println!("{}", answer);
    Ok(())
}

/// CLI entry point for `rulebook rulebooks`.
pub async fn run_list_rulebooks(config: &Config, session_id: &str) -> Result<()> {
    let store = SqliteStore::open(config).await?;
    let names = list_uploaded_rulebooks(&store, session_id).await;
    store.close().await;

    if names.is_empty() {
        println!("No rulebooks were uploaded for this session.");
        return Ok(());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}
