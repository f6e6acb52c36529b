//! SQLite-backed [`RuleStore`] implementation.
//!
//! Chunks live in `rule_chunks`; every keyword of a chunk is also written
//! to `rule_chunk_keywords` so an any-of match is a single indexed
//! `IN (...)` lookup. Matches come back in insertion (`rowid`) order.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::config::Config;
use crate::db;
use crate::migrate;
use crate::models::RuleChunk;

use super::RuleStore;

/// SQLite implementation of the [`RuleStore`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to the configured database and make sure the schema exists.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::apply_schema(&pool).await?;
        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_chunk(row: &SqliteRow) -> Result<RuleChunk> {
    let keywords_json: String = row.get("keywords_json");
    let keywords: Vec<String> =
        serde_json::from_str(&keywords_json).context("corrupt keywords_json in rule_chunks")?;
    let created_at: i64 = row.get("created_at");

    Ok(RuleChunk {
        id: row.get("id"),
        session_id: row.get("session_id"),
        text: row.get("text"),
        section: row.get("section"),
        page: row.get("page"),
        filename: row.get("filename"),
        keywords,
        timestamp: DateTime::<Utc>::from_timestamp_millis(created_at).unwrap_or_default(),
    })
}

#[async_trait]
impl RuleStore for SqliteStore {
    async fn append(&self, session_id: &str, chunk: &RuleChunk) -> Result<()> {
        let keywords_json = serde_json::to_string(&chunk.keywords)?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO rule_chunks (id, session_id, filename, text, section, page,
                                     keywords_json, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&chunk.id)
        .bind(session_id)
        .bind(&chunk.filename)
        .bind(&chunk.text)
        .bind(&chunk.section)
        .bind(chunk.page)
        .bind(&keywords_json)
        .bind(chunk.timestamp.timestamp_millis())
        .execute(&mut *tx)
        .await?;

        for keyword in &chunk.keywords {
            sqlx::query(
                "INSERT OR IGNORE INTO rule_chunk_keywords (chunk_id, session_id, keyword) VALUES (?, ?, ?)",
            )
            .bind(&chunk.id)
            .bind(session_id)
            .bind(keyword)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn append_filename(&self, session_id: &str, filename: &str) -> Result<()> {
        sqlx::query("INSERT INTO uploaded_files (session_id, name, created_at) VALUES (?, ?, ?)")
            .bind(session_id)
            .bind(filename)
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await?;
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

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT c.id, c.session_id, c.filename, c.text, c.section, c.page, \
             c.keywords_json, c.created_at \
             FROM rule_chunks c WHERE c.session_id = ",
        );
        qb.push_bind(session_id);
        qb.push(
            " AND c.id IN (SELECT k.chunk_id FROM rule_chunk_keywords k WHERE k.session_id = ",
        );
        qb.push_bind(session_id);
        qb.push(" AND k.keyword IN (");
        let mut values = qb.separated(", ");
        for keyword in keywords {
            values.push_bind(keyword.as_str());
        }
        values.push_unseparated(")) ORDER BY c.rowid LIMIT ");
        qb.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_chunk).collect()
    }

    async fn list_filenames(&self, session_id: &str) -> Result<Vec<String>> {
        let names: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM uploaded_files WHERE session_id = ? GROUP BY name ORDER BY MIN(id)",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }
}
