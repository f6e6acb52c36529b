use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create the rule store tables if missing. Safe to run repeatedly.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    // One row per paragraph. Keywords are kept as JSON for reads and
    // exploded into rule_chunk_keywords for any-of matching.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rule_chunks (
            id TEXT PRIMARY KEY,
            session_id TEXT NOT NULL,
            filename TEXT NOT NULL,
            text TEXT NOT NULL,
            section TEXT,
            page INTEGER,
            keywords_json TEXT NOT NULL DEFAULT '[]',
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS rule_chunk_keywords (
            chunk_id TEXT NOT NULL,
            session_id TEXT NOT NULL,
            keyword TEXT NOT NULL,
            PRIMARY KEY (chunk_id, keyword),
            FOREIGN KEY (chunk_id) REFERENCES rule_chunks(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS uploaded_files (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id TEXT NOT NULL,
            name TEXT NOT NULL,
            created_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_rule_chunks_session ON rule_chunks(session_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_rule_chunk_keywords_lookup ON rule_chunk_keywords(session_id, keyword)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_uploaded_files_session ON uploaded_files(session_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
