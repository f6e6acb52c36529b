//! Rulebook ingestion.
//!
//! Turns one uploaded file into stored [`RuleChunk`](crate::models::RuleChunk)s
//! plus one filename record: extract text → split paragraphs → tag keywords
//! → append to the session's [`RuleStore`]. Batch uploads run one ingestion
//! per file and report each file's outcome independently.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use walkdir::WalkDir;

use crate::chunk::chunk_rulebook;
use crate::config::{Config, IngestConfig};
use crate::extract::{content_type_for_name, extract_text, is_supported_content_type};
use crate::models::RulebookUpload;
use crate::store::sqlite::SqliteStore;
use crate::store::RuleStore;

/// Error message attached to every failed ingestion.
pub const PROCESSING_FAILED: &str = "rulebook processing failed";

/// Ingest one rulebook into a session.
///
/// Chunks are appended one by one, then the filename is recorded. A failure
/// at any step fails the whole call with [`PROCESSING_FAILED`]; chunks
/// already written stay in the store and the count is logged.
pub async fn process_rulebook(
    store: &dyn RuleStore,
    upload: &RulebookUpload,
    session_id: &str,
    config: &IngestConfig,
) -> Result<()> {
    if session_id.trim().is_empty() {
        bail!("session id must not be empty");
    }
    tracing::info!("Processing rulebook {} for session {}", upload.name, session_id);

    let mut written = 0usize;
    match store_rulebook(store, upload, session_id, config, &mut written).await {
        Ok(()) => {
            tracing::info!(
                "Stored {} chunks for {} in session {}",
                written,
                upload.name,
                session_id
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                file = %upload.name,
                session = %session_id,
                chunks_written = written,
                "Error processing rulebook: {:#}",
                e
            );
            Err(e.context(PROCESSING_FAILED))
        }
    }
}

async fn store_rulebook(
    store: &dyn RuleStore,
    upload: &RulebookUpload,
    session_id: &str,
    config: &IngestConfig,
    written: &mut usize,
) -> Result<()> {
    let text = extract_text(&upload.bytes, &upload.content_type, config.pdf_text)?;
    let chunks = chunk_rulebook(session_id, &upload.name, &text);

    for chunk in &chunks {
        store.append(session_id, chunk).await?;
        *written += 1;
    }
    store.append_filename(session_id, &upload.name).await?;
    Ok(())
}

/// What happened to one file of a batch upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Stored and available to lookups.
    Added,
    /// Not a PDF or plain-text file; nothing was written.
    Unsupported,
    /// Processing failed; the message carries the cause chain.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct UploadReport {
    pub name: String,
    pub outcome: UploadOutcome,
}

/// Ingest several files into one session, one at a time.
///
/// Unsupported content types are rejected without touching the store.
/// A failed file never prevents the remaining files from being processed.
pub async fn ingest_uploads(
    store: &dyn RuleStore,
    uploads: &[RulebookUpload],
    session_id: &str,
    config: &IngestConfig,
) -> Vec<UploadReport> {
    let mut reports = Vec::with_capacity(uploads.len());
    for upload in uploads {
        let outcome = if !is_supported_content_type(&upload.content_type) {
            tracing::warn!(
                "Rejected {}: unsupported file type {}",
                upload.name,
                upload.content_type
            );
            UploadOutcome::Unsupported
        } else {
            match process_rulebook(store, upload, session_id, config).await {
                Ok(()) => UploadOutcome::Added,
                Err(e) => UploadOutcome::Failed(format!("{:#}", e)),
            }
        };
        reports.push(UploadReport {
            name: upload.name.clone(),
            outcome,
        });
    }
    reports
}

/// Read uploads from local paths.
///
/// Files are taken as given. Directories are walked for `.txt` and `.pdf`
/// files in file-name order. Content types come from the file extension.
pub fn collect_uploads(paths: &[PathBuf]) -> Result<Vec<RulebookUpload>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry =
                    entry.with_context(|| format!("Failed to walk {}", path.display()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy();
                if is_supported_content_type(content_type_for_name(&name)) {
                    files.push(entry.into_path());
                }
            }
        } else {
            files.push(path.clone());
        }
    }

    files
        .into_iter()
        .map(|path| {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let content_type = content_type_for_name(&name);
            Ok(RulebookUpload::new(name, content_type, bytes))
        })
        .collect()
}

/// CLI entry point for `rulebook upload`.
pub async fn run_upload(config: &Config, session_id: &str, paths: &[PathBuf]) -> Result<()> {
    let uploads = collect_uploads(paths)?;
    if uploads.is_empty() {
        println!("No rulebooks found.");
        return Ok(());
    }

    let store = SqliteStore::open(config).await?;
    let reports = ingest_uploads(&store, &uploads, session_id, &config.ingest).await;
    store.close().await;

    let mut problems = 0usize;
    println!("upload {}", session_id);
    for report in &reports {
        match &report.outcome {
            UploadOutcome::Added => {
                println!("  added: {} is now available to the game master", report.name)
            }
            UploadOutcome::Unsupported => {
                problems += 1;
                println!(
                    "  rejected: {} is not a supported file type (PDF or TXT)",
                    report.name
                );
            }
            UploadOutcome::Failed(msg) => {
                problems += 1;
                println!("  failed: could not process {}: {}", report.name, msg);
            }
        }
    }

    if problems > 0 {
        bail!("{} of {} rulebooks could not be added", problems, reports.len());
    }
    println!("ok");
    Ok(())
}
