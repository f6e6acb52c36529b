//! Plain-text extraction for uploaded rulebooks.
//!
//! Only `text/plain` and `application/pdf` uploads are accepted. Plain
//! text is decoded as UTF-8 with invalid sequences replaced and a leading
//! byte-order mark dropped.
//!
//! PDF handling depends on [`PdfTextMode`]. In the default `Raw` mode the
//! PDF bytes are decoded exactly like plain text, without parsing the PDF
//! structure, so most real PDFs yield garbled or empty chunks. `Extract`
//! mode runs `pdf-extract` over the bytes instead.

use serde::Deserialize;
use thiserror::Error;

pub const MIME_TEXT: &str = "text/plain";
pub const MIME_PDF: &str = "application/pdf";
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

/// How PDF uploads are turned into text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfTextMode {
    /// Decode the file bytes as UTF-8 text.
    #[default]
    Raw,
    /// Parse the PDF and extract its text layer.
    Extract,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedContentType(String),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
}

/// Strip MIME parameters (`text/plain; charset=utf-8` -> `text/plain`) and lowercase.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether an upload of this content type may be ingested.
pub fn is_supported_content_type(content_type: &str) -> bool {
    matches!(essence(content_type).as_str(), MIME_TEXT | MIME_PDF)
}

/// Guess an upload's content type from its file extension.
pub fn content_type_for_name(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "txt" => MIME_TEXT,
        "pdf" => MIME_PDF,
        _ => MIME_OCTET_STREAM,
    }
}

/// Extract plain text from an upload's bytes.
pub fn extract_text(
    bytes: &[u8],
    content_type: &str,
    pdf_mode: PdfTextMode,
) -> Result<String, ExtractError> {
    match essence(content_type).as_str() {
        MIME_TEXT => Ok(decode_utf8(bytes)),
        MIME_PDF => match pdf_mode {
            PdfTextMode::Raw => {
                tracing::warn!(
                    "PDF structure is not parsed in raw mode; decoding {} bytes as text",
                    bytes.len()
                );
                Ok(decode_utf8(bytes))
            }
            PdfTextMode::Extract => extract_pdf(bytes),
        },
        other => Err(ExtractError::UnsupportedContentType(other.to_string())),
    }
}

const BYTE_ORDER_MARK: char = '\u{FEFF}';

fn decode_utf8(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.strip_prefix(BYTE_ORDER_MARK) {
        Some(rest) => rest.to_string(),
        None => text.into_owned(),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}
