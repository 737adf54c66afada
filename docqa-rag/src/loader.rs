//! Document loading from uploaded bytes.
//!
//! Two kinds are accepted: UTF-8 plain text and PDF. PDF text is extracted
//! page by page with `lopdf`; pages that cannot be read (scanned images,
//! broken content streams) are skipped instead of failing the whole load.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{RagError, Result};

/// Separator placed between the texts of consecutive PDF pages.
pub const PAGE_SEPARATOR: &str = "\n";

/// The declared kind of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// UTF-8 plain text (`.txt`).
    Text,
    /// Portable Document Format (`.pdf`).
    Pdf,
}

impl FileKind {
    /// Resolve the kind from a file name by its extension.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::UnsupportedFormat`] for any extension other than
    /// `.txt` or `.pdf`, or when there is no extension at all.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| RagError::UnsupportedFormat(name.to_string()))?;
        extension.parse()
    }
}

impl FromStr for FileKind {
    type Err = RagError;

    fn from_str(label: &str) -> Result<Self> {
        match label.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(Self::Text),
            "pdf" => Ok(Self::Pdf),
            _ => Err(RagError::UnsupportedFormat(label.to_string())),
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Pdf => f.write_str("pdf"),
        }
    }
}

/// Extract a [`Document`] from raw bytes of the given kind.
///
/// # Errors
///
/// - [`RagError::MalformedDocument`] if text is not valid UTF-8 or the PDF
///   cannot be parsed at all
/// - [`RagError::EmptyDocument`] if the extracted text is blank
pub fn load_document(
    source_name: impl Into<String>,
    bytes: &[u8],
    kind: FileKind,
) -> Result<Document> {
    let text = match kind {
        FileKind::Text => decode_text(bytes)?,
        FileKind::Pdf => extract_pdf_text(bytes)?,
    };

    if text.trim().is_empty() {
        return Err(RagError::EmptyDocument);
    }

    let document = Document::new(source_name, text);
    debug!(
        source = %document.source_name,
        %kind,
        text_len = document.text.len(),
        "loaded document"
    );
    Ok(document)
}

fn decode_text(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| RagError::MalformedDocument(format!("text is not valid UTF-8: {e}")))
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String> {
    let pdf = lopdf::Document::load_mem(bytes)
        .map_err(|e| RagError::MalformedDocument(format!("failed to parse PDF: {e}")))?;

    let pages = pdf.get_pages();
    debug!(page_count = pages.len(), "extracting text from PDF");

    let mut parts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        match pdf.extract_text(&[*page_number]) {
            Ok(page_text) if !page_text.trim().is_empty() => {
                parts.push(page_text.trim_end().to_string());
            }
            Ok(_) => debug!(page = page_number, "page has no extractable text, skipping"),
            Err(e) => warn!(page = page_number, error = %e, "failed to extract page text, skipping"),
        }
    }

    Ok(parts.join(PAGE_SEPARATOR))
}
