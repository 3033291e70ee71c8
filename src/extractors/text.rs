// src/extractors/text.rs
//! Document bytes to plain text. PDF goes through `lopdf` page by page, falling back to
//! `pdf-extract` when the document cannot be loaded; DOCX is read straight from
//! `word/document.xml`.

// --- Imports ---
use crate::utils::error::ExtractError;
use std::fmt;
use std::io::{Cursor, Read};
use std::path::Path;

// WordprocessingML main namespace
const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

// --- Data Structures ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// `doc` is routed to the DOCX decoder; a legacy binary file then fails extraction.
    pub fn from_extension(ext: &str) -> Result<Self, ExtractError> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" | "doc" => Ok(DocumentFormat::Docx),
            other => Err(ExtractError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ExtractError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        Self::from_extension(ext)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "pdf"),
            DocumentFormat::Docx => write!(f, "docx"),
        }
    }
}

/// Uploaded document bytes plus their declared format. Never persisted.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub format: DocumentFormat,
}

impl RawDocument {
    pub fn new(bytes: Vec<u8>, format: DocumentFormat) -> Self {
        Self { bytes, format }
    }
}

/// Extracted document text. Line order drives section search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainText(String);

impl PlainText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn lines(&self) -> Vec<&str> {
        self.0.split('\n').collect()
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

// --- Extraction ---

/// Decodes a document into trimmed plain text. Empty output is an `ExtractionFailed`.
pub fn extract_text(document: &RawDocument) -> Result<PlainText, ExtractError> {
    let text = match document.format {
        DocumentFormat::Pdf => extract_pdf(&document.bytes)?,
        DocumentFormat::Docx => extract_docx(&document.bytes)?,
    };

    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractError::ExtractionFailed(format!(
            "no text found in {} document",
            document.format
        )));
    }
    tracing::debug!("Extracted {} characters from {} document", text.len(), document.format);
    tracing::trace!("Full document text:\n{}", text);
    Ok(PlainText::new(text))
}

/// Pages joined by newlines. A page that fails to decode contributes an empty string.
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = match lopdf::Document::load_mem(bytes) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!("lopdf could not load PDF ({}); trying pdf-extract", e);
            return extract_pdf_fallback(bytes);
        }
    };

    let pages = doc.get_pages();
    tracing::debug!("PDF has {} pages", pages.len());

    let mut text = String::new();
    for page_num in pages.keys() {
        let page_text = doc.extract_text(&[*page_num]).unwrap_or_else(|e| {
            tracing::warn!("Failed to extract text from PDF page {}: {}", page_num, e);
            String::new()
        });
        text.push_str(&page_text);
        if !page_text.ends_with('\n') {
            text.push('\n');
        }
    }
    Ok(text)
}

// pdf-extract is known to panic on some malformed inputs; contain it here.
fn extract_pdf_fallback(bytes: &[u8]) -> Result<String, ExtractError> {
    let outcome = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));
    match outcome {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractError::ExtractionFailed(format!("PDF decoding failed: {}", e))),
        Err(_) => Err(ExtractError::ExtractionFailed(
            "PDF decoder panicked on malformed input".to_string(),
        )),
    }
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::ExtractionFailed(format!("not a DOCX archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::ExtractionFailed(format!("cannot find word/document.xml: {}", e)))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::ExtractionFailed(format!("cannot read word/document.xml: {}", e)))?;

    let paragraphs = docx_paragraphs(&xml)?;
    tracing::debug!("DOCX has {} paragraphs", paragraphs.len());
    Ok(paragraphs.join("\n"))
}

/// Paragraph texts in document order. Table cell paragraphs are included; paragraphs nested
/// inside another paragraph (text boxes) are folded into their parent.
fn docx_paragraphs(xml: &str) -> Result<Vec<String>, ExtractError> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| ExtractError::ExtractionFailed(format!("invalid document.xml: {}", e)))?;

    let paragraphs = doc
        .descendants()
        .filter(|node| is_paragraph(node))
        .filter(|node| !node.ancestors().skip(1).any(|a| is_paragraph(&a)))
        .map(|para| {
            let mut text = String::new();
            for node in para.descendants() {
                if node.has_tag_name((W_NS, "t")) {
                    text.push_str(node.text().unwrap_or_default());
                } else if node.has_tag_name((W_NS, "tab")) {
                    text.push('\t');
                } else if node.has_tag_name((W_NS, "br")) || node.has_tag_name((W_NS, "cr")) {
                    text.push('\n');
                }
            }
            text
        })
        .collect();

    Ok(paragraphs)
}

fn is_paragraph(node: &roxmltree::Node<'_, '_>) -> bool {
    node.has_tag_name((W_NS, "p"))
}

/// Reads a document from disk, resolving its format from the file extension.
pub async fn load_document(path: &Path) -> Result<RawDocument, ExtractError> {
    let format = DocumentFormat::from_path(path)?;
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        ExtractError::ExtractionFailed(format!("cannot read '{}': {}", path.display(), e))
    })?;
    tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok(RawDocument::new(bytes, format))
}
