//! Plain-text extraction from uploaded PDF and DOCX documents.

use std::path::Path;

use docx_rs::{DocumentChild, InsertChild, ParagraphChild, Run, RunChild};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("PDF could not be read: {0}")]
    Pdf(String),

    #[error("DOCX could not be read: {0}")]
    Docx(String),

    #[error("Extraction task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Unsupported,
}

impl DocumentKind {
    /// Classifies by file extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Self {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => DocumentKind::Pdf,
            Some("docx") => DocumentKind::Docx,
            _ => DocumentKind::Unsupported,
        }
    }
}

/// Extracts text on the blocking pool. A parser panic surfaces as
/// `ExtractionError::Task` instead of taking down the request.
pub async fn extract_text(data: bytes::Bytes, filename: &str) -> Result<String, ExtractionError> {
    let kind = DocumentKind::from_filename(filename);
    if kind == DocumentKind::Unsupported {
        debug!("Ignoring unsupported document {filename}");
        return Ok(String::new());
    }

    tokio::task::spawn_blocking(move || extract_by_kind(&data, kind))
        .await
        .map_err(|e| ExtractionError::Task(e.to_string()))?
}

fn extract_by_kind(data: &[u8], kind: DocumentKind) -> Result<String, ExtractionError> {
    match kind {
        DocumentKind::Pdf => extract_pdf(data),
        DocumentKind::Docx => extract_docx(data),
        DocumentKind::Unsupported => Ok(String::new()),
    }
}

fn extract_pdf(data: &[u8]) -> Result<String, ExtractionError> {
    pdf_extract::extract_text_from_mem(data).map_err(|e| ExtractionError::Pdf(e.to_string()))
}

fn extract_docx(data: &[u8]) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(data).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut text = String::new();
    for child in &docx.document.children {
        if let DocumentChild::Paragraph(paragraph) = child {
            for paragraph_child in &paragraph.children {
                push_paragraph_child(&mut text, paragraph_child);
            }
            text.push('\n');
        }
    }
    Ok(text)
}

/// Runs may sit directly in the paragraph or nested in hyperlinks and
/// tracked insertions. Deleted text is skipped.
fn push_paragraph_child(text: &mut String, child: &ParagraphChild) {
    match child {
        ParagraphChild::Run(run) => push_run(text, run),
        ParagraphChild::Hyperlink(link) => {
            for nested in &link.children {
                push_paragraph_child(text, nested);
            }
        }
        ParagraphChild::Insert(insert) => {
            for insert_child in &insert.children {
                if let InsertChild::Run(run) = insert_child {
                    push_run(text, run);
                }
            }
        }
        _ => {}
    }
}

fn push_run(text: &mut String, run: &Run) {
    for run_child in &run.children {
        match run_child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}
