//! Document text extraction.
//!
//! PDFs go through `pdf-extract`; anything else is read as UTF-8 text.
//! Extracted text is cleaned before it reaches the pipeline, and a document
//! with no usable text is rejected.

use crate::error::{CliError, Result};
use gapscope_classifier::{clean_text, ClassifierError};
use gapscope_domain::traits::TextSource;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads a file as UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    type Error = CliError;

    fn extract_text(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }
}

/// Extracts the text layer of a PDF.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfSource;

impl TextSource for PdfSource {
    type Error = CliError;

    fn extract_text(&self, path: &Path) -> Result<String> {
        let bytes = fs::read(path)?;
        pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| CliError::Extraction(format!("{}: {}", path.display(), e)))
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Extract and clean the text of the document at `path`.
pub fn load_document(path: &Path) -> Result<String> {
    let raw = if is_pdf(path) {
        PdfSource.extract_text(path)?
    } else {
        PlainTextSource.extract_text(path)?
    };
    debug!("Extracted {} chars from {}", raw.len(), path.display());
    prepare_text(&raw)
}

/// Clean inline text, rejecting it when nothing usable remains.
pub fn prepare_text(raw: &str) -> Result<String> {
    let text = clean_text(raw);
    if text.is_empty() {
        return Err(ClassifierError::EmptyInput.into());
    }
    Ok(text)
}
