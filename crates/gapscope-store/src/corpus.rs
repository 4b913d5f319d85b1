//! Reference corpus files and ingestion
//!
//! A corpus file is a JSON array of controls:
//!
//! ```json
//! [{"id": "PM-1", "text": "...", "domain": "Patch Management",
//!   "subdomain": "Patch Management", "source_file": "nist-800-40.pdf"}]
//! ```
//!
//! `source_file` becomes the record's `source` metadata. Missing metadata
//! fields are stored as empty strings.

use crate::{ReferenceStore, StoreError};
use gapscope_domain::traits::EmbeddingModel;
use gapscope_domain::{ReferenceMetadata, ReferenceRecord};
use serde::Deserialize;
use std::fmt::Display;
use std::path::Path;
use tracing::{info, warn};

/// One control as it appears in a corpus file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CorpusEntry {
    /// Corpus identifier
    pub id: String,
    /// Control text
    pub text: String,
    /// Domain label
    #[serde(default)]
    pub domain: Option<String>,
    /// Subdomain label
    #[serde(default)]
    pub subdomain: Option<String>,
    /// Originating document
    #[serde(default, alias = "source")]
    pub source_file: Option<String>,
}

impl CorpusEntry {
    /// Convert into a stored record (no similarity)
    pub fn into_record(self) -> ReferenceRecord {
        ReferenceRecord {
            id: self.id,
            text: self.text,
            metadata: ReferenceMetadata {
                domain: self.domain.unwrap_or_default(),
                subdomain: self.subdomain.unwrap_or_default(),
                source: self.source_file.unwrap_or_default(),
            },
            similarity: None,
        }
    }
}

/// Outcome of one ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// Rows written
    pub inserted: usize,
    /// Entries skipped because their id was already stored
    pub duplicates: usize,
    /// Entries skipped because their text was blank
    pub blank: usize,
}

/// Parse a corpus from JSON text
pub fn parse_corpus(json: &str) -> Result<Vec<CorpusEntry>, StoreError> {
    serde_json::from_str(json).map_err(|e| StoreError::InvalidData(format!("corpus: {}", e)))
}

/// Read and parse a corpus file
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<CorpusEntry>, StoreError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .map_err(|e| StoreError::InvalidData(format!("{}: {}", path.display(), e)))?;
    parse_corpus(&json)
}

/// Embed and store every entry
///
/// Entries whose id is already present are skipped with a warning, so
/// re-running ingestion over the same file is harmless. An embedding
/// failure aborts the run; rows stored before it remain.
pub fn ingest<E>(
    store: &ReferenceStore,
    embedder: &E,
    entries: Vec<CorpusEntry>,
) -> Result<IngestSummary, StoreError>
where
    E: EmbeddingModel + ?Sized,
    E::Error: Display,
{
    let mut summary = IngestSummary::default();

    for entry in entries {
        if entry.text.trim().is_empty() {
            warn!("Skipping corpus entry {} with blank text", entry.id);
            summary.blank += 1;
            continue;
        }
        if store.contains(&entry.id)? {
            warn!("Skipping duplicate corpus entry {}", entry.id);
            summary.duplicates += 1;
            continue;
        }

        let embedding = embedder
            .embed(&entry.text)
            .map_err(|e| StoreError::Embedding(e.to_string()))?;
        store.insert(&entry.into_record(), &embedding)?;
        summary.inserted += 1;
    }

    info!(
        "Ingested {} reference controls ({} duplicates, {} blank)",
        summary.inserted, summary.duplicates, summary.blank
    );
    Ok(summary)
}
