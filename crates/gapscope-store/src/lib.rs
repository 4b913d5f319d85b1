//! Gapscope Storage Layer
//!
//! Implements the `ReferenceIndex` trait over the reference control corpus.
//!
//! # Architecture
//!
//! - SQLite holds every control: text, metadata and its embedding
//! - HNSW serves unfiltered nearest-neighbour queries; it is rebuilt from
//!   SQLite on open
//! - Filtered nearest-neighbour queries scan the (small) matching row set
//!   exactly, so a narrow subdomain filter never loses recall
//!
//! The store is written only during ingestion. Pipeline runs share it
//! read-only across threads.
//!
//! # Examples
//!
//! ```no_run
//! use gapscope_store::ReferenceStore;
//!
//! let store = ReferenceStore::open("gapscope.db", 384).unwrap();
//! println!("{} controls", store.len().unwrap());
//! ```

#![warn(missing_docs)]

pub mod corpus;
pub mod embedding;
pub mod vector_index;

use embedding::cosine_distance;
use gapscope_domain::traits::ReferenceIndex;
use gapscope_domain::{ReferenceFilter, ReferenceMetadata, ReferenceRecord};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tracing::{debug, info};
use vector_index::{VectorIndex, VectorIndexError};

pub use corpus::{ingest, load_corpus, CorpusEntry, IngestSummary};
pub use embedding::{EmbeddingError, MockEmbeddingModel};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Vector index error
    #[error("Vector index error: {0}")]
    VectorIndex(#[from] VectorIndexError),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A record with this id is already stored
    #[error("Duplicate reference id: {0}")]
    Duplicate(String),

    /// The database was built with a different embedding dimension
    #[error("Store was built with {stored}-dimensional embeddings, but {requested} were requested")]
    DimensionMismatch {
        /// Dimension recorded in the database
        stored: usize,
        /// Dimension the caller opened it with
        requested: usize,
    },

    /// Embedding collaborator failed
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// A thread panicked while holding the connection
    #[error("Store lock poisoned")]
    LockPoisoned,
}

const SELECT_COLUMNS: &str = "seq, id, text, domain, subdomain, source";

/// SQLite + HNSW reference corpus
pub struct ReferenceStore {
    conn: Mutex<Connection>,
    index: VectorIndex,
}

impl ReferenceStore {
    /// Open (or create) a store at `path` for `dimension`-length embeddings
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn open<P: AsRef<Path>>(path: P, dimension: usize) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Self::check_dimension(&conn, dimension)?;

        let store = Self {
            conn: Mutex::new(conn),
            index: VectorIndex::new(dimension),
        };
        let rebuilt = store.rebuild_index()?;
        info!("Opened reference store: {} controls indexed", rebuilt);
        Ok(store)
    }

    /// In-memory store
    pub fn in_memory(dimension: usize) -> Result<Self, StoreError> {
        Self::open(":memory:", dimension)
    }

    fn check_dimension(conn: &Connection, dimension: usize) -> Result<(), StoreError> {
        let stored: Option<String> = conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = 'dimension'",
                [],
                |row| row.get(0),
            )
            .optional()?;

        match stored {
            Some(value) => {
                let stored: usize = value
                    .parse()
                    .map_err(|_| StoreError::InvalidData(format!("bad stored dimension: {}", value)))?;
                if stored != dimension {
                    return Err(StoreError::DimensionMismatch {
                        stored,
                        requested: dimension,
                    });
                }
            }
            None => {
                conn.execute(
                    "INSERT INTO store_meta (key, value) VALUES ('dimension', ?1)",
                    params![dimension.to_string()],
                )?;
            }
        }
        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Reload every stored embedding into a fresh HNSW index
    pub fn rebuild_index(&self) -> Result<usize, StoreError> {
        self.index.clear();

        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT seq, embedding FROM reference_controls ORDER BY seq")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, Vec<u8>>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        for (seq, blob) in &rows {
            let embedding = blob_to_embedding(blob)?;
            self.index.add(*seq as usize, &embedding)?;
        }
        Ok(rows.len())
    }

    /// Embedding dimension this store accepts
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Number of stored controls
    pub fn len(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn()?
            .query_row("SELECT COUNT(*) FROM reference_controls", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Whether no controls are stored
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Whether a control with `id` is stored
    pub fn contains(&self, id: &str) -> Result<bool, StoreError> {
        let exists = self
            .conn()?
            .query_row(
                "SELECT 1 FROM reference_controls WHERE id = ?1",
                params![id],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        Ok(exists)
    }

    /// Store one control with its embedding
    pub fn insert(&self, record: &ReferenceRecord, embedding: &[f32]) -> Result<(), StoreError> {
        if embedding.len() != self.dimension() {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension(),
                actual: embedding.len(),
            }
            .into());
        }
        if self.contains(&record.id)? {
            return Err(StoreError::Duplicate(record.id.clone()));
        }

        let seq = {
            let conn = self.conn()?;
            conn.execute(
                "INSERT INTO reference_controls (id, text, domain, subdomain, source, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    &record.id,
                    &record.text,
                    &record.metadata.domain,
                    &record.metadata.subdomain,
                    &record.metadata.source,
                    embedding_to_blob(embedding),
                ],
            )?;
            conn.last_insert_rowid()
        };

        self.index.add(seq as usize, embedding)?;
        debug!("Stored reference control {} at seq {}", record.id, seq);
        Ok(())
    }

    fn fetch_by_seq(&self, seq: usize) -> Result<Option<ReferenceRecord>, StoreError> {
        let sql = format!("SELECT {} FROM reference_controls WHERE seq = ?1", SELECT_COLUMNS);
        let record = self
            .conn()?
            .query_row(&sql, params![seq as i64], |row| Ok(row_to_record(row)?.1))
            .optional()?;
        Ok(record)
    }

    /// Exact scan over the rows matching `filter`, nearest first
    fn scan_filtered(
        &self,
        vector: &[f32],
        filter: &ReferenceFilter,
        limit: usize,
    ) -> Result<Vec<(ReferenceRecord, f64)>, StoreError> {
        let (clause, params) = filter_clause(filter);
        let sql = format!(
            "SELECT {}, embedding FROM reference_controls WHERE 1=1{} ORDER BY seq",
            SELECT_COLUMNS, clause
        );

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt
            .query_map(&param_refs[..], |row| {
                let (_, record) = row_to_record(row)?;
                let blob: Vec<u8> = row.get(6)?;
                Ok((record, blob))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut scored = Vec::with_capacity(rows.len());
        for (record, blob) in rows {
            let embedding = blob_to_embedding(&blob)?;
            scored.push((record, f64::from(cosine_distance(vector, &embedding))));
        }
        // Stable sort keeps storage order among equal distances
        scored.sort_by(|a, b| a.1.total_cmp(&b.1));
        scored.truncate(limit);
        Ok(scored)
    }
}

impl ReferenceIndex for ReferenceStore {
    type Error = StoreError;

    fn query_by_filter(
        &self,
        filter: &ReferenceFilter,
        limit: usize,
    ) -> Result<Vec<ReferenceRecord>, Self::Error> {
        let (clause, mut params) = filter_clause(filter);
        let sql = format!(
            "SELECT {} FROM reference_controls WHERE 1=1{} ORDER BY seq LIMIT ?",
            SELECT_COLUMNS, clause
        );
        params.push(Box::new(limit as i64));

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let records = stmt
            .query_map(&param_refs[..], |row| Ok(row_to_record(row)?.1))?
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Filter {:?} matched {} controls", filter, records.len());
        Ok(records)
    }

    fn query_by_vector(
        &self,
        vector: &[f32],
        filter: Option<&ReferenceFilter>,
        limit: usize,
    ) -> Result<Vec<(ReferenceRecord, f64)>, Self::Error> {
        if vector.len() != self.dimension() {
            return Err(VectorIndexError::DimensionMismatch {
                expected: self.dimension(),
                actual: vector.len(),
            }
            .into());
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        if let Some(filter) = filter.filter(|f| !f.is_empty()) {
            return self.scan_filtered(vector, filter, limit);
        }

        let hits = self.index.search(vector, limit)?;
        let mut results = Vec::with_capacity(hits.len());
        for (seq, distance) in hits {
            match self.fetch_by_seq(seq)? {
                Some(record) => results.push((record, f64::from(distance))),
                None => {
                    return Err(StoreError::InvalidData(format!(
                        "index points at missing row {}",
                        seq
                    )))
                }
            }
        }
        Ok(results)
    }
}

fn filter_clause(filter: &ReferenceFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
    let mut clause = String::new();
    let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(domain) = &filter.domain {
        clause.push_str(" AND domain = ?");
        params.push(Box::new(domain.clone()));
    }
    if let Some(subdomain) = &filter.subdomain {
        clause.push_str(" AND subdomain = ?");
        params.push(Box::new(subdomain.clone()));
    }
    (clause, params)
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, ReferenceRecord)> {
    Ok((
        row.get(0)?,
        ReferenceRecord {
            id: row.get(1)?,
            text: row.get(2)?,
            metadata: ReferenceMetadata {
                domain: row.get(3)?,
                subdomain: row.get(4)?,
                source: row.get(5)?,
            },
            similarity: None,
        },
    ))
}

fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn blob_to_embedding(blob: &[u8]) -> Result<Vec<f32>, StoreError> {
    if blob.len() % 4 != 0 {
        return Err(StoreError::InvalidData(format!(
            "embedding blob of {} bytes is not a whole number of f32s",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
