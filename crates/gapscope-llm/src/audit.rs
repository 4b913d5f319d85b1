//! Append-only sinks for raw model output
//!
//! Raw responses are kept for audit regardless of whether they parsed.
//! Sinks are injected into the classifier and synthesizer; nothing in the
//! pipeline opens a log file on its own.

use gapscope_domain::traits::AuditSink;
use gapscope_domain::RunId;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

/// One recorded raw response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// Pipeline stage that produced the response
    pub stage: String,
    /// Raw model output, unmodified
    pub raw: String,
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAudit;

impl AuditSink for NullAudit {
    fn record(&self, _stage: &str, _raw: &str) {}
}

/// Keeps entries in memory; used by tests
#[derive(Debug, Default)]
pub struct MemoryAudit {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAudit {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl AuditSink for MemoryAudit {
    fn record(&self, stage: &str, raw: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(AuditEntry {
                stage: stage.to_string(),
                raw: raw.to_string(),
            });
        }
    }
}

/// Appends framed entries to a file, tagged with the run they belong to
///
/// Write failures are logged and swallowed.
#[derive(Debug)]
pub struct FileAudit {
    path: PathBuf,
    run_id: RunId,
    write_lock: Mutex<()>,
}

impl FileAudit {
    /// Append to `path` (created on first write) for run `run_id`
    pub fn new(path: impl AsRef<Path>, run_id: RunId) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            run_id,
            write_lock: Mutex::new(()),
        }
    }

    /// File entries are appended to
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, stage: &str, raw: &str) -> std::io::Result<()> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "==== RAW LLM OUTPUT [{}] run={} ts={} ====", stage, self.run_id, timestamp)?;
        writeln!(file, "{}", raw)?;
        writeln!(file, "====")?;
        Ok(())
    }
}

impl AuditSink for FileAudit {
    fn record(&self, stage: &str, raw: &str) {
        let _guard = self.write_lock.lock();
        if let Err(e) = self.append(stage, raw) {
            warn!("Failed to append audit entry to {}: {}", self.path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_memory_audit_records_in_order() {
        let audit = MemoryAudit::new();
        audit.record("batch_classification", "[]");
        audit.record("gap_analysis", "not json");

        let entries = audit.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].stage, "batch_classification");
        assert_eq!(entries[1].raw, "not json");
    }

    #[test]
    fn test_arc_sink_delegates() {
        let audit = Arc::new(MemoryAudit::new());
        let shared: Arc<MemoryAudit> = Arc::clone(&audit);
        shared.record("stage", "raw");
        assert_eq!(audit.entries().len(), 1);
    }

    #[test]
    fn test_file_audit_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.log");
        let run_id = RunId::new();
        let audit = FileAudit::new(&path, run_id);

        audit.record("document_chunking", "{\"a\": 1}");
        audit.record("document_chunking", "second");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("==== RAW LLM OUTPUT [document_chunking]").count(), 2);
        assert!(contents.contains(&run_id.to_string()));
        assert!(contents.contains("{\"a\": 1}"));
    }

    #[test]
    fn test_file_audit_unwritable_path_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let audit = FileAudit::new(dir.path().join("missing").join("raw.log"), RunId::new());
        audit.record("stage", "raw");
    }
}
