//! Builds pipeline collaborators from configuration.

use crate::config::{Config, EmbedderKind};
use crate::error::Result;
use gapscope_domain::traits::{AuditSink, EmbeddingModel};
use gapscope_domain::RunId;
use gapscope_llm::{FileAudit, NullAudit, OllamaEmbedder, OllamaProvider};
use gapscope_store::{MockEmbeddingModel, ReferenceStore};
use gapscope_synthesizer::{Analyzer, GapSynthesizer, Retriever};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Audit sink shared by every stage of one run.
pub type SharedAudit = Arc<dyn AuditSink + Send + Sync>;

/// Analyzer wired to the production collaborators.
pub type GapAnalyzer = Analyzer<OllamaProvider, ReferenceStore, Embedder>;

/// Embedding backend selected by `[store] embedder`.
pub enum Embedder {
    /// Ollama embedding model
    Ollama(OllamaEmbedder),
    /// Hashed bag-of-words vectors
    Hashed(MockEmbeddingModel),
}

impl EmbeddingModel for Embedder {
    type Error = String;

    fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, String> {
        match self {
            Embedder::Ollama(model) => model.embed(text).map_err(|e| e.to_string()),
            Embedder::Hashed(model) => model.embed(text).map_err(|e| e.to_string()),
        }
    }

    fn dimension(&self) -> usize {
        match self {
            Embedder::Ollama(model) => model.dimension(),
            Embedder::Hashed(model) => model.dimension(),
        }
    }
}

/// Generation model.
pub fn llm(config: &Config) -> Result<Arc<OllamaProvider>> {
    let settings = &config.llm;
    let provider = OllamaProvider::with_timeout(
        &settings.endpoint,
        &settings.model,
        Duration::from_secs(settings.timeout_secs),
    )?
    .with_max_retries(settings.max_retries)
    .with_temperature(settings.temperature);
    Ok(Arc::new(provider))
}

/// Audit sink for one run; discards output unless `[audit] path` is set.
pub fn audit(config: &Config) -> SharedAudit {
    match &config.audit.path {
        Some(path) => {
            let run_id = RunId::new();
            info!("Recording raw model output to {} (run {})", path.display(), run_id);
            Arc::new(FileAudit::new(path, run_id))
        }
        None => Arc::new(NullAudit),
    }
}

/// Embedding backend.
pub fn embedder(config: &Config) -> Result<Embedder> {
    let store = &config.store;
    Ok(match store.embedder {
        EmbedderKind::Ollama => Embedder::Ollama(
            OllamaEmbedder::new(&config.llm.endpoint, &store.embedding_model, store.dimension)?
                .with_max_retries(config.llm.max_retries),
        ),
        EmbedderKind::Hashed => Embedder::Hashed(MockEmbeddingModel::new(store.dimension)),
    })
}

/// Open (or create) the reference store.
pub fn open_store(config: &Config) -> Result<ReferenceStore> {
    let path = config.store_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(ReferenceStore::open(&path, config.store.dimension)?)
}

/// Gap analyzer over the configured store and models.
pub fn analyzer(config: &Config, llm: Arc<OllamaProvider>, audit: SharedAudit) -> Result<GapAnalyzer> {
    let synthesizer = GapSynthesizer::new(llm, config.synthesis.provenance_limit).with_audit(audit);
    let retriever = Retriever::new(Arc::new(open_store(config)?), Arc::new(embedder(config)?));
    Ok(Analyzer::new(synthesizer, retriever, config.synthesis.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.store.path = Some(dir.path().join("db").join("refs.db"));
        config.store.embedder = EmbedderKind::Hashed;
        config.store.dimension = 32;
        config
    }

    #[test]
    fn test_hashed_embedder_dimension() {
        let dir = TempDir::new().unwrap();
        let embedder = embedder(&config(&dir)).unwrap();
        assert_eq!(embedder.dimension(), 32);
        assert_eq!(embedder.embed("patch monthly").unwrap().len(), 32);
        assert!(embedder.embed("   ").is_err());
    }

    #[test]
    fn test_store_created_with_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&config(&dir)).unwrap();
        assert!(store.is_empty().unwrap());
        assert!(dir.path().join("db").join("refs.db").exists());
    }

    #[test]
    fn test_audit_file_written() {
        let dir = TempDir::new().unwrap();
        let mut config = config(&dir);
        let path = dir.path().join("audit.log");
        config.audit.path = Some(path.clone());

        audit(&config).record("batch_classification", "raw output");
        assert!(fs::read_to_string(path).unwrap().contains("raw output"));
    }
}
