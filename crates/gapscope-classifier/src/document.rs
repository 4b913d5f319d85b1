//! Whole-document chunking
//!
//! One model call partitions the entire document into the four domains.
//! The response is an object keyed by domain:
//!
//! ```json
//! {"Patch Management": {"text": ["..."], "subdomains": ["Patch Management"]}}
//! ```
//!
//! A value may also be a bare list of strings or a bare string. Domains whose
//! combined text is empty are dropped, so absent domains never reach gap
//! analysis as empty chunks.

use crate::config::PipelineConfig;
use crate::error::ClassifierError;
use crate::prompt::document_prompt;
use crate::segment::segment;
use gapscope_domain::traits::{AuditSink, LlmProvider};
use gapscope_domain::{Domain, DomainChunk, ValidationMode};
use gapscope_llm::{extract_structured, NullAudit};
use serde_json::Value;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Audit stage label for raw document chunking output
pub const DOCUMENT_STAGE: &str = "document_chunking";

/// Partitions a whole document into domain chunks with one model call
pub struct DocumentChunker<L: LlmProvider> {
    llm: Arc<L>,
    audit: Arc<dyn AuditSink + Send + Sync>,
    config: PipelineConfig,
}

impl<L> DocumentChunker<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a chunker that discards raw output
    pub fn new(llm: Arc<L>, config: PipelineConfig) -> Self {
        Self {
            llm,
            audit: Arc::new(NullAudit),
            config,
        }
    }

    /// Record raw model output to `audit`
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink + Send + Sync>) -> Self {
        self.audit = audit;
        self
    }

    /// Ask the model for domain buckets and normalize them into chunks
    ///
    /// Output that is not a JSON object yields no chunks. Text without a
    /// single statement is rejected before the model is called.
    pub fn chunk_document(&self, text: &str) -> Result<Vec<DomainChunk>, ClassifierError> {
        crate::check_input(text, self.config.max_text_length)?;
        if segment(text).is_empty() {
            return Err(ClassifierError::EmptyInput);
        }

        let prompt = document_prompt(text);
        debug!("Document chunking prompt length: {} chars", prompt.len());

        let raw = self
            .llm
            .generate(&prompt)
            .map_err(|e| ClassifierError::Llm(e.to_string()))?;
        self.audit.record(DOCUMENT_STAGE, &raw);

        let Some(object) = extract_structured(&raw).into_object() else {
            warn!("Document chunking output is not a JSON object; no chunks produced");
            return Ok(Vec::new());
        };

        let mode = self.config.document_validation;
        let mut chunks: Vec<DomainChunk> = Vec::new();

        for (key, value) in &object {
            let Some(domain) = resolve_domain(key, mode) else {
                warn!("Dropping chunk with invalid domain '{}'", key);
                continue;
            };

            let text = combined_text(value);
            if text.is_empty() {
                debug!("Dropping empty domain '{}'", domain);
                continue;
            }

            let subdomains = mode.retain_subdomains(subdomain_list(value));

            let position = match chunks.iter().position(|c| c.domain == domain) {
                Some(position) => position,
                None => {
                    chunks.push(DomainChunk::new(domain));
                    chunks.len() - 1
                }
            };
            let chunk = &mut chunks[position];
            chunk.push_text(&text);
            for subdomain in &subdomains {
                chunk.add_subdomain(subdomain);
            }
        }

        info!("Document chunking produced {} domain chunks", chunks.len());
        Ok(chunks)
    }
}

/// Canonical label for a response key, if the gate admits it
///
/// Known keys (including the `ISMS` abbreviation) map to their full label.
/// Unknown keys survive verbatim only when validation is off.
fn resolve_domain(key: &str, mode: ValidationMode) -> Option<String> {
    match Domain::from_key(key) {
        Some(domain) => Some(domain.label().to_string()),
        None if mode.admits_domain(key) => Some(key.to_string()),
        None => None,
    }
}

fn join_entries(entries: &[Value]) -> String {
    entries
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn combined_text(value: &Value) -> String {
    match value {
        Value::Object(fields) => fields.get("text").map(combined_text).unwrap_or_default(),
        Value::Array(entries) => join_entries(entries),
        Value::String(s) => s.trim().to_string(),
        _ => String::new(),
    }
}

fn subdomain_list(value: &Value) -> Vec<String> {
    value
        .get("subdomains")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gapscope_llm::{MemoryAudit, MockProvider};
    use serde_json::json;

    fn chunker(response: &str, mode: ValidationMode) -> DocumentChunker<MockProvider> {
        let config = PipelineConfig {
            document_validation: mode,
            ..PipelineConfig::default()
        };
        DocumentChunker::new(Arc::new(MockProvider::new(response)), config)
    }

    const RESPONSE: &str = r#"```json
{
  "ISMS": {"text": [], "subdomains": []},
  "Patch Management": {"text": ["Systems must be updated monthly.", "  ", "Scan weekly."], "subdomains": ["Patch Management", "Made Up"]},
  "Risk Management": {"text": ["Only admins may access production."], "subdomains": ["Access Control Policy"]},
  "Physical Security": {"text": ["Badges are required."], "subdomains": []}
}
```"#;

    #[test]
    fn test_empty_domains_dropped_and_order_kept() {
        let chunks = chunker(RESPONSE, ValidationMode::Off)
            .chunk_document("policy")
            .unwrap();

        let domains: Vec<&str> = chunks.iter().map(|c| c.domain.as_str()).collect();
        assert_eq!(domains, vec!["Patch Management", "Risk Management", "Physical Security"]);
        assert_eq!(chunks[0].text, "Systems must be updated monthly. Scan weekly.");
        assert_eq!(chunks[0].subdomains, vec!["Patch Management", "Made Up"]);
    }

    #[test]
    fn test_domain_only_drops_unknown_keys() {
        let chunks = chunker(RESPONSE, ValidationMode::DomainOnly)
            .chunk_document("policy")
            .unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].subdomains, vec!["Patch Management", "Made Up"]);
    }

    #[test]
    fn test_strict_strips_unknown_subdomains() {
        let chunks = chunker(RESPONSE, ValidationMode::Strict)
            .chunk_document("policy")
            .unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].subdomains, vec!["Patch Management"]);
    }

    #[test]
    fn test_isms_abbreviation_resolved() {
        let chunks = chunker(
            r#"{"ISMS": {"text": ["An ISMS is maintained."], "subdomains": ["Information Security Policy"]}}"#,
            ValidationMode::DomainOnly,
        )
        .chunk_document("policy")
        .unwrap();
        assert_eq!(chunks[0].domain, "Information Security Management System (ISMS)");
    }

    #[test]
    fn test_bare_values_accepted() {
        let chunks = chunker(
            r#"{"Patch Management": ["Patch monthly.", "Scan weekly."], "Risk Management": "  Assess yearly. "}"#,
            ValidationMode::Off,
        )
        .chunk_document("policy")
        .unwrap();
        assert_eq!(chunks[0].text, "Patch monthly. Scan weekly.");
        assert_eq!(chunks[1].text, "Assess yearly.");
        assert!(chunks[1].subdomains.is_empty());
    }

    #[test]
    fn test_non_object_output_yields_nothing() {
        let chunks = chunker("[1, 2, 3]", ValidationMode::Off)
            .chunk_document("policy")
            .unwrap();
        assert!(chunks.is_empty());

        let chunks = chunker("no json here", ValidationMode::Off)
            .chunk_document("policy")
            .unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_empty_input_is_fatal() {
        let result = chunker("{}", ValidationMode::Off).chunk_document(" ");
        assert!(matches!(result, Err(ClassifierError::EmptyInput)));
    }

    #[test]
    fn test_heading_only_input_is_fatal() {
        let result = chunker("{}", ValidationMode::Off).chunk_document("Scope:\n");
        assert!(matches!(result, Err(ClassifierError::EmptyInput)));
    }

    #[test]
    fn test_raw_output_audited() {
        let audit = Arc::new(MemoryAudit::new());
        chunker("{}", ValidationMode::Off)
            .with_audit(audit.clone())
            .chunk_document("policy")
            .unwrap();
        assert_eq!(audit.entries()[0].stage, DOCUMENT_STAGE);
    }

    #[test]
    fn test_combined_text_shapes() {
        assert_eq!(combined_text(&json!({"text": ["a", " b ", 3, ""]})), "a b");
        assert_eq!(combined_text(&json!({"text": "solo"})), "solo");
        assert_eq!(combined_text(&json!({"subdomains": []})), "");
        assert_eq!(combined_text(&json!(42)), "");
    }
}
