//! Gap synthesis for one subdomain
//!
//! One model call per subdomain. The response must contain a JSON object;
//! anything else becomes a failed outcome carrying the raw text, so a bad
//! answer for one subdomain never aborts the rest of the report.

use crate::error::SynthesizerError;
use crate::prompt::{gap_prompt, reference_block};
use crate::types::{GapAnalysis, GapOutcome, GapResult, ReferenceUsed};
use gapscope_domain::traits::{AuditSink, LlmProvider};
use gapscope_domain::ReferenceRecord;
use gapscope_llm::{extract_structured, NullAudit};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Audit stage label for raw gap analysis output
pub const GAP_STAGE: &str = "gap_analysis";

/// Error recorded when the model's answer has no usable JSON object
pub const PARSE_FAILURE: &str = "parse failure";

/// Turns policy text plus reference controls into a gap analysis
pub struct GapSynthesizer<L> {
    llm: Arc<L>,
    audit: Arc<dyn AuditSink + Send + Sync>,
    provenance_limit: usize,
}

impl<L> GapSynthesizer<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a synthesizer citing up to `provenance_limit` references
    pub fn new(llm: Arc<L>, provenance_limit: usize) -> Self {
        Self {
            llm,
            audit: Arc::new(NullAudit),
            provenance_limit,
        }
    }

    /// Record raw model output to `audit`
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink + Send + Sync>) -> Self {
        self.audit = audit;
        self
    }

    /// Analyze `policy_text` for `subdomain` against `references`
    ///
    /// Zero references is valid input. Only a failed model call is an error.
    pub fn synthesize(
        &self,
        domain: &str,
        subdomain: &str,
        policy_text: &str,
        references: &[ReferenceRecord],
    ) -> Result<GapOutcome, SynthesizerError> {
        if references.is_empty() {
            debug!("No reference controls for {} / {}", domain, subdomain);
        }

        let prompt = gap_prompt(domain, subdomain, policy_text, &reference_block(references));
        let raw = self
            .llm
            .generate(&prompt)
            .map_err(|e| SynthesizerError::Llm(e.to_string()))?;
        self.audit.record(GAP_STAGE, &raw);

        let analysis = extract_structured(&raw)
            .into_object()
            .and_then(|object| GapAnalysis::from_object(object).ok());
        let Some(analysis) = analysis else {
            warn!("Gap analysis for {} / {} is not a JSON object", domain, subdomain);
            return Ok(GapOutcome::failed(domain, subdomain, PARSE_FAILURE, Some(raw)));
        };

        let references_used = references
            .iter()
            .take(self.provenance_limit)
            .map(|record| ReferenceUsed {
                id: record.id.clone(),
                source: record.metadata.source.clone(),
                similarity: record.similarity,
            })
            .collect();

        info!(
            "Gap analysis for {} / {}: {} gaps from {} references",
            domain,
            subdomain,
            analysis.gap_analysis.len(),
            references.len()
        );

        Ok(GapOutcome::Completed(GapResult {
            domain: domain.to_string(),
            subdomain: subdomain.to_string(),
            analysis,
            references_count: references.len(),
            references_used,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gapscope_domain::ReferenceMetadata;
    use gapscope_llm::{MemoryAudit, MockProvider};

    fn references(n: usize) -> Vec<ReferenceRecord> {
        (0..n)
            .map(|i| ReferenceRecord {
                id: format!("SI-{}", i),
                text: format!("Control {}", i),
                metadata: ReferenceMetadata {
                    domain: "Patch Management".to_string(),
                    subdomain: "Patch Management".to_string(),
                    source: format!("doc-{}.pdf", i),
                },
                similarity: Some(1.0 - i as f64 / 10.0),
            })
            .collect()
    }

    const ANSWER: &str = r#"Here you go:
```json
{"gap_analysis": [{"gap_id": "GAP-1", "description": "No SLA", "severity": "High"}], "confidence": "0.7"}
```"#;

    #[test]
    fn test_provenance_from_first_supplied_references() {
        let synthesizer = GapSynthesizer::new(Arc::new(MockProvider::new(ANSWER)), 5);
        let outcome = synthesizer
            .synthesize("Patch Management", "Patch Management", "Patch monthly.", &references(8))
            .unwrap();

        let GapOutcome::Completed(result) = outcome else {
            panic!("expected a completed analysis");
        };
        assert_eq!(result.references_count, 8);
        let ids: Vec<&str> = result.references_used.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["SI-0", "SI-1", "SI-2", "SI-3", "SI-4"]);
        assert_eq!(result.references_used[0].source, "doc-0.pdf");
        assert_eq!(result.analysis.confidence, Some(serde_json::json!("0.7")));
    }

    #[test]
    fn test_parse_failure_is_partial_result() {
        let audit = Arc::new(MemoryAudit::new());
        let synthesizer =
            GapSynthesizer::new(Arc::new(MockProvider::new("I cannot help with that.")), 5)
                .with_audit(audit.clone());

        let outcome = synthesizer
            .synthesize("Risk Management", "Risk Assessment Policy", "Assess risk.", &[])
            .unwrap();

        match outcome {
            GapOutcome::Failed(failure) => {
                assert_eq!(failure.error, PARSE_FAILURE);
                assert_eq!(failure.raw_response.as_deref(), Some("I cannot help with that."));
                assert_eq!(failure.subdomain, "Risk Assessment Policy");
            }
            GapOutcome::Completed(_) => panic!("expected a parse failure"),
        }
        assert_eq!(audit.entries()[0].stage, GAP_STAGE);
    }

    #[test]
    fn test_zero_references_still_synthesized() {
        let llm = Arc::new(MockProvider::new(ANSWER));
        let synthesizer = GapSynthesizer::new(llm.clone(), 5);
        let outcome = synthesizer
            .synthesize("Patch Management", "Patch Management", "Patch monthly.", &[])
            .unwrap();

        assert!(outcome.error().is_none());
        assert!(llm.prompts()[0].contains(crate::prompt::NO_REFERENCES));
    }

    #[test]
    fn test_model_failure_is_error() {
        let mut llm = MockProvider::default();
        llm.add_error("Subdomain: Encryption");
        let synthesizer = GapSynthesizer::new(Arc::new(llm), 5);

        let result = synthesizer.synthesize("Data Privacy and Security", "Encryption", "Encrypt.", &[]);
        assert!(matches!(result, Err(SynthesizerError::Llm(_))));
    }
}
