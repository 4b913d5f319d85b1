//! Single-label domain inference

use crate::prompt::inference_prompt;
use crate::error::ClassifierError;
use gapscope_domain::traits::{AuditSink, LlmProvider};
use gapscope_llm::extract_structured;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use tracing::{info, warn};

/// Audit stage label for raw inference output
pub const INFERENCE_STAGE: &str = "domain_inference";

const UNKNOWN: &str = "Unknown";

/// The model's best single domain/subdomain for a text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainInference {
    /// Domain label as returned (not validated)
    pub domain: String,
    /// Subdomain label as returned (not validated)
    pub subdomain: String,
    /// Model-reported confidence; `0.0` when absent
    pub confidence: f64,
}

impl DomainInference {
    /// The result used when the model output cannot be parsed
    pub fn unknown() -> Self {
        Self {
            domain: UNKNOWN.to_string(),
            subdomain: UNKNOWN.to_string(),
            confidence: 0.0,
        }
    }
}

/// Ask the model which domain and subdomain best describe `text`
///
/// Output without a JSON object degrades to [`DomainInference::unknown`].
pub fn infer_domain<L>(
    llm: &L,
    audit: &dyn AuditSink,
    text: &str,
) -> Result<DomainInference, ClassifierError>
where
    L: LlmProvider + ?Sized,
    L::Error: Display,
{
    if text.trim().is_empty() {
        return Err(ClassifierError::EmptyInput);
    }

    let raw = llm
        .generate(&inference_prompt(text))
        .map_err(|e| ClassifierError::Llm(e.to_string()))?;
    audit.record(INFERENCE_STAGE, &raw);

    let Some(object) = extract_structured(&raw).into_object() else {
        warn!("Domain inference output is not a JSON object");
        return Ok(DomainInference::unknown());
    };

    let label = |field: &str| {
        object
            .get(field)
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN)
            .to_string()
    };
    let confidence = object
        .get("confidence")
        .and_then(|v| v.as_f64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
        .unwrap_or(0.0);

    let inference = DomainInference {
        domain: label("domain"),
        subdomain: label("subdomain"),
        confidence,
    };
    info!(
        "Inferred {} / {} ({:.2})",
        inference.domain, inference.subdomain, inference.confidence
    );
    Ok(inference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gapscope_llm::{MemoryAudit, MockProvider, NullAudit};

    #[test]
    fn test_inference_parsed() {
        let llm = MockProvider::new(
            r#"Sure: {"domain": "Data Privacy and Security", "subdomain": "Encryption", "confidence": 0.82}"#,
        );
        let result = infer_domain(&llm, &NullAudit, "Laptops are encrypted.").unwrap();
        assert_eq!(result.domain, "Data Privacy and Security");
        assert_eq!(result.subdomain, "Encryption");
        assert!((result.confidence - 0.82).abs() < 1e-9);
    }

    #[test]
    fn test_missing_confidence_defaults_to_zero() {
        let llm = MockProvider::new(r#"{"domain": "Risk Management", "subdomain": "Risk Assessment Policy"}"#);
        let result = infer_domain(&llm, &NullAudit, "Risks are assessed.").unwrap();
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_unparseable_output_is_unknown() {
        let llm = MockProvider::new("I am not sure.");
        let audit = MemoryAudit::new();
        let result = infer_domain(&llm, &audit, "Risks are assessed.").unwrap();
        assert_eq!(result, DomainInference::unknown());
        assert_eq!(audit.entries()[0].stage, INFERENCE_STAGE);
    }

    #[test]
    fn test_blank_text_rejected() {
        let llm = MockProvider::new("{}");
        assert!(matches!(
            infer_domain(&llm, &NullAudit, "  "),
            Err(ClassifierError::EmptyInput)
        ));
        assert_eq!(llm.call_count(), 0);
    }
}
