//! Batch-per-statement classification

use crate::config::PipelineConfig;
use crate::error::ClassifierError;
use crate::prompt::batch_prompt;
use crate::segment::segment;
use gapscope_domain::traits::{AuditSink, LlmProvider};
use gapscope_domain::{Classification, Domain, Statement, ValidationMode};
use gapscope_llm::{extract_structured, NullAudit};
use serde_json::Value;
use std::fmt::{self, Display};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Audit stage label for raw batch classification output
pub const BATCH_STAGE: &str = "batch_classification";

/// Statements sent to the model and the classifications that survived
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// The capped prefix of the segmentation that was classified
    pub statements: Vec<Statement>,
    /// Valid classifications, in model response order
    pub classifications: Vec<Classification>,
}

/// Why a returned item was not kept
#[derive(Debug, Clone, PartialEq)]
enum Rejection {
    NotAnObject,
    MissingField(&'static str),
    OutOfRange(u64),
    UnknownDomain(String),
    UnknownSubdomain(String),
}

impl Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotAnObject => write!(f, "item is not an object"),
            Rejection::MissingField(field) => write!(f, "missing field '{}'", field),
            Rejection::OutOfRange(id) => write!(f, "sentence_id {} is out of range", id),
            Rejection::UnknownDomain(d) => write!(f, "invalid domain '{}'", d),
            Rejection::UnknownSubdomain(s) => write!(f, "invalid subdomain '{}'", s),
        }
    }
}

/// Labels a capped batch of segmented statements with one model call
pub struct BatchClassifier<L: LlmProvider> {
    llm: Arc<L>,
    audit: Arc<dyn AuditSink + Send + Sync>,
    config: PipelineConfig,
}

impl<L> BatchClassifier<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a classifier that discards raw output
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

    /// The configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Segment `text`, classify the first statements, keep valid labels
    ///
    /// Unparseable or wrongly shaped model output yields the statements with
    /// no classifications. Only empty input and a failing model call are errors.
    pub fn classify_batch(&self, text: &str) -> Result<BatchOutcome, ClassifierError> {
        crate::check_input(text, self.config.max_text_length)?;

        let mut statements = segment(text);
        if statements.is_empty() {
            return Err(ClassifierError::EmptyInput);
        }

        let total = statements.len();
        statements.truncate(self.config.max_statements_per_batch);
        if total > statements.len() {
            info!(
                "Classifying first {} of {} statements; the rest are excluded",
                statements.len(),
                total
            );
        } else {
            info!("Classifying {} statements", total);
        }

        let prompt = batch_prompt(&statements);
        debug!("Batch prompt length: {} chars", prompt.len());

        let raw = self
            .llm
            .generate(&prompt)
            .map_err(|e| ClassifierError::Llm(e.to_string()))?;
        self.audit.record(BATCH_STAGE, &raw);

        let Some(items) = extract_structured(&raw).into_array() else {
            warn!("Batch classification output is not a JSON array; no classifications kept");
            return Ok(BatchOutcome {
                statements,
                classifications: Vec::new(),
            });
        };

        let mut classifications = Vec::with_capacity(items.len());
        for item in &items {
            match validate_item(item, statements.len(), self.config.batch_validation) {
                Ok(classification) => classifications.push(classification),
                Err(reason) => warn!("Dropping classification: {} ({})", reason, item),
            }
        }

        info!(
            "Kept {} of {} classifications",
            classifications.len(),
            items.len()
        );
        Ok(BatchOutcome {
            statements,
            classifications,
        })
    }
}

/// Check one returned item against the statement count and the taxonomy gate
fn validate_item(
    item: &Value,
    statement_count: usize,
    mode: ValidationMode,
) -> Result<Classification, Rejection> {
    let object = item.as_object().ok_or(Rejection::NotAnObject)?;

    let id = object
        .get("sentence_id")
        .and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok())))
        .ok_or(Rejection::MissingField("sentence_id"))?;
    let domain_label = object
        .get("domain")
        .and_then(Value::as_str)
        .ok_or(Rejection::MissingField("domain"))?;
    let subdomain = object
        .get("subdomain")
        .and_then(Value::as_str)
        .ok_or(Rejection::MissingField("subdomain"))?;

    let domain = Domain::from_label(domain_label)
        .filter(|_| mode.admits_domain(domain_label))
        .ok_or_else(|| Rejection::UnknownDomain(domain_label.to_string()))?;

    if !mode.admits_subdomain(subdomain) {
        return Err(Rejection::UnknownSubdomain(subdomain.to_string()));
    }

    let classification = Classification {
        statement_index: usize::try_from(id).map_err(|_| Rejection::OutOfRange(id))?,
        domain,
        subdomain: subdomain.to_string(),
    };
    if !classification.is_in_range(statement_count) {
        return Err(Rejection::OutOfRange(id));
    }
    Ok(classification)
}
