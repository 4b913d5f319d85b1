//! Gap analysis results
//!
//! [`GapAnalysis`] is what the model is asked to return. Deserialization is
//! forgiving: common alternative keys are accepted and malformed list items
//! are skipped instead of failing the whole analysis. Leaf fields keep the
//! JSON value the model returned, whatever its type, and are only turned
//! into text when a report is rendered. Unrecognised top-level fields are
//! kept verbatim in `extra`.

use serde::de::{DeserializeOwned, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One discrepancy between the policy and a reference control
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    /// Identifier assigned by the model
    #[serde(default, alias = "id", deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub gap_id: Option<Value>,

    /// What is missing or weak
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,

    /// Control the gap is measured against
    #[serde(default, alias = "reference", deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub nist_reference: Option<Value>,

    /// Severity label, passed through as returned
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub severity: Option<Value>,

    /// Consequence of leaving the gap open
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub impact: Option<Value>,
}

/// Policy text proposed to close the gaps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevisedPolicy {
    /// Opening paragraph
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub introduction: Option<Value>,

    /// Individual policy statements
    #[serde(default, alias = "policy_statements", deserialize_with = "value_list")]
    pub statements: Vec<Value>,

    /// Notes on how the revision maps to the references
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub compliance_notes: Option<Value>,
}

/// One roadmap step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadmapAction {
    /// What to do
    #[serde(default, alias = "description", deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub action: Option<Value>,

    /// When to do it
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub timeline: Option<Value>,

    /// How urgent it is
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Value>,

    /// What it takes
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub resources: Option<Value>,
}

/// Remediation plan in three phases
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roadmap {
    /// Immediate actions
    #[serde(default, deserialize_with = "lenient_items")]
    pub short_term: Vec<RoadmapAction>,

    /// Actions for the coming months
    #[serde(default, deserialize_with = "lenient_items")]
    pub mid_term: Vec<RoadmapAction>,

    /// Longer-horizon actions
    #[serde(default, deserialize_with = "lenient_items")]
    pub long_term: Vec<RoadmapAction>,
}

impl Roadmap {
    /// Phases in display order, with their report headings
    pub fn phases(&self) -> [(&'static str, &[RoadmapAction]); 3] {
        [
            ("SHORT-TERM (0-3 months)", self.short_term.as_slice()),
            ("MID-TERM (3-6 months)", self.mid_term.as_slice()),
            ("LONG-TERM (6-12 months)", self.long_term.as_slice()),
        ]
    }
}

/// The model's analysis of one subdomain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapAnalysis {
    /// Identified gaps
    #[serde(default, alias = "gaps", deserialize_with = "lenient_items")]
    pub gap_analysis: Vec<Gap>,

    /// Proposed revision
    #[serde(default, deserialize_with = "lenient_object", skip_serializing_if = "Option::is_none")]
    pub revised_policy: Option<RevisedPolicy>,

    /// Proposed remediation plan
    #[serde(
        default,
        alias = "roadmap",
        deserialize_with = "lenient_object",
        skip_serializing_if = "Option::is_none"
    )]
    pub implementation_roadmap: Option<Roadmap>,

    /// Model-reported confidence, verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Value>,

    /// Any other top-level fields the model returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields owned by [`GapResult`]; the model's copies are discarded
const RESERVED_FIELDS: [&str; 6] = [
    "domain",
    "subdomain",
    "references_count",
    "references_used",
    "error",
    "raw_response",
];

impl GapAnalysis {
    /// Build from a parsed model object, dropping fields the result owns
    pub fn from_object(mut object: Map<String, Value>) -> Result<Self, serde_json::Error> {
        for key in RESERVED_FIELDS {
            object.remove(key);
        }
        serde_json::from_value(Value::Object(object))
    }
}

/// A reference control cited as provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceUsed {
    /// Corpus identifier
    pub id: String,
    /// Originating document
    pub source: String,
    /// `null` for exact-mode retrieval
    pub similarity: Option<f64>,
}

/// A successful analysis with provenance attached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapResult {
    /// Domain analyzed
    pub domain: String,
    /// Subdomain analyzed
    pub subdomain: String,
    /// The model's analysis
    #[serde(flatten)]
    pub analysis: GapAnalysis,
    /// Reference controls supplied to the model
    pub references_count: usize,
    /// The first supplied references
    pub references_used: Vec<ReferenceUsed>,
}

/// An analysis that produced no usable result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapFailure {
    /// Domain analyzed
    pub domain: String,
    /// Subdomain analyzed
    pub subdomain: String,
    /// Why the analysis failed
    pub error: String,
    /// Raw model output, when the failure was a parse failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

/// Outcome of one subdomain analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GapOutcome {
    /// Partial result carrying only the error
    Failed(GapFailure),
    /// Parsed analysis
    Completed(GapResult),
}

impl GapOutcome {
    /// A failed outcome
    pub fn failed(
        domain: impl Into<String>,
        subdomain: impl Into<String>,
        error: impl Into<String>,
        raw_response: Option<String>,
    ) -> Self {
        GapOutcome::Failed(GapFailure {
            domain: domain.into(),
            subdomain: subdomain.into(),
            error: error.into(),
            raw_response,
        })
    }

    /// Domain analyzed
    pub fn domain(&self) -> &str {
        match self {
            GapOutcome::Failed(f) => &f.domain,
            GapOutcome::Completed(r) => &r.domain,
        }
    }

    /// Subdomain analyzed
    pub fn subdomain(&self) -> &str {
        match self {
            GapOutcome::Failed(f) => &f.subdomain,
            GapOutcome::Completed(r) => &r.subdomain,
        }
    }

    /// The error message, for failed outcomes
    pub fn error(&self) -> Option<&str> {
        match self {
            GapOutcome::Failed(f) => Some(&f.error),
            GapOutcome::Completed(_) => None,
        }
    }
}

/// Analysis of one domain chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DomainAnalysis {
    /// One analysis per subdomain, in chunk order
    Subdomains {
        /// Per-subdomain outcomes
        subdomains_analysis: Vec<GapOutcome>,
    },
    /// The chunk had at most one subdomain
    Single(GapOutcome),
}

/// Gap analysis for a whole document, keyed by domain in chunk order
///
/// Serializes as a JSON object `{domain: analysis}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GapReport {
    domains: Vec<(String, DomainAnalysis)>,
}

impl GapReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the analysis for `domain`
    pub fn push(&mut self, domain: impl Into<String>, analysis: DomainAnalysis) {
        self.domains.push((domain.into(), analysis));
    }

    /// Analysis for `domain`, if present
    pub fn get(&self, domain: &str) -> Option<&DomainAnalysis> {
        self.domains
            .iter()
            .find(|(d, _)| d == domain)
            .map(|(_, analysis)| analysis)
    }

    /// Domains and their analyses, in chunk order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DomainAnalysis)> {
        self.domains.iter().map(|(d, a)| (d.as_str(), a))
    }

    /// Number of analyzed domains
    pub fn len(&self) -> usize {
        self.domains.len()
    }

    /// Whether no domain was analyzed
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl Serialize for GapReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.domains.len()))?;
        for (domain, analysis) in &self.domains {
            map.serialize_entry(domain, analysis)?;
        }
        map.end()
    }
}

/// Text form of a leaf value: strings unquoted, anything else as JSON
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.filter(|v| !v.is_null()))
}

fn value_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items.into_iter().filter(|v| !v.is_null()).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other],
    })
}

fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![other],
    };
    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

fn lenient_object<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(value @ Value::Object(_)) => serde_json::from_value(value).ok(),
        _ => None,
    })
}
