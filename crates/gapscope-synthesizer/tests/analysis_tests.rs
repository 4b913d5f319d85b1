//! End-to-end gap analysis over a real reference store

use gapscope_domain::DomainChunk;
use gapscope_llm::{MemoryAudit, MockProvider};
use gapscope_store::corpus::parse_corpus;
use gapscope_store::{ingest, MockEmbeddingModel, ReferenceStore};
use gapscope_synthesizer::{
    format_report, Analyzer, DomainAnalysis, GapOutcome, GapSynthesizer, Retriever,
    SynthesizerConfig, GAP_STAGE, PARSE_FAILURE,
};
use std::sync::Arc;

const CORPUS: &str = r#"[
  {"id": "PM-1", "text": "Security patches are applied to all systems monthly.",
   "domain": "Patch Management", "subdomain": "Patch Management", "source_file": "sp800-40.pdf"},
  {"id": "RA-1", "text": "Risk assessments are performed annually and after major changes.",
   "domain": "Risk Management", "subdomain": "Risk Assessment Policy", "source_file": "sp800-30.pdf"}
]"#;

const PATCH_ANSWER: &str = r#"```json
{
  "gap_analysis": [
    {"gap_id": "GAP-1", "description": "No emergency patch window", "nist_reference": "PM-1", "severity": "High", "impact": "Exploitable systems"}
  ],
  "revised_policy": {"introduction": "All systems are patched on a defined schedule.", "statements": ["Critical patches are applied within 14 days."]},
  "implementation_roadmap": {"short_term": [{"action": "Define patch SLAs", "priority": "High", "timeline": "1 month"}]},
  "confidence": 0.8
}
```"#;

fn analyzer(llm: MockProvider, audit: Arc<MemoryAudit>) -> Analyzer<MockProvider, ReferenceStore, MockEmbeddingModel> {
    let store = ReferenceStore::in_memory(64).unwrap();
    let embedder = MockEmbeddingModel::new(64);
    ingest(&store, &embedder, parse_corpus(CORPUS).unwrap()).unwrap();

    let config = SynthesizerConfig::default();
    Analyzer::new(
        GapSynthesizer::new(Arc::new(llm), config.provenance_limit).with_audit(audit),
        Retriever::new(Arc::new(store), Arc::new(embedder)),
        config,
    )
    .unwrap()
}

fn chunk(domain: &str, text: &str, subdomain: &str) -> DomainChunk {
    let mut chunk = DomainChunk::new(domain);
    chunk.push_text(text);
    chunk.add_subdomain(subdomain);
    chunk
}

#[tokio::test]
async fn test_parse_failure_does_not_block_other_domains() {
    let mut llm = MockProvider::new("Sorry, I could not produce JSON.");
    llm.add_response("Subdomain: Patch Management", PATCH_ANSWER);
    let audit = Arc::new(MemoryAudit::new());
    let analyzer = analyzer(llm, audit.clone());

    let chunks = vec![
        chunk("Patch Management", "Systems must be updated monthly.", "Patch Management"),
        chunk("Risk Management", "Risks are reviewed.", "Risk Assessment Policy"),
    ];
    let report = analyzer.analyze_chunks(&chunks).await;

    let Some(DomainAnalysis::Single(GapOutcome::Completed(patch))) = report.get("Patch Management") else {
        panic!("expected a completed patch analysis");
    };
    assert_eq!(patch.analysis.gap_analysis.len(), 1);
    assert_eq!(patch.references_count, 1);
    assert_eq!(patch.references_used[0].id, "PM-1");
    assert!(patch.references_used[0].similarity.is_some());

    let Some(DomainAnalysis::Single(GapOutcome::Failed(risk))) = report.get("Risk Management") else {
        panic!("expected a failed risk analysis");
    };
    assert_eq!(risk.error, PARSE_FAILURE);
    assert_eq!(risk.raw_response.as_deref(), Some("Sorry, I could not produce JSON."));

    let entries = audit.entries();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e.stage == GAP_STAGE));
}

#[tokio::test]
async fn test_report_renders_analysis_and_errors() {
    let mut llm = MockProvider::new("not json");
    llm.add_response("Subdomain: Patch Management", PATCH_ANSWER);
    let analyzer = analyzer(llm, Arc::new(MemoryAudit::new()));

    let chunks = vec![
        chunk("Patch Management", "Systems must be updated monthly.", "Patch Management"),
        chunk("Risk Management", "Risks are reviewed.", "Risk Assessment Policy"),
    ];
    let report = analyzer.analyze_chunks(&chunks).await;
    let text = format_report(&report);

    assert!(text.contains("DOMAIN: Patch Management"));
    assert!(text.contains("\n  [GAP-1] No emergency patch window"));
    assert!(text.contains("    1. Critical patches are applied within 14 days."));
    assert!(text.contains("    • Define patch SLAs\n      Priority: High | Timeline: 1 month"));
    assert!(text.contains("Subdomain: Risk Assessment Policy\n"));
    assert!(text.contains("ERROR: parse failure"));
    assert!(text.find("DOMAIN: Patch Management") < text.find("DOMAIN: Risk Management"));
}

#[tokio::test]
async fn test_report_json_keeps_chunk_order() {
    let analyzer = analyzer(MockProvider::new(PATCH_ANSWER), Arc::new(MemoryAudit::new()));
    let chunks = vec![
        chunk("Risk Management", "Risks are reviewed.", "Risk Assessment Policy"),
        chunk("Patch Management", "Systems must be updated monthly.", "Patch Management"),
    ];

    let report = analyzer.analyze_chunks(&chunks).await;
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.find("\"Risk Management\"") < json.find("\"Patch Management\""));
    assert!(json.contains("\"references_count\":1"));
}

#[tokio::test]
async fn test_analyze_domain_uses_domain_as_subdomain() {
    let llm = MockProvider::new(PATCH_ANSWER);
    let analyzer = analyzer(llm.clone(), Arc::new(MemoryAudit::new()));

    let outcome = analyzer
        .analyze_domain("Patch Management", "Systems must be updated monthly.")
        .await
        .unwrap();

    assert_eq!(outcome.subdomain(), "Patch Management");
    assert!(outcome.error().is_none());
    assert!(llm.prompts()[0].contains("ID: PM-1"));
}
