//! End-to-end tests for segmentation, classification and aggregation

use gapscope_classifier::{
    aggregate, build_chunker, segment, AggregationOrder, BatchClassifier, ClassifierError,
    PipelineConfig, Strategy, BATCH_STAGE,
};
use gapscope_domain::Domain;
use gapscope_llm::{MemoryAudit, MockProvider, NullAudit};
use proptest::prelude::*;
use std::sync::Arc;

const POLICY: &str = "Patch Management:\n- Systems must be updated monthly.\nAccess Control:\nOnly admins may access production.";

#[test]
fn test_scenario_two_statements_two_chunks() {
    let llm = MockProvider::new(
        r#"[{"sentence_id":1,"domain":"Patch Management","subdomain":"Patch Management"},
            {"sentence_id":2,"domain":"Risk Management","subdomain":"Access Control Policy"}]"#,
    );
    let classifier = BatchClassifier::new(Arc::new(llm), PipelineConfig::default());

    let outcome = classifier.classify_batch(POLICY).unwrap();
    assert_eq!(outcome.statements.len(), 2);

    let chunks = aggregate(
        &outcome.statements,
        &outcome.classifications,
        AggregationOrder::Response,
    )
    .unwrap();

    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].domain, "Patch Management");
    assert_eq!(chunks[0].text, "Systems must be updated monthly.");
    assert_eq!(chunks[0].subdomains, vec!["Patch Management"]);
    assert_eq!(chunks[1].domain, "Risk Management");
    assert_eq!(chunks[1].text, "Only admins may access production.");
    assert_eq!(chunks[1].subdomains, vec!["Access Control Policy"]);
}

#[test]
fn test_scenario_nonexistent_domain_survives_nowhere() {
    // A bare object, as well as the same item inside an array
    for response in [
        r#"{"domain":"Nonexistent Domain","subdomain":"X"}"#,
        r#"[{"sentence_id":1,"domain":"Nonexistent Domain","subdomain":"X"}]"#,
    ] {
        let classifier =
            BatchClassifier::new(Arc::new(MockProvider::new(response)), PipelineConfig::default());
        let outcome = classifier.classify_batch(POLICY).unwrap();
        assert!(outcome.classifications.is_empty());
    }
}

#[test]
fn test_chunker_skips_prompt_for_empty_document() {
    let llm = Arc::new(MockProvider::new("[]"));
    let chunker = build_chunker(llm.clone(), Arc::new(NullAudit), PipelineConfig::default()).unwrap();

    assert!(matches!(chunker.chunk("Scope:\n"), Err(ClassifierError::EmptyInput)));
    assert_eq!(llm.call_count(), 0);
}

#[test]
fn test_document_chunker_skips_prompt_for_heading_only_text() {
    let llm = Arc::new(MockProvider::new(
        r#"{"Risk Management": {"text": ["Scope"], "subdomains": []}}"#,
    ));
    let config = PipelineConfig {
        strategy: Strategy::Document,
        ..PipelineConfig::default()
    };
    let chunker = build_chunker(llm.clone(), Arc::new(NullAudit), config).unwrap();

    assert!(matches!(chunker.chunk("Scope:\n"), Err(ClassifierError::EmptyInput)));
    assert_eq!(llm.call_count(), 0);
}

#[test]
fn test_oversized_input_rejected() {
    let config = PipelineConfig {
        max_text_length: 10,
        ..PipelineConfig::default()
    };
    let classifier = BatchClassifier::new(Arc::new(MockProvider::new("[]")), config);
    assert!(matches!(
        classifier.classify_batch(POLICY),
        Err(ClassifierError::TextTooLong(_, 10))
    ));
}

#[test]
fn test_chunk_records_audit_once_per_call() {
    let audit = Arc::new(MemoryAudit::new());
    let chunker = build_chunker(
        Arc::new(MockProvider::new("garbage")),
        audit.clone(),
        PipelineConfig::default(),
    )
    .unwrap();

    let chunks = chunker.chunk(POLICY).unwrap();
    assert!(chunks.is_empty());
    assert_eq!(audit.entries().len(), 1);
    assert_eq!(audit.entries()[0].stage, BATCH_STAGE);
}

fn policy_with(n: usize) -> String {
    (1..=n).map(|i| format!("- Control statement number {}.\n", i)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_batch_is_capped_prefix(n in 1usize..30, cap in 1usize..12) {
        let text = policy_with(n);
        let config = PipelineConfig { max_statements_per_batch: cap, ..PipelineConfig::default() };
        let classifier = BatchClassifier::new(Arc::new(MockProvider::new("[]")), config);

        let outcome = classifier.classify_batch(&text).unwrap();
        let full = segment(&text);

        prop_assert!(outcome.statements.len() <= cap);
        prop_assert_eq!(outcome.statements.len(), n.min(cap));
        prop_assert_eq!(&outcome.statements[..], &full[..outcome.statements.len()]);
    }

    #[test]
    fn prop_surviving_domains_are_valid(
        labels in proptest::collection::vec(
            prop_oneof![
                Just("Patch Management".to_string()),
                Just("Risk Management".to_string()),
                Just("Access Control Policy".to_string()),
                Just("ISMS".to_string()),
                "[A-Za-z ]{1,20}",
            ],
            1..8,
        )
    ) {
        let items: Vec<String> = labels
            .iter()
            .enumerate()
            .map(|(i, d)| format!(r#"{{"sentence_id":{},"domain":"{}","subdomain":"Encryption"}}"#, i + 1, d))
            .collect();
        let response = format!("[{}]", items.join(","));
        let classifier = BatchClassifier::new(Arc::new(MockProvider::new(response)), PipelineConfig::default());

        let outcome = classifier.classify_batch(&policy_with(8)).unwrap();
        for c in &outcome.classifications {
            prop_assert!(Domain::ALL.contains(&c.domain));
        }
        let expected = labels.iter().filter(|d| Domain::from_label(d).is_some()).count();
        prop_assert_eq!(outcome.classifications.len(), expected);
    }
}
