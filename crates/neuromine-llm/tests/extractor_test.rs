use std::sync::Arc;

use neuromine_llm::{parse_records, CompoundExtractor, ExtractionParams};
use neuromine_test_utils::MockLlmBackend;

#[tokio::test]
async fn test_classify_block_sends_prompt_and_returns_output() {
    let backend = Arc::new(
        MockLlmBackend::new().when("riluzole", r#"{"compound_name": "Riluzole", "evidence_type": "in vivo"}"#),
    );
    let extractor = CompoundExtractor::new(backend.clone(), ExtractionParams::default());

    let out = extractor.classify_block("riluzole reduced excitotoxicity").await;
    let frags = parse_records(out.as_deref());

    assert_eq!(frags.len(), 1);
    assert_eq!(frags[0].name(), Some("Riluzole"));
    assert_eq!(backend.call_count(), 1);
    assert!(backend.prompts()[0].contains("\"riluzole reduced excitotoxicity\""));
}

#[tokio::test]
async fn test_failed_call_is_absent_output() {
    let backend = Arc::new(MockLlmBackend::new().fail_when("timeout"));
    let extractor = CompoundExtractor::new(backend, ExtractionParams::default());

    let out = extractor.classify_block("this one will timeout").await;
    assert_eq!(out, None);
    assert!(parse_records(out.as_deref()).is_empty());
}

#[tokio::test]
async fn test_unmatched_block_gets_sentinel() {
    let backend = Arc::new(MockLlmBackend::new());
    let extractor = CompoundExtractor::new(backend, ExtractionParams::default());

    let out = extractor.classify_block("nothing to see").await;
    assert!(parse_records(out.as_deref()).is_empty());
}
