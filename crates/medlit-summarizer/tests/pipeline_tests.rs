//! End-to-end pipeline tests against mocked E-utilities and Ollama.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use medlit_summarizer::client::PubMedClient;
use medlit_summarizer::config::Config;
use medlit_summarizer::error::{GenerativeResult, PipelineError};
use medlit_summarizer::models::{Confidence, MAX_KEY_FINDINGS, SearchRequest};
use medlit_summarizer::pipeline::Pipeline;
use medlit_summarizer::summarize::{AbstractSummarizer, Chunker, GenerativeSummarizer};

use common::{ESEARCH, MODEL_REPLY, OLLAMA_GENERATE, OLLAMA_TAGS, TRIAL_ABSTRACT, hits, mount_eutils, mount_ollama};

fn setup_pipeline(server: &MockServer) -> Pipeline {
    Pipeline::from_config(Config::for_testing(&server.uri())).unwrap()
}

#[tokio::test]
async fn test_generative_summaries_score_high() {
    let server = MockServer::start().await;
    mount_eutils(&server, &[("1", TRIAL_ABSTRACT), ("2", "")]).await;
    mount_ollama(&server, MODEL_REPLY).await;

    let batch = setup_pipeline(&server).process("relapse therapy", 2).await.unwrap();

    assert!(batch.success);
    assert_eq!(batch.query, "relapse therapy");
    assert_eq!(batch.total_processed, 2);

    let summarized = &batch.papers[0];
    assert_eq!(summarized.confidence_score, Confidence::Generative);
    assert_eq!(summarized.summary.key_findings, vec!["Relapse fell by 45%"]);
    assert_eq!(summarized.summary.methodology, "Randomized double-blind trial");

    let empty = &batch.papers[1];
    assert_eq!(empty.confidence_score, Confidence::Empty);
    assert!(empty.summary.is_empty());
    assert_eq!(empty.title.as_deref(), Some("Paper 2"));

    // One probe per batch, one generation per non-empty chunk.
    assert_eq!(hits(&server, OLLAMA_TAGS).await, 1);
    assert_eq!(hits(&server, OLLAMA_GENERATE).await, 1);
}

#[tokio::test]
async fn test_unreachable_model_uses_fallback_without_calls() {
    let server = MockServer::start().await;
    mount_eutils(&server, &[("1", TRIAL_ABSTRACT)]).await;
    Mock::given(method("GET"))
        .and(path(OLLAMA_TAGS))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(OLLAMA_GENERATE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": MODEL_REPLY})))
        .expect(0)
        .mount(&server)
        .await;

    let batch = setup_pipeline(&server).process("relapse therapy", 1).await.unwrap();
    let paper = &batch.papers[0];

    assert_eq!(paper.confidence_score, Confidence::Fallback);
    assert!(paper.summary.methodology.contains("randomized"));
    assert!(paper.summary.conclusion.contains("conclude"));
    assert!(paper.summary.key_findings.iter().any(|f| f.contains("45% reduction")));
}

#[tokio::test]
async fn test_unusable_model_output_falls_back() {
    let server = MockServer::start().await;
    mount_eutils(&server, &[("1", TRIAL_ABSTRACT)]).await;
    mount_ollama(&server, "Sorry, I can only answer in prose.").await;

    let batch = setup_pipeline(&server).process("relapse therapy", 1).await.unwrap();

    assert_eq!(batch.papers[0].confidence_score, Confidence::Fallback);
    assert!(!batch.papers[0].summary.key_findings.is_empty());
}

#[tokio::test]
async fn test_model_reply_wrapped_in_prose_is_accepted() {
    let server = MockServer::start().await;
    mount_eutils(&server, &[("1", TRIAL_ABSTRACT)]).await;
    mount_ollama(&server, &format!("Here you go:\n```json\n{MODEL_REPLY}\n```")).await;

    let batch = setup_pipeline(&server).process("relapse therapy", 1).await.unwrap();
    assert_eq!(batch.papers[0].confidence_score, Confidence::Generative);
}

#[tokio::test]
async fn test_long_abstract_findings_are_capped() {
    let server = MockServer::start().await;
    let long_abstract = "Patients receiving the drug had a significant reduction in mortality risk. ".repeat(60);
    mount_eutils(&server, &[("1", long_abstract.as_str())]).await;
    mount_ollama(
        &server,
        r#"{"key_findings": ["a", "b", "c", "d"], "methodology": "Cohort", "conclusion": "Benefit"}"#,
    )
    .await;

    let batch = setup_pipeline(&server).process("mortality", 1).await.unwrap();
    let paper = &batch.papers[0];

    assert!(hits(&server, OLLAMA_GENERATE).await > 1, "abstract should span several chunks");
    assert_eq!(paper.summary.key_findings.len(), MAX_KEY_FINDINGS);
    assert_eq!(paper.confidence_score, Confidence::Generative);
}

#[tokio::test]
async fn test_retrieval_failure_propagates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ESEARCH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = setup_pipeline(&server).process("anything", 3).await.unwrap_err();
    assert!(matches!(err, PipelineError::Client(_)), "got {err:?}");
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_request_validation_happens_before_retrieval() {
    let server = MockServer::start().await;
    let pipeline = setup_pipeline(&server);

    let err = pipeline.process_request(&SearchRequest::new("x", 5)).await.unwrap_err();
    assert!(err.is_client_error());

    let err = pipeline.process_request(&SearchRequest::new("statins", 11)).await.unwrap_err();
    assert!(err.is_client_error());

    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_empty_search_skips_probe() {
    let server = MockServer::start().await;
    mount_eutils(&server, &[]).await;
    mount_ollama(&server, MODEL_REPLY).await;

    let batch = setup_pipeline(&server).process("nothing matches", 5).await.unwrap();

    assert!(batch.papers.is_empty());
    assert_eq!(batch.total_processed, 0);
    assert_eq!(hits(&server, OLLAMA_TAGS).await, 0);
}

// =============================================================================
// Per-paper isolation
// =============================================================================

/// Generates a good reply, but panics on abstracts mentioning "PANIC".
struct Brittle;

#[async_trait]
impl GenerativeSummarizer for Brittle {
    fn model(&self) -> &str {
        "brittle"
    }

    async fn list_models(&self) -> GenerativeResult<Vec<String>> {
        Ok(vec!["brittle".to_string()])
    }

    async fn generate(&self, prompt: &str) -> GenerativeResult<String> {
        assert!(!prompt.contains("PANIC"), "model crashed on this prompt");
        Ok(MODEL_REPLY.to_string())
    }
}

#[tokio::test]
async fn test_panicking_paper_keeps_metadata_and_batch_continues() {
    let server = MockServer::start().await;
    mount_eutils(
        &server,
        &[
            ("1", "This abstract will PANIC the backend during generation."),
            ("2", TRIAL_ABSTRACT),
        ],
    )
    .await;

    let config = Config::for_testing(&server.uri());
    let backend: Arc<dyn GenerativeSummarizer> = Arc::new(Brittle);
    let summarizer = AbstractSummarizer::new(Chunker::default(), Some(backend), Duration::from_secs(45));
    let pipeline = Pipeline::new(PubMedClient::new(config).unwrap(), summarizer);

    let batch = pipeline.process("fragile", 2).await.unwrap();

    assert_eq!(batch.total_processed, 2);
    let failed = &batch.papers[0];
    assert_eq!(failed.paper_id, "1");
    assert_eq!(failed.title.as_deref(), Some("Paper 1"));
    assert_eq!(failed.doi_link.as_deref(), Some("https://doi.org/10.1000/1"));
    assert!(failed.summary.is_empty());
    assert_eq!(failed.confidence_score, Confidence::Empty);

    assert_eq!(batch.papers[1].confidence_score, Confidence::Generative);
}
