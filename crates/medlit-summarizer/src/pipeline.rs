//! Query pipeline: retrieve papers, then summarize each one in isolation.
//!
//! Retrieval failures end the batch. Summarization never does: a failing or
//! panicking paper is replaced by its metadata with an empty summary.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{info, instrument, warn};

use crate::client::PubMedClient;
use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{BatchResult, Paper, PaperResult, SearchRequest};
use crate::summarize::{AbstractSummarizer, GenerativeSummarizer, OllamaClient};

/// Outcome of summarizing a single paper.
#[derive(Debug)]
pub enum PaperOutcome {
    /// Summary produced (possibly by the extractive fallback).
    Summarized(PaperResult),
    /// Summarization aborted; carries the paper back with the reason.
    Failed {
        paper: Paper,
        reason: String,
    },
}

impl PaperOutcome {
    /// Collapse into a result, substituting the placeholder on failure.
    #[must_use]
    pub fn into_result(self) -> PaperResult {
        match self {
            Self::Summarized(result) => result,
            Self::Failed { paper, reason } => {
                warn!(paper_id = %paper.paper_id, reason = %reason, "Paper summarization failed, keeping metadata only");
                PaperResult::placeholder(paper)
            }
        }
    }
}

/// Retrieval plus summarization for one query at a time.
#[derive(Debug, Clone)]
pub struct Pipeline {
    client: PubMedClient,
    summarizer: AbstractSummarizer,
}

impl Pipeline {
    /// Create a pipeline from its parts.
    #[must_use]
    pub const fn new(client: PubMedClient, summarizer: AbstractSummarizer) -> Self {
        Self { client, summarizer }
    }

    /// Build the client and an Ollama-backed summarizer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be built or the chunk settings are invalid.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let backend: Arc<dyn GenerativeSummarizer> = Arc::new(OllamaClient::new(&config)?);
        let summarizer = AbstractSummarizer::from_config(&config, Some(backend))?;
        let client = PubMedClient::new(config)?;
        Ok(Self::new(client, summarizer))
    }

    /// The retrieval client.
    #[must_use]
    pub const fn client(&self) -> &PubMedClient {
        &self.client
    }

    /// The abstract summarizer.
    #[must_use]
    pub const fn summarizer(&self) -> &AbstractSummarizer {
        &self.summarizer
    }

    /// Validate a boundary request, then process it.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Validation`] for bad input, otherwise as [`Self::process`].
    pub async fn process_request(&self, request: &SearchRequest) -> PipelineResult<BatchResult> {
        let count = request.validate()?;
        self.process(&request.query, i64::from(count)).await
    }

    /// Search, then summarize every retrieved paper in order.
    ///
    /// # Errors
    ///
    /// Returns an error only when retrieval fails or the query is blank.
    #[instrument(skip(self), fields(papers = tracing::field::Empty))]
    pub async fn process(&self, query: &str, count: i64) -> PipelineResult<BatchResult> {
        let papers = self.client.search(query, count).await.map_err(PipelineError::from)?;
        tracing::Span::current().record("papers", papers.len());

        let use_generative = !papers.is_empty() && self.summarizer.probe().await;
        info!(use_generative, "Summarizing papers");

        let mut results = Vec::with_capacity(papers.len());
        for paper in papers {
            let outcome = self.summarize_paper(paper, use_generative).await;
            results.push(outcome.into_result());
        }

        Ok(BatchResult::completed(query, results))
    }

    /// Summarize one paper, converting a panic into [`PaperOutcome::Failed`].
    pub async fn summarize_paper(&self, paper: Paper, use_generative: bool) -> PaperOutcome {
        let attempt = AssertUnwindSafe(self.summarizer.summarize(&paper.r#abstract, use_generative))
            .catch_unwind()
            .await;

        match attempt {
            Ok((summary, confidence)) => {
                PaperOutcome::Summarized(PaperResult::new(paper, summary, confidence))
            }
            Err(panic) => PaperOutcome::Failed { paper, reason: panic_message(panic.as_ref()) },
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "panic during summarization".to_string())
}
