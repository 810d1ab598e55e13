//! Abstract summarization.
//!
//! An abstract is split into overlapping chunks. Each chunk goes to the
//! generative backend while the per-abstract budget lasts and the backend was
//! reachable at probe time; otherwise, or on any generative failure, the
//! extractive summarizer handles it. Partials are merged into one summary whose
//! confidence records whether any chunk fell back.

pub mod chunker;
pub mod extractive;
pub mod generative;
pub mod merge;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

pub use chunker::{Chunk, Chunker, Chunks, InvalidChunking};
pub use extractive::ExtractiveSummarizer;
pub use generative::{
    DecodeOutcome, GenerativeHealth, GenerativeSummarizer, OllamaClient, build_prompt,
    decode_summary, health_report,
};
pub use merge::merge;

use crate::config::Config;
use crate::models::{Confidence, PartialSummary, Summary};

/// Chunk, summarize and merge one abstract at a time.
#[derive(Clone)]
pub struct AbstractSummarizer {
    chunker: Chunker,
    generative: Option<Arc<dyn GenerativeSummarizer>>,
    extractive: ExtractiveSummarizer,
    budget: Duration,
}

impl AbstractSummarizer {
    /// Create a summarizer. `None` for `generative` means extractive only.
    #[must_use]
    pub fn new(
        chunker: Chunker,
        generative: Option<Arc<dyn GenerativeSummarizer>>,
        budget: Duration,
    ) -> Self {
        Self { chunker, generative, extractive: ExtractiveSummarizer, budget }
    }

    /// Build from configuration around the given backend.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidChunking`] if the configured chunk overlap is not smaller
    /// than the chunk size.
    pub fn from_config(
        config: &Config,
        generative: Option<Arc<dyn GenerativeSummarizer>>,
    ) -> Result<Self, InvalidChunking> {
        let chunker = Chunker::new(config.chunk_size, config.chunk_overlap)?;
        Ok(Self::new(chunker, generative, config.summary_budget))
    }

    /// The generative backend, if any.
    #[must_use]
    pub fn generative(&self) -> Option<&Arc<dyn GenerativeSummarizer>> {
        self.generative.as_ref()
    }

    /// Whether the generative backend is configured and answering.
    pub async fn probe(&self) -> bool {
        match &self.generative {
            Some(backend) => {
                let reachable = backend.is_reachable().await;
                if !reachable {
                    warn!(model = backend.model(), "Inference service unreachable, using extractive summaries");
                }
                reachable
            }
            None => false,
        }
    }

    /// Summarize one abstract.
    ///
    /// Blank text yields the empty summary with [`Confidence::Empty`]. With
    /// `use_generative == false` every chunk goes to the extractive summarizer.
    pub async fn summarize(&self, text: &str, use_generative: bool) -> (Summary, Confidence) {
        if text.trim().is_empty() {
            return (Summary::default(), Confidence::Empty);
        }

        let started = Instant::now();
        let mut partials = Vec::new();
        let mut budget_logged = false;

        for chunk in self.chunker.split(text) {
            let within_budget = started.elapsed() <= self.budget;
            if use_generative && !within_budget && !budget_logged {
                info!(
                    chunk = chunk.index,
                    budget_secs = self.budget.as_secs_f64(),
                    "Summary budget exhausted, remaining chunks use extractive fallback"
                );
                budget_logged = true;
            }

            let backend = self.generative.as_deref().filter(|_| use_generative && within_budget);
            partials.push(self.summarize_chunk(chunk, backend).await);
        }

        let (summary, confidence) = merge(&partials);
        debug!(chunks = partials.len(), confidence = %confidence, "Abstract summarized");
        (summary, confidence)
    }

    async fn summarize_chunk(
        &self,
        chunk: Chunk<'_>,
        backend: Option<&dyn GenerativeSummarizer>,
    ) -> PartialSummary {
        let Some(backend) = backend else {
            return self.extractive.summarize(chunk.text);
        };

        match backend.generate(&build_prompt(chunk.text)).await {
            Ok(raw) => match decode_summary(&raw) {
                DecodeOutcome::Parsed(partial) => partial,
                DecodeOutcome::Unparseable => {
                    warn!(chunk = chunk.index, "Unparseable model output, using extractive fallback");
                    self.extractive.summarize(chunk.text)
                }
            },
            Err(err) => {
                warn!(chunk = chunk.index, error = %err, "Generation failed, using extractive fallback");
                self.extractive.summarize(chunk.text)
            }
        }
    }
}

impl std::fmt::Debug for AbstractSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AbstractSummarizer")
            .field("chunker", &self.chunker)
            .field("model", &self.generative.as_ref().map(|g| g.model().to_string()))
            .field("budget", &self.budget)
            .finish()
    }
}
