//! Summary models: per-chunk partials, merged summaries and the batch response.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::Paper;

/// Maximum key findings kept in any summary.
pub const MAX_KEY_FINDINGS: usize = 6;

/// Summary of a single chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialSummary {
    /// Key findings in source order.
    pub key_findings: Vec<String>,

    /// Study design sentence(s).
    pub methodology: String,

    /// Conclusion sentence(s).
    pub conclusion: String,

    /// True when the extractive summarizer produced this partial.
    pub used_fallback: bool,
}

/// Merged summary of one abstract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// At most [`MAX_KEY_FINDINGS`] findings.
    pub key_findings: Vec<String>,

    /// Newline-joined methodology statements.
    pub methodology: String,

    /// Newline-joined conclusions.
    pub conclusion: String,
}

impl Summary {
    /// Whether every field is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.key_findings.is_empty() && self.methodology.is_empty() && self.conclusion.is_empty()
    }
}

impl From<PartialSummary> for Summary {
    fn from(partial: PartialSummary) -> Self {
        let mut key_findings = partial.key_findings;
        key_findings.truncate(MAX_KEY_FINDINGS);
        Self { key_findings, methodology: partial.methodology, conclusion: partial.conclusion }
    }
}

/// How much of a summary came from the generative model.
///
/// Serialized as its numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Confidence {
    /// No abstract, nothing summarized.
    #[default]
    Empty,
    /// At least one chunk used the extractive fallback.
    Fallback,
    /// Every chunk was summarized by the model.
    Generative,
}

impl Confidence {
    /// Numeric score in `[0.0, 1.0]`.
    #[must_use]
    pub const fn score(self) -> f64 {
        match self {
            Self::Empty => 0.0,
            Self::Fallback => 0.6,
            Self::Generative => 0.9,
        }
    }
}

impl Serialize for Confidence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.score())
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.score())
    }
}

/// A paper with its summary, as returned to callers.
#[derive(Debug, Clone, Serialize)]
pub struct PaperResult {
    pub paper_id: String,
    pub title: Option<String>,
    pub r#abstract: String,
    pub authors: Vec<String>,
    pub pub_date: Option<String>,
    pub doi_link: Option<String>,
    pub summary: Summary,
    pub confidence_score: Confidence,
}

impl PaperResult {
    /// Attach a summary to a paper.
    #[must_use]
    pub fn new(paper: Paper, summary: Summary, confidence: Confidence) -> Self {
        Self {
            paper_id: paper.paper_id,
            title: paper.title,
            r#abstract: paper.r#abstract,
            authors: paper.authors,
            pub_date: paper.publication_date,
            doi_link: paper.doi_link,
            summary,
            confidence_score: confidence,
        }
    }

    /// Metadata-only result with an empty summary and zero confidence.
    #[must_use]
    pub fn placeholder(paper: Paper) -> Self {
        Self::new(paper, Summary::default(), Confidence::Empty)
    }

    /// Get the paper title, falling back to "Untitled" if not available.
    #[must_use]
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }
}

/// Response for one query.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub success: bool,
    pub query: String,
    /// Completion time, UTC.
    pub timestamp: DateTime<Utc>,
    pub papers: Vec<PaperResult>,
    pub total_processed: usize,
}

impl BatchResult {
    /// Assemble a successful batch stamped with the current time.
    #[must_use]
    pub fn completed(query: impl Into<String>, papers: Vec<PaperResult>) -> Self {
        Self {
            success: true,
            query: query.into(),
            timestamp: Utc::now(),
            total_processed: papers.len(),
            papers,
        }
    }
}
