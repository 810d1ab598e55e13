//! Data models for papers, summaries and pipeline inputs.
//!
//! Wire types for E-utilities responses use `#[serde(default)]` throughout,
//! since PubMed omits fields freely.

mod inputs;
mod paper;
mod summary;

pub use inputs::{MIN_QUERY_CHARS, SearchRequest};
pub use paper::{ArticleId, Paper, SummaryAuthor, SummaryDoc, SummaryResponse, doi_link, pubmed_url};
pub use summary::{
    BatchResult, Confidence, MAX_KEY_FINDINGS, PaperResult, PartialSummary, Summary,
};
