//! Input models for the pipeline entrypoint.

use serde::{Deserialize, Serialize};

use crate::config::api;
use crate::error::{PipelineError, PipelineResult};

/// Shortest accepted query at the request boundary.
pub const MIN_QUERY_CHARS: usize = 2;

/// Summarize-search request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text literature query (e.g., "metformin cardiovascular outcomes").
    pub query: String,

    /// Papers to retrieve, 1 through 10.
    #[serde(default = "default_num_papers")]
    pub num_papers: i64,
}

fn default_num_papers() -> i64 {
    i64::from(api::DEFAULT_PAPERS)
}

impl SearchRequest {
    /// Create a request.
    #[must_use]
    pub fn new(query: impl Into<String>, num_papers: i64) -> Self {
        Self { query: query.into(), num_papers }
    }

    /// Validate and return the paper count as an unsigned value.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a short query or an out-of-range count.
    pub fn validate(&self) -> PipelineResult<u32> {
        if self.query.trim().chars().count() < MIN_QUERY_CHARS {
            return Err(PipelineError::validation(
                "query",
                format!("must be at least {MIN_QUERY_CHARS} characters"),
            ));
        }

        let range = i64::from(api::MIN_PAPERS)..=i64::from(api::MAX_PAPERS);
        if !range.contains(&self.num_papers) {
            return Err(PipelineError::validation(
                "num_papers",
                format!("must be between {} and {}", api::MIN_PAPERS, api::MAX_PAPERS),
            ));
        }

        Ok(self.num_papers as u32)
    }
}
