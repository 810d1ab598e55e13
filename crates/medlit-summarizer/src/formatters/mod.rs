//! Output formatters for Markdown and JSON.

mod json;
mod markdown;

pub use self::json::*;
pub use markdown::*;

/// Output format for rendered batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON, the same shape the HTTP API returns
    #[default]
    Json,
    /// Human-readable report
    Markdown,
}

impl OutputFormat {
    /// Render a batch in this format.
    ///
    /// # Errors
    ///
    /// Returns error if JSON serialization fails.
    pub fn render(self, batch: &crate::models::BatchResult) -> serde_json::Result<String> {
        match self {
            Self::Json => format_batch_json(batch),
            Self::Markdown => Ok(format_batch_markdown(batch)),
        }
    }
}
