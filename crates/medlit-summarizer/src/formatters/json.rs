//! JSON output formatting.

use crate::models::BatchResult;

/// Pretty-print a batch result.
///
/// # Errors
///
/// Returns error if serialization fails.
pub fn format_batch_json(batch: &BatchResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(batch)
}
