//! Markdown output formatting.

use crate::models::{BatchResult, PaperResult, pubmed_url};

/// Format a batch as a Markdown report.
#[must_use]
pub fn format_batch_markdown(batch: &BatchResult) -> String {
    let mut output = format!(
        "# {} ({} papers)\n\n_Generated {}_\n\n",
        batch.query,
        batch.total_processed,
        batch.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if batch.papers.is_empty() {
        output.push_str("No papers found.\n");
        return output;
    }

    for (i, paper) in batch.papers.iter().enumerate() {
        output.push_str(&format_paper_markdown(paper, i + 1));
        output.push_str("\n---\n\n");
    }

    output
}

/// Format a single summarized paper as Markdown.
#[must_use]
pub fn format_paper_markdown(paper: &PaperResult, index: usize) -> String {
    let mut output = format!("## {}. {}\n\n", index, paper.title_or_default());

    if !paper.authors.is_empty() {
        output.push_str(&format!("**Authors**: {}\n\n", paper.authors.join(", ")));
    }

    let mut meta = vec![format!("**PMID**: [{}]({})", paper.paper_id, pubmed_url(&paper.paper_id))];
    if let Some(date) = &paper.pub_date {
        meta.push(format!("**Published**: {date}"));
    }
    if let Some(doi) = &paper.doi_link {
        meta.push(format!("[DOI]({doi})"));
    }
    meta.push(format!("**Confidence**: {}", paper.confidence_score));
    output.push_str(&format!("{}\n\n", meta.join(" | ")));

    let summary = &paper.summary;
    if summary.is_empty() {
        output.push_str("_No summary available._\n");
        return output;
    }

    if !summary.key_findings.is_empty() {
        output.push_str("### Key findings\n\n");
        for finding in &summary.key_findings {
            output.push_str(&format!("- {finding}\n"));
        }
        output.push('\n');
    }

    if !summary.methodology.is_empty() {
        output.push_str(&format!("**Methodology**: {}\n\n", summary.methodology));
    }

    if !summary.conclusion.is_empty() {
        output.push_str(&format!("**Conclusion**: {}\n", summary.conclusion));
    }

    output
}
