//! Paper model and the E-utilities esummary wire schema it is merged from.

use serde::{Deserialize, Serialize};

/// A retrieved PubMed paper.
///
/// Built once by the retrieval client and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paper {
    /// PubMed identifier (PMID).
    pub paper_id: String,

    /// Article title.
    #[serde(default)]
    pub title: Option<String>,

    /// Abstract text, empty when PubMed has none.
    #[serde(default)]
    pub r#abstract: String,

    /// Author names in publication order.
    #[serde(default)]
    pub authors: Vec<String>,

    /// Publication date as reported by PubMed (free-form, e.g. "2023 Mar 14").
    #[serde(default)]
    pub publication_date: Option<String>,

    /// Canonical `https://doi.org/...` link.
    #[serde(default)]
    pub doi_link: Option<String>,
}

impl Paper {
    /// Get the paper title, falling back to "Untitled" if not available.
    #[must_use]
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }
}

/// PubMed landing page for a PMID.
#[must_use]
pub fn pubmed_url(pmid: &str) -> String {
    format!("https://pubmed.ncbi.nlm.nih.gov/{pmid}/")
}

/// Render a bare DOI as a resolver link.
#[must_use]
pub fn doi_link(doi: &str) -> String {
    format!("https://doi.org/{}", doi.trim())
}

/// One document from the esummary `result` map.
///
/// Every field is optional; PubMed omits or nulls them freely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryDoc {
    /// Article title.
    #[serde(default)]
    pub title: Option<String>,

    /// Author entries.
    #[serde(default)]
    pub authors: Option<Vec<SummaryAuthor>>,

    /// Publication date.
    #[serde(default)]
    pub pubdate: Option<String>,

    /// External identifiers (doi, pii, pmc, ...).
    #[serde(default)]
    pub articleids: Option<Vec<ArticleId>>,
}

impl SummaryDoc {
    /// Author names, skipping entries without one.
    #[must_use]
    pub fn author_names(&self) -> Vec<String> {
        self.authors
            .iter()
            .flatten()
            .filter_map(|a| a.name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from)
            .collect()
    }

    /// The first DOI among the article ids.
    #[must_use]
    pub fn doi(&self) -> Option<&str> {
        self.articleids
            .iter()
            .flatten()
            .find(|id| id.idtype.as_deref() == Some("doi"))
            .and_then(|id| id.value.as_deref())
            .filter(|v| !v.trim().is_empty())
    }
}

/// Author entry in an esummary document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryAuthor {
    /// Display name (e.g. "Smith J").
    #[serde(default)]
    pub name: Option<String>,
}

/// External identifier in an esummary document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleId {
    /// Identifier kind.
    #[serde(default)]
    pub idtype: Option<String>,

    /// Identifier value.
    #[serde(default)]
    pub value: Option<String>,
}

/// Top-level esummary response (`retmode=json`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryResponse {
    /// Documents keyed by PMID, plus a `uids` list.
    #[serde(default)]
    pub result: serde_json::Map<String, serde_json::Value>,
}

impl SummaryResponse {
    /// Look up the document for one PMID, ignoring entries that do not decode.
    #[must_use]
    pub fn doc(&self, pmid: &str) -> Option<SummaryDoc> {
        let value = self.result.get(pmid)?;
        serde_json::from_value(value.clone()).ok()
    }
}
