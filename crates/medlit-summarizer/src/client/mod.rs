//! PubMed E-utilities client.
//!
//! Provides async HTTP client with:
//! - Connection pooling via reqwest
//! - Retry middleware with exponential backoff
//! - A single process-wide rate limit (3 req/s) across all stages and retries
//! - Search result caching with 24-hour TTL
//!
//! A search is three calls: `esearch` for ranked PMIDs, `esummary` for metadata
//! and `efetch` for abstracts, merged into [`Paper`] records in search order.

mod cache;
mod rate_limit;
pub mod xml;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::{debug, info, warn};

pub use cache::ResultCache;
pub use rate_limit::RateLimiter;

use crate::config::{Config, api};
use crate::error::{ClientError, ClientResult};
use crate::models::{Paper, SummaryResponse, doi_link};

/// Clamp a requested paper count into `[1, 10]`.
#[must_use]
pub fn clamp_count(count: i64) -> u32 {
    count.clamp(i64::from(api::MIN_PAPERS), i64::from(api::MAX_PAPERS)) as u32
}

/// PubMed E-utilities client.
#[derive(Clone)]
pub struct PubMedClient {
    /// HTTP client with middleware.
    client: ClientWithMiddleware,

    /// Merged search results.
    cache: ResultCache,

    /// NCBI API key (optional).
    api_key: Option<String>,

    /// E-utilities base URL.
    eutils_url: String,

    /// Per-stage timeouts.
    search_timeout: Duration,
    summary_timeout: Duration,
    fetch_timeout: Duration,
}

impl PubMedClient {
    /// Create a new client with its own limiter and cache.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let limiter = RateLimiter::new(config.rate_limit_interval);
        let cache = ResultCache::new(config.cache_max_size, config.cache_ttl);
        Self::with_shared(config, limiter, cache)
    }

    /// Create a client around an existing limiter and cache.
    ///
    /// Use this when several clients must honor one global throttle.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn with_shared(
        config: Config,
        limiter: RateLimiter,
        cache: ResultCache,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("medlit-summarizer/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(api::MAX_KEEPALIVE)
            .pool_idle_timeout(api::KEEPALIVE_EXPIRY)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
            .build_with_max_retries(config.max_retries);

        // Middleware runs in registration order, so the limiter sits inside the
        // retry loop and every attempt waits for a permit.
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .with(limiter)
            .build();

        Ok(Self {
            client,
            cache,
            api_key: config.api_key,
            eutils_url: config.eutils_url.trim_end_matches('/').to_string(),
            search_timeout: config.search_timeout,
            summary_timeout: config.summary_timeout,
            fetch_timeout: config.fetch_timeout,
        })
    }

    /// Check if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Search PubMed and return up to `count` papers in relevance order.
    ///
    /// `count` is clamped to `[1, 10]`. Results are cached per
    /// (trimmed query, count, API key).
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] for a blank query (no request is made),
    /// and transport, status or parse errors from any of the three stages.
    pub async fn search(&self, query: &str, count: i64) -> ClientResult<Vec<Paper>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ClientError::validation("query", "must be a non-empty string"));
        }
        let count = clamp_count(count);

        let key = ResultCache::key(query, count, self.api_key.as_deref());
        if let Some(papers) = self.cache.get(&key).await {
            debug!(query, count, papers = papers.len(), "Search cache hit");
            return Ok(papers);
        }

        let ids = self.esearch(query, count).await?;
        let papers = if ids.is_empty() {
            Vec::new()
        } else {
            let summaries = self.esummary(&ids).await?;
            let abstracts = self.efetch(&ids).await?;
            merge_papers(&ids, &summaries, &abstracts)
        };

        info!(query, count, papers = papers.len(), "PubMed search complete");
        self.cache.insert(key, papers.clone()).await;

        Ok(papers)
    }

    /// Stage 1: ranked PMIDs, deduplicated, at most `count`.
    async fn esearch(&self, query: &str, count: u32) -> ClientResult<Vec<String>> {
        let params = vec![
            ("db", "pubmed".to_string()),
            ("term", query.to_string()),
            ("retmax", count.to_string()),
            ("sort", "relevance".to_string()),
        ];

        let body = self.get_text("esearch.fcgi", params, self.search_timeout).await?;
        let parsed = xml::parse_search_ids(&body)?;
        if let Some(message) = &parsed.error {
            warn!(query, error = %message, "esearch reported an error");
        }

        let mut seen = HashSet::new();
        let ids: Vec<String> = parsed
            .ids
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .take(count as usize)
            .collect();

        debug!(query, ids = ids.len(), "esearch returned PMIDs");
        Ok(ids)
    }

    /// Stage 2: metadata documents for the PMIDs.
    async fn esummary(&self, ids: &[String]) -> ClientResult<SummaryResponse> {
        let params = vec![
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("retmode", "json".to_string()),
        ];

        let body = self.get_text("esummary.fcgi", params, self.summary_timeout).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Stage 3: abstracts for the PMIDs.
    async fn efetch(&self, ids: &[String]) -> ClientResult<HashMap<String, String>> {
        let params = vec![
            ("db", "pubmed".to_string()),
            ("id", ids.join(",")),
            ("rettype", "abstract".to_string()),
            ("retmode", "xml".to_string()),
        ];

        let body = self.get_text("efetch.fcgi", params, self.fetch_timeout).await?;
        let abstracts = xml::parse_abstracts(&body)?;

        debug!(requested = ids.len(), found = abstracts.len(), "efetch returned abstracts");
        Ok(abstracts)
    }

    /// Make a GET request and return the body. Throttling happens per attempt
    /// in the middleware stack.
    async fn get_text(
        &self,
        endpoint: &str,
        mut params: Vec<(&'static str, String)>,
        timeout: Duration,
    ) -> ClientResult<String> {
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        let url = format!("{}/{}", self.eutils_url, endpoint);

        let response = self
            .client
            .get(&url)
            .query(&params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        let response = self.handle_response(response).await?;
        response.text().await.map_err(|e| {
            if e.is_timeout() { ClientError::Timeout(timeout) } else { ClientError::Http(e) }
        })
    }

    /// Handle API response status codes.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> ClientResult<reqwest::Response> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        match status.as_u16() {
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(1);

                Err(ClientError::rate_limited(retry_after))
            }
            404 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::not_found(text))
            }
            400 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::bad_request(text))
            }
            500..=599 => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::server(status.as_u16(), text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ClientError::UnexpectedStatus { status: status.as_u16(), message: text })
            }
        }
    }
}

impl std::fmt::Debug for PubMedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubMedClient")
            .field("has_api_key", &self.has_api_key())
            .field("eutils_url", &self.eutils_url)
            .finish()
    }
}

/// Classify a failed send, surfacing timeouts as such.
fn transport_error(err: reqwest_middleware::Error, timeout: Duration) -> ClientError {
    match err {
        reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => ClientError::Timeout(timeout),
        reqwest_middleware::Error::Reqwest(e) => ClientError::Http(e),
        other => ClientError::Middleware(other),
    }
}

/// Join the three stages by PMID, in search order.
///
/// Missing metadata leaves title, date, DOI and authors empty; a missing abstract
/// becomes the empty string.
fn merge_papers(
    ids: &[String],
    summaries: &SummaryResponse,
    abstracts: &HashMap<String, String>,
) -> Vec<Paper> {
    ids.iter()
        .map(|id| {
            let doc = summaries.doc(id).unwrap_or_default();
            Paper {
                paper_id: id.clone(),
                authors: doc.author_names(),
                doi_link: doc.doi().map(doi_link),
                title: doc.title.filter(|t| !t.trim().is_empty()),
                publication_date: doc.pubdate.filter(|d| !d.trim().is_empty()),
                r#abstract: abstracts.get(id).cloned().unwrap_or_default(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_clamp_count() {
        assert_eq!(clamp_count(-5), 1);
        assert_eq!(clamp_count(0), 1);
        assert_eq!(clamp_count(7), 7);
        assert_eq!(clamp_count(50), 10);
    }

    #[test]
    fn test_merge_keeps_search_order_and_degrades() {
        let ids = vec!["2".to_string(), "1".to_string(), "3".to_string()];
        let summaries: SummaryResponse = serde_json::from_value(json!({
            "result": {
                "uids": ["1", "2"],
                "1": {
                    "title": "First",
                    "authors": [{"name": "A B"}],
                    "pubdate": "2020 May",
                    "articleids": [{"idtype": "doi", "value": "10.1/one"}]
                },
                "2": {"title": "Second"}
            }
        }))
        .unwrap();
        let abstracts = HashMap::from([("1".to_string(), "Abstract one.".to_string())]);

        let papers = merge_papers(&ids, &summaries, &abstracts);

        assert_eq!(papers.iter().map(|p| p.paper_id.as_str()).collect::<Vec<_>>(), ["2", "1", "3"]);
        assert_eq!(papers[1].doi_link.as_deref(), Some("https://doi.org/10.1/one"));
        assert_eq!(papers[1].authors, vec!["A B".to_string()]);
        assert_eq!(papers[1].r#abstract, "Abstract one.");

        assert_eq!(papers[0].title.as_deref(), Some("Second"));
        assert!(papers[0].authors.is_empty());
        assert!(papers[0].doi_link.is_none());
        assert!(papers[0].r#abstract.is_empty());

        assert!(papers[2].title.is_none());
        assert!(papers[2].publication_date.is_none());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = PubMedClient::new(Config::new(Some("top-secret".to_string()))).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("top-secret"));
        assert!(debug.contains("has_api_key"));
    }
}
