//! Configuration for the MedLit summarizer.

use std::time::Duration;

/// PubMed E-utilities constants.
pub mod api {
    use std::time::Duration;

    /// Base URL for NCBI E-utilities.
    pub const EUTILS_BASE: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils";

    /// Timeout for the identifier search stage.
    pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(15);

    /// Timeout for the metadata (esummary) stage.
    pub const SUMMARY_TIMEOUT: Duration = Duration::from_secs(15);

    /// Timeout for the abstract (efetch) stage.
    pub const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

    /// Connection timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Minimum interval between E-utilities calls (3 req/s).
    pub const RATE_LIMIT_INTERVAL: Duration = Duration::from_millis(334);

    /// Cache TTL (24 hours).
    pub const CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24);

    /// Maximum cached searches.
    pub const CACHE_MAX_SIZE: u64 = 256;

    /// Retries for transient failures.
    pub const MAX_RETRIES: u32 = 3;

    /// Maximum keepalive connections.
    pub const MAX_KEEPALIVE: usize = 10;

    /// Keepalive expiry.
    pub const KEEPALIVE_EXPIRY: Duration = Duration::from_secs(30);

    /// Lower bound for papers per query.
    pub const MIN_PAPERS: u32 = 1;

    /// Upper bound for papers per query.
    pub const MAX_PAPERS: u32 = 10;

    /// Papers per query when the caller does not say.
    pub const DEFAULT_PAPERS: u32 = 5;
}

/// Local inference service constants.
pub mod generative {
    use std::time::Duration;

    /// Default Ollama host.
    pub const DEFAULT_HOST: &str = "http://localhost:11434";

    /// Default model name.
    pub const DEFAULT_MODEL: &str = "llama3.1";

    /// Reachability probe timeout.
    pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Single generate call timeout.
    pub const GENERATE_TIMEOUT: Duration = Duration::from_secs(120);

    /// Wall-clock budget for one abstract's chunk loop.
    pub const SUMMARY_BUDGET: Duration = Duration::from_secs(45);
}

/// Abstract chunking constants.
pub mod chunking {
    /// Maximum characters per chunk.
    pub const CHUNK_SIZE: usize = 1500;

    /// Characters shared by adjacent chunks.
    pub const CHUNK_OVERLAP: usize = 150;
}

/// Summarizer configuration.
#[derive(Clone)]
pub struct Config {
    /// NCBI API key (optional).
    pub api_key: Option<String>,

    /// E-utilities base URL (for testing with mock servers).
    pub eutils_url: String,

    /// Per-stage request timeouts.
    pub search_timeout: Duration,
    pub summary_timeout: Duration,
    pub fetch_timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Minimum interval between E-utilities calls. Zero disables throttling.
    pub rate_limit_interval: Duration,

    /// Retries for transient failures.
    pub max_retries: u32,

    /// Cache TTL.
    pub cache_ttl: Duration,

    /// Maximum cache size.
    pub cache_max_size: u64,

    /// Ollama base URL.
    pub ollama_host: String,

    /// Ollama model name.
    pub ollama_model: String,

    /// Reachability probe timeout.
    pub probe_timeout: Duration,

    /// Single generate call timeout.
    pub generate_timeout: Duration,

    /// Wall-clock budget per abstract.
    pub summary_budget: Duration,

    /// Chunk size in characters.
    pub chunk_size: usize,

    /// Chunk overlap in characters.
    pub chunk_overlap: usize,
}

impl Config {
    /// Create a new configuration with an optional NCBI API key.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            eutils_url: api::EUTILS_BASE.to_string(),
            search_timeout: api::SEARCH_TIMEOUT,
            summary_timeout: api::SUMMARY_TIMEOUT,
            fetch_timeout: api::FETCH_TIMEOUT,
            connect_timeout: api::CONNECT_TIMEOUT,
            rate_limit_interval: api::RATE_LIMIT_INTERVAL,
            max_retries: api::MAX_RETRIES,
            cache_ttl: api::CACHE_TTL,
            cache_max_size: api::CACHE_MAX_SIZE,
            ollama_host: generative::DEFAULT_HOST.to_string(),
            ollama_model: generative::DEFAULT_MODEL.to_string(),
            probe_timeout: generative::PROBE_TIMEOUT,
            generate_timeout: generative::GENERATE_TIMEOUT,
            summary_budget: generative::SUMMARY_BUDGET,
            chunk_size: chunking::CHUNK_SIZE,
            chunk_overlap: chunking::CHUNK_OVERLAP,
        }
    }

    /// Create a test configuration pointing both services at a mock server.
    ///
    /// Throttling and retries are off; caching stays on so cache behavior is testable.
    #[must_use]
    pub fn for_testing(base_url: &str) -> Self {
        Self {
            eutils_url: format!("{}/entrez/eutils", base_url),
            search_timeout: Duration::from_secs(5),
            summary_timeout: Duration::from_secs(5),
            fetch_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
            rate_limit_interval: Duration::ZERO,
            max_retries: 0,
            ollama_host: base_url.to_string(),
            probe_timeout: Duration::from_secs(2),
            generate_timeout: Duration::from_secs(5),
            ..Self::new(None)
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads `PUBMED_API_KEY`, `OLLAMA_HOST` and `OLLAMA_MODEL`.
    ///
    /// # Errors
    ///
    /// Returns error if environment variables are invalid.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::new(std::env::var("PUBMED_API_KEY").ok())
            .with_ollama(std::env::var("OLLAMA_HOST").ok(), std::env::var("OLLAMA_MODEL").ok())
    }

    /// Override the inference service host and model. `None` keeps the current value.
    ///
    /// # Errors
    ///
    /// Returns error if the host is not an http(s) URL.
    pub fn with_ollama(mut self, host: Option<String>, model: Option<String>) -> anyhow::Result<Self> {
        if let Some(host) = host.filter(|h| !h.trim().is_empty()) {
            let host = host.trim();
            if !host.starts_with("http://") && !host.starts_with("https://") {
                anyhow::bail!("OLLAMA_HOST must be an http(s) URL, got {host:?}");
            }
            self.ollama_host = host.to_string();
        }
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.ollama_model = model.trim().to_string();
        }
        Ok(self)
    }

    /// Check if an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(None)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("has_api_key", &self.has_api_key())
            .field("eutils_url", &self.eutils_url)
            .field("ollama_host", &self.ollama_host)
            .field("ollama_model", &self.ollama_model)
            .field("summary_budget", &self.summary_budget)
            .finish()
    }
}
