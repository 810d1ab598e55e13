//! Generative summarization via a local Ollama service.
//!
//! The model's reply is untrusted free text. [`decode_summary`] first tries to
//! parse the whole reply as a JSON object, then the first balanced `{...}`
//! block inside it; anything else is [`DecodeOutcome::Unparseable`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::Config;
use crate::error::{GenerativeError, GenerativeResult};
use crate::models::PartialSummary;

/// A text-generation backend that can summarize abstract chunks.
#[async_trait]
pub trait GenerativeSummarizer: Send + Sync {
    /// Model used for generation.
    fn model(&self) -> &str;

    /// Models installed on the service.
    async fn list_models(&self) -> GenerativeResult<Vec<String>>;

    /// Cheap reachability probe.
    async fn is_reachable(&self) -> bool {
        self.list_models().await.is_ok()
    }

    /// Run one deterministic completion.
    async fn generate(&self, prompt: &str) -> GenerativeResult<String>;
}

/// Build the per-chunk summarization prompt.
#[must_use]
pub fn build_prompt(chunk: &str) -> String {
    format!(
        "You are a medical research summarization assistant.\n\
         Summarize the abstract excerpt below as structured data:\n\
         - key_findings: 3 to 6 short statements (array of strings)\n\
         - methodology: the study design in 1-2 sentences (string)\n\
         - conclusion: the authors' conclusion in 1-2 sentences (string)\n\n\
         Reply with a single JSON object using exactly those keys and nothing else.\n\n\
         Abstract excerpt:\n{chunk}\n"
    )
}

/// Result of decoding a model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A usable summary (with `used_fallback == false`).
    Parsed(PartialSummary),
    /// Neither the whole reply nor its first `{...}` block was a summary object.
    Unparseable,
}

/// Decode a model reply into a partial summary.
#[must_use]
pub fn decode_summary(raw: &str) -> DecodeOutcome {
    let parsed = parse_summary_object(raw.trim())
        .or_else(|| first_balanced_object(raw).and_then(parse_summary_object));

    parsed.map_or(DecodeOutcome::Unparseable, DecodeOutcome::Parsed)
}

/// Parse a JSON object carrying at least one summary key.
fn parse_summary_object(text: &str) -> Option<PartialSummary> {
    let value: Value = serde_json::from_str(text).ok()?;
    let object = value.as_object()?;
    if !["key_findings", "methodology", "conclusion"].iter().any(|k| object.contains_key(*k)) {
        return None;
    }

    let key_findings = match object.get("key_findings") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(String::from).collect(),
        _ => Vec::new(),
    };
    let text_field = |key: &str| object.get(key).and_then(Value::as_str).unwrap_or_default().trim().to_string();

    Some(PartialSummary {
        key_findings: key_findings
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        methodology: text_field("methodology"),
        conclusion: text_field("conclusion"),
        used_fallback: false,
    })
}

/// The first brace-balanced `{...}` span, ignoring braces inside JSON strings.
#[must_use]
pub fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0_usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Reachability report for the inference service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerativeHealth {
    /// "connected" or "disconnected".
    pub ollama_status: String,
    pub model: String,
    pub available_models: Vec<String>,
    pub backend_status: String,
}

/// Probe a backend and describe its state.
pub async fn health_report(backend: &dyn GenerativeSummarizer) -> GenerativeHealth {
    let (status, available_models) = match backend.list_models().await {
        Ok(models) => ("connected", models),
        Err(err) => {
            tracing::debug!(error = %err, "Inference service probe failed");
            ("disconnected", Vec::new())
        }
    };

    GenerativeHealth {
        ollama_status: status.to_string(),
        model: backend.model().to_string(),
        available_models,
        backend_status: "operational".to_string(),
    }
}

/// Ollama HTTP client.
#[derive(Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    host: String,
    model: String,
    probe_timeout: Duration,
    generate_timeout: Duration,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Deserialize)]
struct TagModel {
    #[serde(default)]
    name: Option<String>,
}

impl OllamaClient {
    /// Create a client for the configured host and model.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().connect_timeout(config.connect_timeout).build()?;

        Ok(Self {
            http,
            host: config.ollama_host.trim_end_matches('/').to_string(),
            model: config.ollama_model.clone(),
            probe_timeout: config.probe_timeout,
            generate_timeout: config.generate_timeout,
        })
    }

    async fn read_body(response: reqwest::Response) -> GenerativeResult<String> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(GenerativeError::Status { status: status.as_u16(), message: body });
        }
        Ok(body)
    }
}

#[async_trait]
impl GenerativeSummarizer for OllamaClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn list_models(&self) -> GenerativeResult<Vec<String>> {
        let response = self
            .http
            .get(format!("{}/api/tags", self.host))
            .timeout(self.probe_timeout)
            .send()
            .await
            .map_err(|e| transport_error(e, self.probe_timeout))?;
        let body = Self::read_body(response).await?;
        let tags: TagsResponse =
            serde_json::from_str(&body).map_err(|e| GenerativeError::Malformed(e.to_string()))?;

        Ok(tags.models.into_iter().filter_map(|m| m.name).collect())
    }

    async fn generate(&self, prompt: &str) -> GenerativeResult<String> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {"temperature": 0}
        });

        let response = self
            .http
            .post(format!("{}/api/generate", self.host))
            .timeout(self.generate_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(e, self.generate_timeout))?;
        let body = Self::read_body(response).await?;
        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| GenerativeError::Malformed(e.to_string()))?;

        Ok(parsed.response)
    }
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> GenerativeError {
    if err.is_timeout() { GenerativeError::Timeout(timeout) } else { GenerativeError::Http(err) }
}

impl std::fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaClient").field("host", &self.host).field("model", &self.model).finish()
    }
}
