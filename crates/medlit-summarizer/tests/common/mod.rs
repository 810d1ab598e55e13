//! Shared fixtures for mock-server tests.
#![allow(dead_code)]

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ESEARCH: &str = "/entrez/eutils/esearch.fcgi";
pub const ESUMMARY: &str = "/entrez/eutils/esummary.fcgi";
pub const EFETCH: &str = "/entrez/eutils/efetch.fcgi";
pub const OLLAMA_TAGS: &str = "/api/tags";
pub const OLLAMA_GENERATE: &str = "/api/generate";

pub const TRIAL_ABSTRACT: &str = "This randomized double-blind trial enrolled 200 patients. \
    Treatment showed a 45% reduction in relapse versus placebo (p<0.01). \
    We conclude this supports broader clinical use of the therapy.";

/// A model reply that decodes cleanly.
pub const MODEL_REPLY: &str = r#"{"key_findings": ["Relapse fell by 45%"], "methodology": "Randomized double-blind trial", "conclusion": "Supports broader use"}"#;

/// esearch XML listing `ids` in order.
pub fn esearch_xml(ids: &[&str]) -> String {
    let ids: String = ids.iter().map(|id| format!("<Id>{id}</Id>")).collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" ?>
<!DOCTYPE eSearchResult PUBLIC "-//NLM//DTD esearch 20060628//EN" "https://eutils.ncbi.nlm.nih.gov/eutils/dtd/20060628/esearch.dtd">
<eSearchResult><Count>{count}</Count><RetMax>{count}</RetMax><RetStart>0</RetStart><IdList>{ids}</IdList></eSearchResult>"#,
        count = ids.len()
    )
}

/// esummary JSON with a title, one author, a date and a DOI per id.
pub fn esummary_json(ids: &[&str]) -> Value {
    let mut result = serde_json::Map::new();
    result.insert("uids".to_string(), json!(ids));
    for id in ids {
        result.insert(
            (*id).to_string(),
            json!({
                "uid": id,
                "title": format!("Paper {id}"),
                "authors": [{"name": "Doe J", "authtype": "Author"}],
                "pubdate": "2023 Jan",
                "articleids": [
                    {"idtype": "pubmed", "value": id},
                    {"idtype": "doi", "value": format!("10.1000/{id}")}
                ]
            }),
        );
    }
    json!({ "header": {"type": "esummary", "version": "0.3"}, "result": result })
}

/// efetch XML with one article per `(id, abstract)`; an empty abstract omits the element.
pub fn efetch_xml(articles: &[(&str, &str)]) -> String {
    let body: String = articles
        .iter()
        .map(|(id, text)| {
            let abstract_xml = if text.is_empty() {
                String::new()
            } else {
                format!("<Abstract><AbstractText>{}</AbstractText></Abstract>", escape(text))
            };
            format!(
                "<PubmedArticle><MedlineCitation><PMID Version=\"1\">{id}</PMID>\
                 <Article><ArticleTitle>Paper {id}</ArticleTitle>{abstract_xml}</Article>\
                 </MedlineCitation></PubmedArticle>"
            )
        })
        .collect();
    format!("<?xml version=\"1.0\" ?>\n<PubmedArticleSet>{body}</PubmedArticleSet>")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Mount all three E-utilities stages for `articles`, in that search order.
pub async fn mount_eutils(server: &MockServer, articles: &[(&str, &str)]) {
    let ids: Vec<&str> = articles.iter().map(|(id, _)| *id).collect();

    Mock::given(method("GET"))
        .and(path(ESEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_string(esearch_xml(&ids)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(ESUMMARY))
        .respond_with(ResponseTemplate::new(200).set_body_json(esummary_json(&ids)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(EFETCH))
        .respond_with(ResponseTemplate::new(200).set_body_string(efetch_xml(articles)))
        .mount(server)
        .await;
}

/// Mount a reachable Ollama that answers every prompt with `reply`.
pub async fn mount_ollama(server: &MockServer, reply: &str) {
    Mock::given(method("GET"))
        .and(path(OLLAMA_TAGS))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"models": [{"name": "llama3.1:latest"}, {"name": "mistral"}]})),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path(OLLAMA_GENERATE))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"model": "llama3.1", "response": reply, "done": true})),
        )
        .mount(server)
        .await;
}

/// Number of requests the server saw for `endpoint`.
pub async fn hits(server: &MockServer, endpoint: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == endpoint)
        .count()
}
