//! E-utilities XML parsing (esearch id lists and efetch abstracts).
//!
//! Both parsers are streaming state machines over `quick_xml` events; neither
//! panics on malformed input.

use std::borrow::Cow;
use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesText, Event};

use crate::error::{ClientError, ClientResult};

/// Identifiers and the optional `<ERROR>` message from an esearch response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchIds {
    /// PMIDs in relevance order.
    pub ids: Vec<String>,
    /// Server-side error message, if any.
    pub error: Option<String>,
}

/// Parse an esearch response into PMIDs.
///
/// # Errors
///
/// Returns [`ClientError::Xml`] if the document is not well-formed.
pub fn parse_search_ids(xml: &str) -> ClientResult<SearchIds> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut result = SearchIds::default();
    let mut in_id_list = false;
    let mut in_id = false;
    let mut in_error = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"IdList" => in_id_list = true,
                b"Id" if in_id_list => in_id = true,
                b"ERROR" => in_error = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"IdList" => in_id_list = false,
                b"Id" => in_id = false,
                b"ERROR" => in_error = false,
                _ => {}
            },
            Ok(Event::Text(t)) => {
                let text = decode_text(&t);
                let text = text.trim();
                if in_id && !text.is_empty() {
                    result.ids.push(text.to_string());
                } else if in_error && !text.is_empty() {
                    result.error = Some(text.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ClientError::xml(format!(
                    "esearch at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    Ok(result)
}

/// Parse an efetch (`rettype=abstract`, `retmode=xml`) response into a PMID → abstract map.
///
/// The first `PMID` inside each `PubmedArticle` identifies it. All `AbstractText`
/// sections are trimmed and joined with newlines, including text nested in inline
/// markup such as `<i>` or `<sup>`.
///
/// # Errors
///
/// Returns [`ClientError::Xml`] if the document is not well-formed.
pub fn parse_abstracts(xml: &str) -> ClientResult<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);

    let mut abstracts = HashMap::new();
    let mut in_article = false;
    let mut in_pmid = false;
    let mut in_abstract = false;
    let mut in_text = false;
    let mut pmid: Option<String> = None;
    let mut sections: Vec<String> = Vec::new();
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"PubmedArticle" => {
                    in_article = true;
                    pmid = None;
                    sections.clear();
                }
                b"PMID" if in_article && pmid.is_none() => in_pmid = true,
                b"Abstract" if in_article => in_abstract = true,
                b"AbstractText" if in_abstract => {
                    in_text = true;
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"PMID" => in_pmid = false,
                b"AbstractText" if in_text => {
                    in_text = false;
                    let section = current.trim();
                    if !section.is_empty() {
                        sections.push(section.to_string());
                    }
                }
                b"Abstract" => in_abstract = false,
                b"PubmedArticle" => {
                    in_article = false;
                    if let Some(id) = pmid.take() {
                        abstracts.entry(id).or_insert_with(|| sections.join("\n"));
                    }
                    sections.clear();
                }
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if in_pmid {
                    let text = decode_text(&t);
                    let text = text.trim();
                    if !text.is_empty() {
                        pmid = Some(text.to_string());
                    }
                } else if in_text {
                    current.push_str(&decode_text(&t));
                }
            }
            Ok(Event::CData(c)) if in_text => {
                current.push_str(&String::from_utf8_lossy(&c));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ClientError::xml(format!(
                    "efetch at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    Ok(abstracts)
}

/// Unescape text, keeping the raw bytes when an entity is unknown.
fn decode_text<'a>(text: &'a BytesText<'_>) -> Cow<'a, str> {
    match text.unescape() {
        Ok(unescaped) => unescaped,
        Err(_) => String::from_utf8_lossy(text),
    }
}
