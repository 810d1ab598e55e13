//! Deterministic extractive summarizer.
//!
//! Used whenever the generative model is unreachable, out of budget, or returns
//! something unusable. Sentences are scored on clinical/statistical keywords and
//! a preference for medium length; methodology and conclusion are picked by cue
//! words near the start and end of the text.

use std::cmp::Reverse;

use crate::models::{MAX_KEY_FINDINGS, PartialSummary};

/// Terms that mark a sentence as carrying a finding.
const FINDING_KEYWORDS: &[&str] = &[
    "randomized",
    "double-blind",
    "cohort",
    "meta-analysis",
    "significant",
    "%",
    "p=",
    "p <",
    "hazard ratio",
    "odds ratio",
    "risk",
    "confidence interval",
    "reduction",
    "increase",
    "improved",
    "benefit",
    "adverse",
    "safety",
];

const METHOD_CUES: &[&str] = &[
    "method",
    "randomized",
    "trial",
    "cohort",
    "retrospective",
    "prospective",
    "meta-analysis",
    "systematic review",
];

const CONCLUSION_CUES: &[&str] =
    &["conclude", "conclusion", "suggest", "support", "recommend", "implication"];

/// Fragments this short or shorter are dropped.
const MIN_SENTENCE_CHARS: usize = 30;

/// Sentences scanned from each end for methodology and conclusion cues.
const CUE_WINDOW: usize = 6;

/// Length range (in characters) that earns a bonus point.
const PREFERRED_LENGTH: std::ops::RangeInclusive<usize> = 80..=240;

/// Keyword/heuristic summarizer. Stateless and always available.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractiveSummarizer;

impl ExtractiveSummarizer {
    /// Summarize `text`. Empty input gives an empty summary.
    #[must_use]
    pub fn summarize(&self, text: &str) -> PartialSummary {
        let sentences = split_sentences(text);

        PartialSummary {
            key_findings: key_findings(&sentences),
            methodology: methodology(&sentences).unwrap_or_default().to_string(),
            conclusion: conclusion(&sentences).unwrap_or_default().to_string(),
            used_fallback: true,
        }
    }
}

/// Split on whitespace that follows `.`, `!` or `?`, dropping short fragments.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<&str> {
    let text = text.trim();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_gap = false;
    let mut prev: Option<char> = None;

    for (i, c) in text.char_indices() {
        if in_gap {
            if c.is_whitespace() {
                continue;
            }
            in_gap = false;
            start = i;
        } else if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            pieces.push(&text[start..i]);
            in_gap = true;
        }
        prev = Some(c);
    }
    if !in_gap {
        pieces.push(&text[start..]);
    }

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .collect()
}

/// Two points per distinct keyword, one for a medium-length sentence.
#[must_use]
pub fn score_sentence(sentence: &str) -> usize {
    let lower = sentence.to_lowercase();
    let keywords = FINDING_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();
    let length_bonus = usize::from(PREFERRED_LENGTH.contains(&sentence.trim().chars().count()));
    keywords * 2 + length_bonus
}

fn key_findings(sentences: &[&str]) -> Vec<String> {
    let mut ranked: Vec<usize> = (0..sentences.len()).collect();
    // Stable, so ties keep source order.
    ranked.sort_by_key(|&i| Reverse(score_sentence(sentences[i])));

    let picks: Vec<String> =
        ranked.into_iter().take(MAX_KEY_FINDINGS).map(|i| sentences[i].to_string()).collect();
    if picks.is_empty() {
        return sentences.iter().take(MAX_KEY_FINDINGS).map(|s| (*s).to_string()).collect();
    }
    picks
}

fn contains_any(sentence: &str, cues: &[&str]) -> bool {
    let lower = sentence.to_lowercase();
    cues.iter().any(|cue| lower.contains(cue))
}

fn methodology<'a>(sentences: &[&'a str]) -> Option<&'a str> {
    sentences
        .iter()
        .take(CUE_WINDOW)
        .find(|s| contains_any(s, METHOD_CUES))
        .or_else(|| sentences.first())
        .copied()
}

fn conclusion<'a>(sentences: &[&'a str]) -> Option<&'a str> {
    let tail = &sentences[sentences.len().saturating_sub(CUE_WINDOW)..];
    tail.iter()
        .rev()
        .find(|s| contains_any(s, CONCLUSION_CUES))
        .or_else(|| sentences.last())
        .copied()
}
