//! Property-based tests for chunking, extractive summaries and output decoding.

use proptest::prelude::*;

use medlit_summarizer::models::MAX_KEY_FINDINGS;
use medlit_summarizer::summarize::generative::first_balanced_object;
use medlit_summarizer::summarize::{Chunker, DecodeOutcome, ExtractiveSummarizer, decode_summary, merge};

/// Prose-like text: words, punctuation, spaces, line breaks and some multibyte characters.
fn arb_text() -> impl Strategy<Value = String> {
    proptest::collection::vec(
        prop_oneof![
            "[a-z]{1,12}",
            Just(" ".to_string()),
            Just(". ".to_string()),
            Just("! ".to_string()),
            Just("\n".to_string()),
            Just("\n\n".to_string()),
            Just("é".to_string()),
            Just("45%".to_string()),
        ],
        0..200,
    )
    .prop_map(|parts| parts.concat())
}

/// Valid chunker settings.
fn arb_chunker() -> impl Strategy<Value = Chunker> {
    (2usize..200).prop_flat_map(|size| (Just(size), 0..size)).prop_map(|(size, overlap)| {
        Chunker::new(size, overlap).expect("overlap < size")
    })
}

proptest! {
    /// Every chunk is an in-bounds slice of the source at its offset.
    #[test]
    fn chunks_are_source_slices(text in arb_text(), chunker in arb_chunker()) {
        let chars: Vec<char> = text.chars().collect();
        for chunk in chunker.split(&text) {
            let len = chunk.text.chars().count();
            prop_assert!(len >= 1 && len <= chunker.size());
            let expected: String = chars[chunk.offset..chunk.offset + len].iter().collect();
            prop_assert_eq!(chunk.text, expected.as_str());
        }
    }

    /// Chunks cover the text without gaps and always move forward.
    #[test]
    fn chunks_cover_text(text in arb_text(), chunker in arb_chunker()) {
        let chunks: Vec<_> = chunker.split(&text).collect();
        let total = text.chars().count();

        if total == 0 {
            prop_assert!(chunks.is_empty());
            return Ok(());
        }

        prop_assert_eq!(chunks[0].offset, 0);
        for pair in chunks.windows(2) {
            let prev_end = pair[0].offset + pair[0].text.chars().count();
            prop_assert!(pair[1].offset > pair[0].offset);
            prop_assert!(pair[1].offset <= prev_end);
        }
        let last = chunks.last().unwrap();
        prop_assert_eq!(last.offset + last.text.chars().count(), total);
    }

    /// The fallback is a pure function with bounded, verbatim findings.
    #[test]
    fn extractive_is_deterministic_and_bounded(text in arb_text()) {
        let first = ExtractiveSummarizer.summarize(&text);
        let second = ExtractiveSummarizer.summarize(&text);

        prop_assert_eq!(&first, &second);
        prop_assert!(first.used_fallback);
        prop_assert!(first.key_findings.len() <= MAX_KEY_FINDINGS);
        for finding in &first.key_findings {
            prop_assert!(text.contains(finding.as_str()));
        }
    }

    /// Merging never exceeds the findings cap.
    #[test]
    fn merged_findings_are_capped(texts in proptest::collection::vec(arb_text(), 0..8)) {
        let partials: Vec<_> = texts.iter().map(|t| ExtractiveSummarizer.summarize(t)).collect();
        let (summary, _) = merge(&partials);
        prop_assert!(summary.key_findings.len() <= MAX_KEY_FINDINGS);
    }

    /// Decoding arbitrary model output never panics and never yields blank findings.
    #[test]
    fn decode_is_total(raw in ".{0,300}") {
        if let DecodeOutcome::Parsed(summary) = decode_summary(&raw) {
            prop_assert!(!summary.used_fallback);
            prop_assert!(summary.key_findings.iter().all(|f| !f.trim().is_empty()));
        }
    }

    /// Any extracted span is brace-delimited.
    #[test]
    fn balanced_span_is_delimited(raw in "[a-z{}\" \\\\]{0,80}") {
        if let Some(span) = first_balanced_object(&raw) {
            prop_assert!(span.starts_with('{'), "span must start with '{{'");
            prop_assert!(span.ends_with('}'), "span must end with '}}'");
        }
    }
}
