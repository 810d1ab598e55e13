#![no_main]

use libfuzzer_sys::fuzz_target;
use medlit_summarizer::summarize::{DecodeOutcome, decode_summary};

fuzz_target!(|data: &[u8]| {
    // Model output is free text; decoding must never panic
    let raw = String::from_utf8_lossy(data);
    if let DecodeOutcome::Parsed(summary) = decode_summary(&raw) {
        assert!(!summary.used_fallback);
    }
});
