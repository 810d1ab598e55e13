#![no_main]

use libfuzzer_sys::fuzz_target;
use medlit_summarizer::summarize::{Chunker, ExtractiveSummarizer};

fuzz_target!(|data: (u8, u8, &str)| {
    let (size, overlap, text) = data;
    let Ok(chunker) = Chunker::new(usize::from(size), usize::from(overlap)) else {
        return;
    };

    for chunk in chunker.split(text) {
        assert!(chunk.text.chars().count() <= chunker.size());
        let _ = ExtractiveSummarizer.summarize(chunk.text);
    }
});
