#![no_main]

use libfuzzer_sys::fuzz_target;
use medlit_summarizer::client::xml::{parse_abstracts, parse_search_ids};

fuzz_target!(|data: &[u8]| {
    if let Ok(xml) = std::str::from_utf8(data) {
        // Should never panic, only return Ok or Err
        let _ = parse_search_ids(xml);
        let _ = parse_abstracts(xml);
    }
});
