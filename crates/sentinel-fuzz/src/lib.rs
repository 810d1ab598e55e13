//! Fuzzing library for medlit-summarizer.
//!
//! Targets cover the two untrusted inputs: model replies and E-utilities XML.
//!
//! # Usage
//!
//! ```bash
//! cd crates/sentinel-fuzz
//! cargo +nightly fuzz run fuzz_decode_summary -- -max_total_time=60
//! cargo +nightly fuzz run fuzz_eutils_xml -- -max_total_time=60
//! ```

pub use medlit_summarizer::client::xml;
pub use medlit_summarizer::summarize::{decode_summary, generative::first_balanced_object};
