//! MedLit Summarizer
//!
//! Retrieves biomedical papers from NCBI PubMed E-utilities and produces a
//! structured, confidence-scored summary of each abstract.
//!
//! # Features
//!
//! - **Three-stage retrieval**: esearch, esummary and efetch merged into papers
//! - **Rate-limited**: one process-wide 3 req/s throttle across all stages
//! - **Cached**: 24-hour TTL cache keyed by query, count and API key
//! - **Resilient summaries**: a local Ollama model when reachable and within
//!   budget, a deterministic extractive summarizer otherwise
//!
//! # Example
//!
//! ```no_run
//! use medlit_summarizer::{config::Config, pipeline::Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::from_config(Config::from_env()?)?;
//!     let batch = pipeline.process("metformin cardiovascular outcomes", 5).await?;
//!
//!     for paper in &batch.papers {
//!         println!("{} ({})", paper.title_or_default(), paper.confidence_score);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod formatters;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod summarize;

pub use client::PubMedClient;
pub use config::Config;
pub use error::{ClientError, GenerativeError, PipelineError};
pub use pipeline::Pipeline;
