//! MedLit Summarizer - Entry Point
//!
//! One-shot search from the command line, or the HTTP API.

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use medlit_summarizer::{
    config::{Config, api},
    formatters::OutputFormat,
    models::SearchRequest,
    pipeline::Pipeline,
    server::Server,
    summarize::{OllamaClient, health_report},
};

#[derive(Parser, Debug)]
#[command(name = "medlit-summarizer")]
#[command(about = "Search PubMed and summarize abstracts with a local model")]
#[command(version)]
struct Cli {
    /// NCBI API key (optional, raises the E-utilities rate limit)
    #[arg(long, global = true, env = "PUBMED_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Ollama base URL
    #[arg(long, global = true, env = "OLLAMA_HOST")]
    ollama_host: Option<String>,

    /// Ollama model used for summaries
    #[arg(long, global = true, env = "OLLAMA_MODEL")]
    model: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one query and print the summarized papers
    Search {
        /// Free-text PubMed query
        query: String,

        /// Number of papers (1-10)
        #[arg(long, short = 'n', default_value_t = api::DEFAULT_PAPERS as i64)]
        count: i64,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Run the HTTP API
    Serve {
        /// HTTP server port
        #[arg(long, default_value = "8000", env = "PORT")]
        port: u16,
    },
    /// Report whether the Ollama service is reachable
    Health,
}

impl Cli {
    fn config(&self) -> anyhow::Result<Config> {
        Config::new(self.api_key.clone()).with_ollama(self.ollama_host.clone(), self.model.clone())
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    let config = cli.config()?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        has_api_key = config.has_api_key(),
        ollama_host = %config.ollama_host,
        model = %config.ollama_model,
        "Starting MedLit Summarizer"
    );

    match cli.command {
        Command::Search { query, count, format } => {
            let pipeline = Pipeline::from_config(config)?;
            let batch = pipeline.process_request(&SearchRequest::new(query, count)).await?;
            println!("{}", format.render(&batch)?);
        }
        Command::Serve { port } => {
            let pipeline = Pipeline::from_config(config)?;
            Server::new(pipeline).run_http(port).await?;
        }
        Command::Health => {
            let backend = OllamaClient::new(&config)?;
            let report = health_report(&backend).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
