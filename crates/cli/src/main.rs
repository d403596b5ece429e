//! ragline CLI — the main entry point.
//!
//! Commands:
//! - `serve`  — Start the HTTP gateway
//! - `query`  — Answer one question through the RAG pipeline
//! - `ingest` — Load knowledge documents from a JSON file
//! - `stats`  — Show knowledge collection statistics

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "ragline",
    about = "ragline — RAG + tool-calling service layer over a hosted LLM",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Answer one question through the RAG pipeline
    Query {
        /// The question to ask
        text: String,

        /// How many documents to retrieve for context
        #[arg(short = 'k', long)]
        context_limit: Option<usize>,
    },

    /// Load knowledge documents from a JSON file
    Ingest {
        /// Path to a JSON array of documents
        file: std::path::PathBuf,
    },

    /// Show knowledge collection statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = ragline_config::AppConfig::load()?;

    match cli.command {
        Commands::Serve { port } => commands::serve::run(config, port).await?,
        Commands::Query {
            text,
            context_limit,
        } => commands::query::run(config, &text, context_limit).await?,
        Commands::Ingest { file } => commands::ingest::run(config, &file).await?,
        Commands::Stats => commands::stats::run(config).await?,
    }

    Ok(())
}
