//! tubescribe CLI
//!
//! Main entry point for the tubescribe command-line tool. Ingests YouTube
//! videos into a markdown knowledge vault: transcript retrieval, LLM
//! metadata extraction, and durable two-stage persistence.

mod commands;

use clap::{Parser, Subcommand};
use commands::{BatchCommand, IngestCommand};
use std::path::PathBuf;
use tubescribe_core::{config::AppConfig, logging, AppResult};

/// tubescribe - YouTube ingestion into a markdown knowledge vault
#[derive(Parser, Debug)]
#[command(name = "tubescribe")]
#[command(about = "YouTube ingestion into a markdown knowledge vault", long_about = None)]
#[command(version)]
struct Cli {
    /// Local staging directory (reliable, never synced)
    #[arg(long, global = true, env = "TUBESCRIBE_STAGING_DIR")]
    staging_dir: Option<PathBuf>,

    /// Final vault directory (synced folder, may have sync locks)
    #[arg(long, global = true, env = "TUBESCRIBE_VAULT_DIR")]
    vault_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (openai, gemini)
    #[arg(short, long, global = true, env = "TUBESCRIBE_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "TUBESCRIBE_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest a single YouTube video
    Ingest(IngestCommand),

    /// Ingest every URL in a queue file
    Batch(BatchCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    // Load base configuration from environment
    let config = AppConfig::load()?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.staging_dir,
        cli.vault_dir,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("tubescribe starting");
    tracing::debug!("Staging directory: {:?}", config.staging_dir);
    tracing::debug!("Vault directory: {:?}", config.vault_dir);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.validate()?;
    config.ensure_directories()?;

    let command_name = match &cli.command {
        Commands::Ingest(_) => "ingest",
        Commands::Batch(_) => "batch",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ingest(cmd) => cmd.execute(&config).await,
        Commands::Batch(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed [{}]: {}", e.error_code(), e),
    }

    result
}
