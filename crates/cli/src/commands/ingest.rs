//! Ingest command handler.
//!
//! Ingests one YouTube URL and prints the resulting report.

use clap::Args;
use tubescribe_core::config::AppConfig;
use tubescribe_core::AppResult;
use tubescribe_ingest::IngestRequest;

/// Ingest a single YouTube video
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// YouTube URL to ingest
    pub url: String,

    /// Preferred transcript language
    #[arg(short, long)]
    pub language: Option<String>,

    /// Overwrite an existing vault file
    #[arg(long)]
    pub overwrite: bool,

    /// Extract metadata without saving a markdown file
    #[arg(long)]
    pub no_save: bool,

    /// Output the full report as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    /// Execute the ingest command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");
        tracing::debug!("Ingest command options: {:?}", self);

        let pipeline = super::build_pipeline(config)?;

        let mut request = IngestRequest::new(self.url.as_str());
        request.language = self
            .language
            .clone()
            .unwrap_or_else(|| config.language.clone());
        request.overwrite = self.overwrite;
        request.save_markdown = !self.no_save;

        let report = pipeline.ingest(&request).await?;

        if self.json {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| tubescribe_core::AppError::Serialization(e.to_string()))?;
            println!("{}", json);
            return Ok(());
        }

        println!("Title:      {}", report.metadata.title);
        println!(
            "Transcript: {} characters, {} segments ({})",
            report.stats.character_count,
            report.stats.segment_count,
            report.stats.language
        );
        if !report.metadata.topics.is_empty() {
            println!("Topics:     {}", report.metadata.topics.join(", "));
        }

        match report.save {
            Some(outcome) if outcome.skipped => {
                println!("Skipped:    vault file already exists ({})", outcome.filename);
            }
            Some(outcome) if outcome.saved => {
                println!(
                    "Saved:      {}",
                    outcome
                        .vault_path
                        .map(|p| p.display().to_string())
                        .unwrap_or(outcome.filename)
                );
            }
            Some(outcome) => {
                println!(
                    "Staged only: {} (vault copy failed: {})",
                    outcome
                        .staged_path
                        .map(|p| p.display().to_string())
                        .unwrap_or(outcome.filename),
                    outcome.error_code.as_deref().unwrap_or("unknown")
                );
            }
            None => {
                println!("Save:       disabled");
            }
        }

        Ok(())
    }
}
