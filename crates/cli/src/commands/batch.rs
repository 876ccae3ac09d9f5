//! Batch command handler.
//!
//! Thin queue runner: reads URLs from a file (one per line, `#` comments
//! allowed), ingests them sequentially, and keeps going past per-URL
//! failures. A fixed delay between requests stays polite to the upstream.

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tubescribe_core::config::AppConfig;
use tubescribe_core::{AppError, AppResult};
use tubescribe_ingest::IngestRequest;

/// Ingest every URL in a queue file
#[derive(Args, Debug)]
pub struct BatchCommand {
    /// File with one YouTube URL per line
    pub queue_file: PathBuf,

    /// Seconds to wait between requests
    #[arg(long, default_value_t = 15)]
    pub delay_secs: u64,

    /// Overwrite existing vault files
    #[arg(long)]
    pub overwrite: bool,
}

impl BatchCommand {
    /// Execute the batch command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let urls = self.load_queue()?;
        if urls.is_empty() {
            println!("No URLs found in {}", self.queue_file.display());
            return Ok(());
        }

        tracing::info!("Processing {} queued URLs", urls.len());
        let pipeline = super::build_pipeline(config)?;

        let total = urls.len();
        let mut failures = 0usize;

        for (index, url) in urls.iter().enumerate() {
            let mut request = IngestRequest::new(url.as_str());
            request.language = config.language.clone();
            request.overwrite = self.overwrite;

            match pipeline.ingest(&request).await {
                Ok(report) => {
                    println!("✓ {}", report.metadata.title);
                }
                Err(err) => {
                    failures += 1;
                    tracing::error!("Failed to ingest {} [{}]: {}", url, err.error_code(), err);
                    eprintln!("✗ {} ({})", url, err.error_code());
                }
            }

            if index + 1 < total {
                tokio::time::sleep(Duration::from_secs(self.delay_secs)).await;
            }
        }

        tracing::info!("Batch finished: {}/{} succeeded", total - failures, total);
        Ok(())
    }

    fn load_queue(&self) -> AppResult<Vec<String>> {
        let contents = std::fs::read_to_string(&self.queue_file).map_err(|e| {
            AppError::Config(format!(
                "Failed to read queue file {}: {}",
                self.queue_file.display(),
                e
            ))
        })?;

        Ok(contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(String::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_queue_skips_blanks_and_comments() {
        let dir = std::env::temp_dir().join("tubescribe-batch-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("queue.txt");
        std::fs::write(
            &path,
            "# backlog\nhttps://youtu.be/abc12345678\n\n  https://youtu.be/def12345678  \n",
        )
        .unwrap();

        let command = BatchCommand {
            queue_file: path.clone(),
            delay_secs: 15,
            overwrite: false,
        };

        let urls = command.load_queue().unwrap();
        assert_eq!(
            urls,
            vec![
                "https://youtu.be/abc12345678",
                "https://youtu.be/def12345678"
            ]
        );

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_queue_file_is_config_error() {
        let command = BatchCommand {
            queue_file: PathBuf::from("/nonexistent/queue.txt"),
            delay_secs: 15,
            overwrite: false,
        };
        let err = command.load_queue().unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }
}
