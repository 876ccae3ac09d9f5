//! Command handlers for the tubescribe CLI.

mod batch;
mod ingest;

pub use batch::BatchCommand;
pub use ingest::IngestCommand;

use std::sync::Arc;
use tubescribe_core::config::AppConfig;
use tubescribe_core::AppResult;
use tubescribe_ingest::{IngestPipeline, MetadataExtractor, YouTubeTranscriptClient};
use tubescribe_llm::create_client;
use tubescribe_vault::VaultStore;

/// Wire up the full ingestion pipeline from configuration.
pub(crate) fn build_pipeline(config: &AppConfig) -> AppResult<IngestPipeline> {
    let api_key = config.resolve_api_key(&config.provider);
    let endpoint = config.resolve_endpoint(&config.provider);

    let client = create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())?;
    let extractor = MetadataExtractor::new(client, config.model.as_str());

    let store = VaultStore::new(&config.staging_dir, &config.vault_dir)
        .with_source_label(config.source_label.as_str());

    Ok(IngestPipeline::new(
        Arc::new(YouTubeTranscriptClient::new()),
        extractor,
        store,
    ))
}
