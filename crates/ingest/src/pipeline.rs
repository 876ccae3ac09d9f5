//! End-to-end ingestion pipeline.
//!
//! Composes URL parsing, transcript fetch, metadata extraction, and vault
//! persistence into one call. A vault-copy failure is folded into the
//! report (degraded durability); a staging failure propagates — staging is
//! the floor the design stands on.

use std::sync::Arc;
use tracing::Instrument;

use tubescribe_core::schema::IngestReport;
use tubescribe_core::youtube::extract_video_id;
use tubescribe_core::AppResult;
use tubescribe_vault::VaultStore;

use crate::extract::MetadataExtractor;
use crate::transcript::TranscriptSource;

/// One ingestion request.
#[derive(Debug, Clone)]
pub struct IngestRequest {
    pub url: String,
    pub language: String,
    pub save_markdown: bool,
    pub overwrite: bool,
}

impl IngestRequest {
    /// Request with the default options: English captions, save, no
    /// overwrite.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            language: "en".to_string(),
            save_markdown: true,
            overwrite: false,
        }
    }
}

/// The composed ingestion pipeline.
pub struct IngestPipeline {
    transcripts: Arc<dyn TranscriptSource>,
    extractor: MetadataExtractor,
    store: VaultStore,
}

impl IngestPipeline {
    pub fn new(
        transcripts: Arc<dyn TranscriptSource>,
        extractor: MetadataExtractor,
        store: VaultStore,
    ) -> Self {
        Self {
            transcripts,
            extractor,
            store,
        }
    }

    /// Ingest one video: fetch transcript, extract metadata, persist.
    pub async fn ingest(&self, request: &IngestRequest) -> AppResult<IngestReport> {
        let video_id = extract_video_id(&request.url)?;
        let span = tracing::info_span!("ingest", video_id = %video_id);

        async {
            tracing::info!("Processing ingestion request for {}", request.url);

            let preferred = preferred_languages(&request.language);
            let transcript = self.transcripts.fetch(&video_id, &preferred).await?;
            let text = transcript.joined_text();
            let stats = transcript.stats();
            tracing::info!("Extracted transcript: {} characters", stats.character_count);

            let metadata = self.extractor.extract(&text, &request.url, None).await?;
            tracing::info!("Extracted metadata: title='{}'", metadata.title);

            let save = if request.save_markdown {
                let outcome = self.store.save(&metadata, request.overwrite).await?;
                if outcome.saved {
                    tracing::info!("Markdown file saved: {}", outcome.filename);
                } else {
                    tracing::warn!(
                        "Markdown file saved to staging only (vault copy failed): {} - {:?}",
                        outcome.filename,
                        outcome.error_code
                    );
                }
                Some(outcome)
            } else {
                None
            };

            Ok(IngestReport {
                video_id: video_id.clone(),
                stats,
                metadata,
                save,
            })
        }
        .instrument(span)
        .await
    }
}

/// Requested language first, then English as the fallback.
fn preferred_languages(language: &str) -> Vec<String> {
    let mut preferred = vec![language.to_string()];
    if language != "en" {
        preferred.push("en".to_string());
    }
    preferred
}
