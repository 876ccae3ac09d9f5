//! Metadata extraction orchestrator.
//!
//! Drives the chunker/merger against the LLM capability. Short transcripts
//! go through a single extraction call; long ones are chunked, extracted
//! per chunk, merged, and finished with one structural pass over a
//! representative sample. The whole extraction is retried on validation
//! failures (malformed model output); transport failures propagate
//! immediately — backoff will not fix a systemic provider issue within the
//! same request.

use std::sync::Arc;
use std::time::Duration;

use tubescribe_core::schema::{ChunkExtraction, VideoMetadata};
use tubescribe_core::{AppError, AppResult};
use tubescribe_llm::{LlmClient, LlmRequest};

use crate::chunk::{
    chunk_transcript, merge_extractions, representative_sample, DEFAULT_MAX_CHUNK_SIZE,
    REPRESENTATIVE_SLICE_LEN,
};
use crate::prompt::{build_user_prompt, SYSTEM_PROMPT};

/// Total attempts for one extract call (first try plus one retry).
const EXTRACT_ATTEMPTS: u32 = 2;

const RETRY_MIN_DELAY: Duration = Duration::from_secs(2);
const RETRY_MAX_DELAY: Duration = Duration::from_secs(10);

/// Sampling temperature for extraction; low for focused output.
const EXTRACTION_TEMPERATURE: f32 = 0.3;

/// Orchestrates LLM metadata extraction over a transcript.
pub struct MetadataExtractor {
    client: Arc<dyn LlmClient>,
    model: String,
    max_chunk_size: usize,
}

impl MetadataExtractor {
    /// Create an extractor over the given client and model.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
        }
    }

    /// Override the chunk size threshold.
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    /// Extract structured metadata from a transcript.
    ///
    /// Retried up to [`EXTRACT_ATTEMPTS`] times on `Validation` errors with
    /// exponential backoff; `Provider` errors are not retried here.
    pub async fn extract(
        &self,
        transcript: &str,
        source_url: &str,
        video_title: Option<&str>,
    ) -> AppResult<VideoMetadata> {
        let mut last_err = None;

        for attempt in 1..=EXTRACT_ATTEMPTS {
            match self.extract_once(transcript, source_url, video_title).await {
                Ok(metadata) => return Ok(metadata),
                Err(err @ AppError::Validation(_)) => {
                    tracing::warn!("Extraction attempt {} failed validation: {}", attempt, err);
                    last_err = Some(err);
                    if attempt < EXTRACT_ATTEMPTS {
                        tokio::time::sleep(retry_delay(attempt)).await;
                    }
                }
                Err(other) => return Err(other),
            }
        }

        Err(last_err.expect("at least one attempt was made"))
    }

    async fn extract_once(
        &self,
        transcript: &str,
        source_url: &str,
        video_title: Option<&str>,
    ) -> AppResult<VideoMetadata> {
        let chunks = chunk_transcript(transcript, self.max_chunk_size);

        let mut metadata = if chunks.len() == 1 {
            self.extract_single(&chunks[0], source_url, video_title)
                .await?
        } else {
            tracing::info!("Processing {} transcript chunks", chunks.len());
            let mut parts = Vec::with_capacity(chunks.len());

            for (index, chunk) in chunks.iter().enumerate() {
                tracing::info!("Processing chunk {}/{}", index + 1, chunks.len());
                let chunk_metadata = self.extract_single(chunk, source_url, video_title).await?;
                parts.push(ChunkExtraction {
                    summary: chunk_metadata.summary,
                    key_points: chunk_metadata.key_points,
                    topics: chunk_metadata.topics,
                });
            }

            let merged = merge_extractions(&parts);

            // Structural fields (title, host, guests, dates, chapters) come
            // from one pass over a first-chunk + last-chunk sample; they may
            // be approximate for very long inputs
            let sample = representative_sample(&chunks, REPRESENTATIVE_SLICE_LEN);
            let mut metadata = self.extract_single(&sample, source_url, video_title).await?;

            metadata.summary = merged.summary;
            metadata.key_points = merged.key_points;
            metadata.topics = merged.topics;
            metadata
        };

        // The transcript field always carries the original full text,
        // irrespective of what the model returned
        metadata.transcript = transcript.to_string();
        Ok(metadata)
    }

    async fn extract_single(
        &self,
        text: &str,
        source_url: &str,
        video_title: Option<&str>,
    ) -> AppResult<VideoMetadata> {
        let user_prompt = build_user_prompt(text, source_url, video_title)?;
        let request = LlmRequest::new(user_prompt, &self.model)
            .with_system(SYSTEM_PROMPT)
            .with_temperature(EXTRACTION_TEMPERATURE)
            .with_json_response();

        let raw = self.client.complete(&request).await?;
        parse_metadata(&raw)
    }
}

/// Parse a completion strictly as the metadata schema.
///
/// Shape violations become `Validation` errors, distinct from transport
/// failures.
fn parse_metadata(raw: &str) -> AppResult<VideoMetadata> {
    let cleaned = strip_code_fences(raw);

    let mut metadata: VideoMetadata = serde_json::from_str(cleaned)
        .map_err(|e| AppError::Validation(format!("LLM returned invalid JSON: {}", e)))?;
    metadata.sanitize_date();
    Ok(metadata)
}

/// Remove markdown code-fence wrappers some providers emit around JSON.
fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        text = stripped;
    } else if let Some(stripped) = text.strip_prefix("```") {
        text = stripped;
    }
    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped;
    }
    text.trim()
}

/// Backoff between extraction attempts: exponential, clamped to
/// [`RETRY_MIN_DELAY`, `RETRY_MAX_DELAY`].
fn retry_delay(attempt: u32) -> Duration {
    let exponential = Duration::from_secs(1u64 << attempt.min(8));
    exponential.clamp(RETRY_MIN_DELAY, RETRY_MAX_DELAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubescribe_llm::providers::MockClient;

    const VALID_RESPONSE: &str = r#"{
        "title": "A Talk",
        "source_url": "https://youtu.be/abc12345678",
        "summary": "A summary.",
        "key_points": ["One point"],
        "topics": ["AI"],
        "transcript": "model-provided transcript"
    }"#;

    fn extractor(client: Arc<MockClient>) -> MetadataExtractor {
        MetadataExtractor::new(client, "mock-model")
    }

    #[tokio::test]
    async fn test_single_chunk_extraction() {
        let client = Arc::new(MockClient::new());
        client.push_response(VALID_RESPONSE);

        let metadata = extractor(client.clone())
            .extract("The full transcript.", "https://youtu.be/abc12345678", None)
            .await
            .unwrap();

        assert_eq!(client.call_count(), 1);
        assert_eq!(metadata.title, "A Talk");
        // The model's transcript field is overwritten with the original
        assert_eq!(metadata.transcript, "The full transcript.");
    }

    #[tokio::test]
    async fn test_fenced_json_accepted() {
        let client = Arc::new(MockClient::new());
        client.push_response(format!("```json\n{}\n```", VALID_RESPONSE));

        let metadata = extractor(client)
            .extract("text", "url", None)
            .await
            .unwrap();
        assert_eq!(metadata.title, "A Talk");
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_failure_retried_once() {
        let client = Arc::new(MockClient::new());
        client.push_response("this is not json");
        client.push_response(VALID_RESPONSE);

        let metadata = extractor(client.clone())
            .extract("text", "url", None)
            .await
            .unwrap();

        assert_eq!(client.call_count(), 2);
        assert_eq!(metadata.title, "A Talk");
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_failure_exhausts_attempts() {
        let client = Arc::new(MockClient::new().with_default_response("still not json"));

        let err = extractor(client.clone())
            .extract("text", "url", None)
            .await
            .unwrap_err();

        assert_eq!(client.call_count(), 2);
        assert_eq!(err.error_code(), "LLM_VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_provider_error_not_retried() {
        let client = Arc::new(MockClient::new());
        client.push_provider_error("connection refused");
        client.push_response(VALID_RESPONSE);

        let err = extractor(client.clone())
            .extract("text", "url", None)
            .await
            .unwrap_err();

        assert_eq!(client.call_count(), 1);
        assert_eq!(err.error_code(), "LLM_PROVIDER_ERROR");
    }

    #[tokio::test]
    async fn test_invalid_date_sanitized() {
        let client = Arc::new(MockClient::new());
        client.push_response(
            r#"{"title": "t", "source_url": "u", "date_published": "sometime in spring"}"#,
        );

        let metadata = extractor(client)
            .extract("text", "url", None)
            .await
            .unwrap();
        assert!(metadata.date_published.is_none());
    }

    #[test]
    fn test_strip_code_fences_variants() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[test]
    fn test_retry_delay_clamped() {
        assert_eq!(retry_delay(1), Duration::from_secs(2));
        assert_eq!(retry_delay(2), Duration::from_secs(4));
        assert_eq!(retry_delay(4), Duration::from_secs(10));
        assert_eq!(retry_delay(10), Duration::from_secs(10));
    }
}
