//! Transcript source abstraction.
//!
//! The pipeline only depends on this trait; the concrete YouTube client
//! lives in [`crate::fetcher`]. Failures carry a named reason so callers
//! can tell "captions disabled" from "rate limited" without string
//! matching.

use serde::{Deserialize, Serialize};
use tubescribe_core::schema::{TranscriptKind, TranscriptStats};
use tubescribe_core::AppResult;

/// One timed caption segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,

    /// Start offset in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

/// A fetched transcript with its provenance.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub segments: Vec<TranscriptSegment>,
    pub language: String,
    pub kind: TranscriptKind,
}

impl Transcript {
    /// Join segment texts into one flat transcript string.
    ///
    /// Segments are whitespace-trimmed and joined with single spaces, so
    /// the result never carries doubled separators.
    pub fn joined_text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.text.trim())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Statistics over the joined text.
    pub fn stats(&self) -> TranscriptStats {
        TranscriptStats {
            character_count: self.joined_text().chars().count(),
            language: self.language.clone(),
            source: self.kind,
            segment_count: self.segments.len(),
        }
    }
}

/// Capability trait for transcript retrieval.
#[async_trait::async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for a video, preferring the given languages in
    /// order.
    ///
    /// # Errors
    /// `AppError::Upstream` with a reason of `Disabled`, `NotFound`,
    /// `Unavailable`, `RateLimited`, or `UpstreamFailure`.
    async fn fetch(&self, video_id: &str, preferred_languages: &[String])
        -> AppResult<Transcript>;
}
