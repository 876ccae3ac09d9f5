//! Metadata schema shared across the workspace.
//!
//! `VideoMetadata` is the canonical record the LLM must produce and the
//! vault persists. Collection fields default to empty and optional fields
//! to `None` so a structurally valid but sparse LLM response still parses;
//! anything beyond shape validation is out of scope.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Chapter/timestamp segment in a video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chapter {
    pub title: String,

    /// e.g. "00:15:30", absent when the transcript carries no timestamps
    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub summary: String,
}

/// Canonical metadata record for one ingested video.
///
/// Constructed once per ingestion from either a single-chunk extraction or
/// a merge of multi-chunk extractions. Immutable afterwards, except that the
/// `transcript` field is always overwritten with the original full text as
/// a final correction step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,

    pub source_url: String,

    #[serde(default = "default_source_type")]
    pub source_type: String,

    /// ISO-8601 date string; invalid values are sanitized to None
    #[serde(default)]
    pub date_published: Option<String>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub guests: Vec<String>,

    /// Plain English topics, deduplicated in order of first appearance
    #[serde(default)]
    pub topics: Vec<String>,

    /// Hashtags like "#AI"
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub summary: String,

    /// Deduplicated, order-preserving, capped at 12 entries after merge
    #[serde(default)]
    pub key_points: Vec<String>,

    /// Full, untouched transcript text
    #[serde(default)]
    pub transcript: String,

    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

fn default_source_type() -> String {
    "youtube".to_string()
}

impl VideoMetadata {
    /// Drop an unparseable `date_published` rather than failing validation.
    pub fn sanitize_date(&mut self) {
        if let Some(ref raw) = self.date_published {
            if !is_valid_iso_date(raw) {
                self.date_published = None;
            }
        }
    }
}

/// Accepts the ISO-8601 forms the providers actually emit: a plain date,
/// a date-time without offset, or a full RFC 3339 timestamp.
pub fn is_valid_iso_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || DateTime::parse_from_rfc3339(value).is_ok()
}

/// Per-chunk extraction result, consumed only by the merge step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkExtraction {
    pub summary: String,
    pub key_points: Vec<String>,
    pub topics: Vec<String>,
}

/// How the transcript was produced upstream.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptKind {
    Manual,
    Auto,
    Unknown,
}

/// Statistics about an extracted transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptStats {
    pub character_count: usize,
    pub language: String,
    pub source: TranscriptKind,
    pub segment_count: usize,
}

/// Outcome of one vault save call. Value type, never mutated after
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSaveOutcome {
    /// Final vault path; present only when the vault copy succeeded
    pub vault_path: Option<PathBuf>,

    pub filename: String,

    /// True when the file already existed and overwrite was off
    pub skipped: bool,

    /// Staging path; always present after a write, and on skip only if a
    /// staged copy happens to exist
    pub staged_path: Option<PathBuf>,

    /// False when the vault copy failed (staged copy still retrievable)
    pub saved: bool,

    /// "FILE_LOCKED" or "COPY_ERROR" when the vault copy failed
    pub error_code: Option<String>,
}

/// Terminal result of one ingestion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub video_id: String,
    pub stats: TranscriptStats,
    pub metadata: VideoMetadata,

    /// Absent when saving was not requested or staging itself failed
    pub save: Option<FileSaveOutcome>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_metadata_parses() {
        let json = r#"{
            "title": "A Talk",
            "source_url": "https://youtu.be/abc12345678",
            "summary": "Short."
        }"#;
        let metadata: VideoMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.source_type, "youtube");
        assert!(metadata.guests.is_empty());
        assert!(metadata.date_published.is_none());
        assert!(metadata.chapters.is_empty());
    }

    #[test]
    fn test_full_metadata_round_trips_fields() {
        let json = r#"{
            "title": "AI Roundtable",
            "source_url": "https://www.youtube.com/watch?v=abc12345678",
            "source_type": "youtube",
            "date_published": "2024-06-01",
            "host": "Jordan",
            "guests": ["Sam", "Priya"],
            "topics": ["Artificial Intelligence"],
            "tags": ["#AI"],
            "summary": "A discussion.",
            "key_points": ["Point one"],
            "transcript": "Hello.",
            "chapters": [{"title": "Intro", "timestamp": "00:00:10", "summary": "Opening."}]
        }"#;
        let metadata: VideoMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.guests.len(), 2);
        assert_eq!(metadata.chapters[0].timestamp.as_deref(), Some("00:00:10"));
    }

    #[test]
    fn test_sanitize_date_drops_garbage() {
        let mut metadata: VideoMetadata = serde_json::from_str(
            r#"{"title": "t", "source_url": "u", "date_published": "last Tuesday"}"#,
        )
        .unwrap();
        metadata.sanitize_date();
        assert!(metadata.date_published.is_none());
    }

    #[test]
    fn test_sanitize_date_keeps_iso_forms() {
        for value in ["2024-01-01", "2024-01-01T10:30:00", "2024-01-01T10:30:00Z"] {
            let mut metadata: VideoMetadata = serde_json::from_str(&format!(
                r#"{{"title": "t", "source_url": "u", "date_published": "{}"}}"#,
                value
            ))
            .unwrap();
            metadata.sanitize_date();
            assert_eq!(metadata.date_published.as_deref(), Some(value));
        }
    }

    #[test]
    fn test_missing_title_fails_shape_validation() {
        let result = serde_json::from_str::<VideoMetadata>(r#"{"source_url": "u"}"#);
        assert!(result.is_err());
    }
}
