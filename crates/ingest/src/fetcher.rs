//! YouTube transcript client.
//!
//! Retrieves captions without an API key: the watch page embeds a
//! `ytInitialPlayerResponse` object whose caption track list points at the
//! timedtext endpoint. We fetch the preferred track in the `json3` format
//! and flatten its events into timed segments.

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use tubescribe_core::schema::TranscriptKind;
use tubescribe_core::{AppError, AppResult, UpstreamReason};

use crate::transcript::{Transcript, TranscriptSegment, TranscriptSource};

const YOUTUBE_BASE: &str = "https://www.youtube.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A desktop user agent; the watch page serves a different (captionless)
/// shell to unknown clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,

    #[serde(rename = "languageCode")]
    language_code: String,

    /// "asr" marks auto-generated tracks
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_auto_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }

    fn matches_language(&self, wanted: &str) -> bool {
        self.language_code == wanted
            || self.language_code.split('-').next() == Some(wanted)
    }
}

#[derive(Debug, Deserialize)]
struct Json3Response {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: Option<u64>,

    #[serde(rename = "dDurationMs", default)]
    duration_ms: Option<u64>,

    #[serde(default)]
    segs: Option<Vec<Json3Seg>>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: Option<String>,
}

/// Transcript source backed by the public YouTube watch page.
pub struct YouTubeTranscriptClient {
    base_url: String,
    client: reqwest::Client,
}

impl YouTubeTranscriptClient {
    /// Create a client against youtube.com.
    pub fn new() -> Self {
        Self::with_base_url(YOUTUBE_BASE)
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    async fn fetch_watch_page(&self, video_id: &str) -> AppResult<String> {
        let url = format!("{}/watch?v={}&hl=en", self.base_url, video_id);
        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::upstream(
                UpstreamReason::UpstreamFailure,
                format!("watch page request failed: {}", e),
            )
        })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AppError::upstream(
                UpstreamReason::RateLimited,
                "YouTube rate limit exceeded",
            ));
        }
        if !status.is_success() {
            return Err(AppError::upstream(
                UpstreamReason::UpstreamFailure,
                format!("watch page returned {}", status),
            ));
        }

        response.text().await.map_err(|e| {
            AppError::upstream(
                UpstreamReason::UpstreamFailure,
                format!("watch page body unreadable: {}", e),
            )
        })
    }

    async fn fetch_track_segments(&self, track: &CaptionTrack) -> AppResult<Vec<TranscriptSegment>> {
        let url = format!("{}&fmt=json3", track.base_url);
        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::upstream(
                UpstreamReason::UpstreamFailure,
                format!("caption request failed: {}", e),
            )
        })?;

        if !response.status().is_success() {
            return Err(AppError::upstream(
                UpstreamReason::UpstreamFailure,
                format!("caption endpoint returned {}", response.status()),
            ));
        }

        let body: Json3Response = response.json().await.map_err(|e| {
            AppError::upstream(
                UpstreamReason::UpstreamFailure,
                format!("caption body unparseable: {}", e),
            )
        })?;

        Ok(flatten_events(body))
    }
}

impl Default for YouTubeTranscriptClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl TranscriptSource for YouTubeTranscriptClient {
    async fn fetch(
        &self,
        video_id: &str,
        preferred_languages: &[String],
    ) -> AppResult<Transcript> {
        tracing::info!("Fetching transcript for video {}", video_id);

        let page = self.fetch_watch_page(video_id).await?;
        let player = extract_player_response(&page)?;
        check_playability(&player)?;

        let tracks = caption_tracks(&player)?;
        let track = select_track(&tracks, preferred_languages).ok_or_else(|| {
            AppError::upstream(
                UpstreamReason::NotFound,
                format!(
                    "no transcript in languages [{}]",
                    preferred_languages.join(", ")
                ),
            )
        })?;

        let segments = self.fetch_track_segments(track).await?;
        tracing::info!(
            "Fetched {} caption segments ({}, {})",
            segments.len(),
            track.language_code,
            if track.is_auto_generated() { "auto" } else { "manual" }
        );

        Ok(Transcript {
            segments,
            language: track.language_code.clone(),
            kind: if track.is_auto_generated() {
                TranscriptKind::Auto
            } else {
                TranscriptKind::Manual
            },
        })
    }
}

/// Locate and parse the embedded `ytInitialPlayerResponse` object.
fn extract_player_response(page: &str) -> AppResult<Value> {
    let marker = "ytInitialPlayerResponse";
    let start = page.find(marker).ok_or_else(|| {
        AppError::upstream(
            UpstreamReason::UpstreamFailure,
            "player response not found in watch page",
        )
    })?;

    let rest = &page[start..];
    let brace = rest.find('{').ok_or_else(|| {
        AppError::upstream(
            UpstreamReason::UpstreamFailure,
            "player response has no object body",
        )
    })?;
    let json = balanced_object(&rest[brace..]).ok_or_else(|| {
        AppError::upstream(
            UpstreamReason::UpstreamFailure,
            "player response object is unterminated",
        )
    })?;

    serde_json::from_str(json).map_err(|e| {
        AppError::upstream(
            UpstreamReason::UpstreamFailure,
            format!("player response unparseable: {}", e),
        )
    })
}

/// Take the JSON object at the start of `text`, tracking brace depth and
/// string/escape state.
fn balanced_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Map a non-OK playability status to an upstream error.
fn check_playability(player: &Value) -> AppResult<()> {
    let status = player["playabilityStatus"]["status"]
        .as_str()
        .unwrap_or("OK");
    if status == "OK" {
        return Ok(());
    }

    let reason = player["playabilityStatus"]["reason"]
        .as_str()
        .unwrap_or(status);
    Err(AppError::upstream(
        UpstreamReason::Unavailable,
        format!("video not playable: {}", reason),
    ))
}

/// Pull the caption track list; its absence means captions are disabled.
fn caption_tracks(player: &Value) -> AppResult<Vec<CaptionTrack>> {
    let tracks = &player["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"];
    if tracks.is_null() {
        return Err(AppError::upstream(
            UpstreamReason::Disabled,
            "video has no caption tracks",
        ));
    }

    serde_json::from_value(tracks.clone()).map_err(|e| {
        AppError::upstream(
            UpstreamReason::UpstreamFailure,
            format!("caption track list unparseable: {}", e),
        )
    })
}

/// Pick a track: for each preferred language in order, a manual track
/// beats an auto-generated one; any language match beats none.
fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    preferred_languages: &[String],
) -> Option<&'a CaptionTrack> {
    for language in preferred_languages {
        if let Some(track) = tracks
            .iter()
            .find(|t| t.matches_language(language) && !t.is_auto_generated())
        {
            return Some(track);
        }
        if let Some(track) = tracks.iter().find(|t| t.matches_language(language)) {
            return Some(track);
        }
    }
    None
}

/// Flatten json3 events into timed segments, skipping non-text events.
fn flatten_events(body: Json3Response) -> Vec<TranscriptSegment> {
    body.events
        .into_iter()
        .filter_map(|event| {
            let segs = event.segs?;
            let text: String = segs
                .into_iter()
                .filter_map(|seg| seg.utf8)
                .collect::<Vec<_>>()
                .concat();
            if text.trim().is_empty() {
                return None;
            }
            Some(TranscriptSegment {
                text,
                start: event.start_ms.unwrap_or(0) as f64 / 1000.0,
                duration: event.duration_ms.unwrap_or(0) as f64 / 1000.0,
            })
        })
        .collect()
}
