//! YouTube URL parsing and video-id extraction.
//!
//! Handles the URL shapes users actually paste: `watch?v=`, `youtu.be/`,
//! `shorts/`, `embed/`, mobile hosts, and URLs dragging along tracking
//! parameters or timestamps.

use crate::error::{AppError, AppResult};

/// Video ids are exactly 11 characters of `[A-Za-z0-9_-]`.
const VIDEO_ID_LEN: usize = 11;

/// Extract the 11-character video id from a YouTube URL.
pub fn extract_video_id(url: &str) -> AppResult<String> {
    let url = url.trim();

    if !is_youtube_host(url) {
        return Err(AppError::Input(format!(
            "Could not extract video ID from URL: {}",
            url
        )));
    }

    // Standard watch URLs carry the id in the `v` query parameter
    if let Some(candidate) = query_param(url, "v") {
        if is_video_id(&candidate) {
            return Ok(candidate);
        }
    }

    // Path-based forms: youtu.be/ID, /shorts/ID, /embed/ID
    for marker in ["youtu.be/", "/shorts/", "/embed/"] {
        if let Some(candidate) = segment_after(url, marker) {
            if is_video_id(&candidate) {
                return Ok(candidate);
            }
        }
    }

    Err(AppError::Input(format!(
        "Could not extract video ID from URL: {}",
        url
    )))
}

/// Normalize a watch URL by dropping tracking parameters and timestamps,
/// keeping only the `v` and `list` parameters.
pub fn normalize_watch_url(url: &str) -> String {
    let url = url.trim();
    let base = url.split(['?', '#']).next().unwrap_or(url);

    let mut kept = Vec::new();
    if let Some(v) = query_param(url, "v") {
        kept.push(format!("v={}", v));
    }
    if let Some(list) = query_param(url, "list") {
        kept.push(format!("list={}", list));
    }

    if kept.is_empty() {
        base.to_string()
    } else {
        format!("{}?{}", base, kept.join("&"))
    }
}

/// Degraded identifier for when extraction fails: the final path segment,
/// truncated to the video-id length. Never fails.
pub fn fallback_video_id(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    let mut end = segment.len().min(VIDEO_ID_LEN);
    while end > 0 && !segment.is_char_boundary(end) {
        end -= 1;
    }
    segment[..end].to_string()
}

fn is_youtube_host(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Read a single query parameter value, ignoring the fragment.
fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or(query);

    for pair in query.split('&') {
        if let Some((key, value)) = pair.split_once('=') {
            if key == name && !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Extract the path segment immediately after `marker`.
fn segment_after(url: &str, marker: &str) -> Option<String> {
    let start = url.find(marker)? + marker.len();
    let rest = &url[start..];
    let end = rest
        .find(['/', '?', '#', '&'])
        .unwrap_or(rest.len());
    if end == 0 {
        None
    } else {
        Some(rest[..end].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url() {
        let id = extract_video_id("https://www.youtube.com/watch?v=jNQXAC9IVRw").unwrap();
        assert_eq!(id, "jNQXAC9IVRw");
    }

    #[test]
    fn test_watch_url_with_tracking_params() {
        let id = extract_video_id(
            "https://www.youtube.com/watch?v=jNQXAC9IVRw&t=42s&si=tracking&feature=share",
        )
        .unwrap();
        assert_eq!(id, "jNQXAC9IVRw");
    }

    #[test]
    fn test_short_link() {
        let id = extract_video_id("https://youtu.be/jNQXAC9IVRw?si=abc").unwrap();
        assert_eq!(id, "jNQXAC9IVRw");
    }

    #[test]
    fn test_shorts_and_embed() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/jNQXAC9IVRw").unwrap(),
            "jNQXAC9IVRw"
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/jNQXAC9IVRw").unwrap(),
            "jNQXAC9IVRw"
        );
    }

    #[test]
    fn test_mobile_host() {
        let id = extract_video_id("https://m.youtube.com/watch?v=jNQXAC9IVRw").unwrap();
        assert_eq!(id, "jNQXAC9IVRw");
    }

    #[test]
    fn test_non_youtube_url_rejected() {
        let err = extract_video_id("https://vimeo.com/12345").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_URL");
    }

    #[test]
    fn test_malformed_id_rejected() {
        assert!(extract_video_id("https://www.youtube.com/watch?v=short").is_err());
        assert!(extract_video_id("https://www.youtube.com/watch?v=").is_err());
    }

    #[test]
    fn test_normalize_strips_tracking() {
        let normalized = normalize_watch_url(
            "https://www.youtube.com/watch?v=jNQXAC9IVRw&si=xyz&utm_source=app",
        );
        assert_eq!(
            normalized,
            "https://www.youtube.com/watch?v=jNQXAC9IVRw"
        );
    }

    #[test]
    fn test_normalize_keeps_playlist() {
        let normalized =
            normalize_watch_url("https://www.youtube.com/watch?v=jNQXAC9IVRw&list=PL123&si=x");
        assert!(normalized.contains("v=jNQXAC9IVRw"));
        assert!(normalized.contains("list=PL123"));
        assert!(!normalized.contains("si=x"));
    }

    #[test]
    fn test_fallback_video_id() {
        assert_eq!(
            fallback_video_id("https://example.com/videos/jNQXAC9IVRw"),
            "jNQXAC9IVRw"
        );
        assert_eq!(
            fallback_video_id("https://example.com/a-very-long-segment-name"),
            "a-very-long"
        );
    }
}
