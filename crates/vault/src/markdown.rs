//! Markdown rendering for persisted metadata records.
//!
//! Layout: a YAML front-matter block of scalar fields, then a Summary
//! section, optional Key Points and Chapters sections, and a final
//! Transcript section carrying the verbatim full transcript.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tubescribe_core::schema::VideoMetadata;

/// Render a metadata record as a markdown document.
pub fn render_markdown(metadata: &VideoMetadata, source_label: &str) -> String {
    let mut speakers: Vec<&str> = Vec::new();
    if let Some(ref host) = metadata.host {
        speakers.push(host);
    }
    speakers.extend(metadata.guests.iter().map(String::as_str));
    let speakers_value = if speakers.is_empty() {
        "Unknown".to_string()
    } else {
        speakers.join(", ")
    };

    let topics_value = if metadata.topics.is_empty() {
        "None".to_string()
    } else {
        metadata.topics.join(", ")
    };

    let mut doc = String::new();
    doc.push_str("---\n");
    doc.push_str(&format!("title: {}\n", yaml_scalar(&metadata.title)));
    doc.push_str(&format!(
        "date: {}\n",
        format_date(metadata.date_published.as_deref())
    ));
    doc.push_str(&format!("source: {}\n", yaml_scalar(source_label)));
    doc.push_str(&format!("speakers: {}\n", yaml_scalar(&speakers_value)));
    doc.push_str(&format!("type: {}\n", title_case(&metadata.source_type)));
    doc.push_str(&format!("topics: {}\n", yaml_scalar(&topics_value)));
    doc.push_str("---\n\n");

    doc.push_str("# Summary\n\n");
    doc.push_str(&metadata.summary);
    doc.push('\n');

    if !metadata.key_points.is_empty() {
        doc.push_str("\n## Key Points\n\n");
        for point in &metadata.key_points {
            doc.push_str(&format!("- {}\n", point));
        }
    }

    if !metadata.chapters.is_empty() {
        doc.push_str("\n## Chapters\n");
        for chapter in &metadata.chapters {
            doc.push_str(&format!("\n### {}\n", chapter.title));
            if let Some(ref timestamp) = chapter.timestamp {
                doc.push_str(&format!("*{}*\n", timestamp));
            }
            doc.push('\n');
            doc.push_str(&chapter.summary);
            doc.push('\n');
        }
    }

    doc.push_str("\n## Transcript\n\n");
    doc.push_str(&metadata.transcript);
    doc.push('\n');

    doc
}

/// Format an ISO-8601 date string as `DD-MM-YYYY`, or "Unknown".
pub(crate) fn format_date(date_value: Option<&str>) -> String {
    let Some(raw) = date_value else {
        return "Unknown".to_string();
    };

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()));

    match date {
        Ok(date) => date.format("%d-%m-%Y").to_string(),
        Err(_) => "Unknown".to_string(),
    }
}

/// Quote a scalar for front matter when it contains YAML-significant
/// characters.
fn yaml_scalar(value: &str) -> String {
    if value.is_empty() {
        return "\"\"".to_string();
    }
    let needs_quotes = value.contains([':', '#', '"', '\'', '\n', '[', ']', '{', '}'])
        || value.starts_with(['-', '?', '&', '*', '!', '|', '>', '%', '@']);
    if needs_quotes {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// Upper-case the first ASCII letter ("youtube" -> "Youtube").
fn title_case(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Unknown".to_string(),
    }
}
