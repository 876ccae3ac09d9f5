//! Windows-safe filename construction.
//!
//! Format: `YYYY-MM-DD__<slug>__<video_id>.md`. The slug is derived from
//! the video title; the date and video id make the name collision-resistant
//! across re-ingestions of differently titled videos.

use chrono::{Local, NaiveDate};

/// Default cap on the total filename length.
pub const DEFAULT_MAX_FILENAME_LEN: usize = 200;

/// Device names Windows refuses as file stems, case-insensitively.
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Characters invalid in Windows filenames.
const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Build a filesystem-safe filename from a title and video id, stamped
/// with today's local date.
pub fn build_filename(title: &str, video_id: &str) -> String {
    build_filename_for_date(
        title,
        video_id,
        DEFAULT_MAX_FILENAME_LEN,
        Local::now().date_naive(),
    )
}

/// Build a filename for a specific date. Pure function of its inputs;
/// tests inject a fixed date here instead of relying on the wall clock.
pub fn build_filename_for_date(
    title: &str,
    video_id: &str,
    max_length: usize,
    date: NaiveDate,
) -> String {
    let mut slug = slugify(title);

    // Budget left for the slug once the fixed parts are accounted for:
    // "YYYY-MM-DD__" + "__<video_id>" + ".md"
    let fixed_len = "YYYY-MM-DD__".len() + video_id.len() + "__.md".len();
    let budget = max_length.saturating_sub(fixed_len);
    if slug.len() > budget {
        slug = truncate_at_boundary(&slug, budget);
        slug = slug.trim_end_matches('-').to_string();
    }

    let date_prefix = date.format("%Y-%m-%d").to_string();
    let filename = format!("{}__{}__{}.md", date_prefix, slug, video_id);

    // Safety net for reserved device names
    let stem = filename.strip_suffix(".md").unwrap_or(&filename);
    if is_reserved_name(stem) {
        return format!("video__{}__{}.md", slug, video_id);
    }

    filename
}

/// Lower-case the title and collapse whitespace runs and invalid characters
/// into single hyphens.
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.to_lowercase().chars() {
        if c.is_whitespace() || INVALID_CHARS.contains(&c) {
            pending_hyphen = !slug.is_empty();
        } else {
            if pending_hyphen {
                slug.push('-');
                pending_hyphen = false;
            }
            slug.push(c);
        }
    }

    // Collapse hyphens the title itself contained
    let mut collapsed = String::with_capacity(slug.len());
    let mut last_was_hyphen = false;
    for c in slug.chars() {
        if c == '-' {
            if !last_was_hyphen {
                collapsed.push(c);
            }
            last_was_hyphen = true;
        } else {
            collapsed.push(c);
            last_was_hyphen = false;
        }
    }

    collapsed.trim_matches('-').to_string()
}

/// Check a file stem against the reserved device names.
fn is_reserved_name(stem: &str) -> bool {
    RESERVED_NAMES
        .iter()
        .any(|reserved| stem.eq_ignore_ascii_case(reserved))
}

/// Truncate at a char boundary at or below `max_bytes`.
fn truncate_at_boundary(s: &str, max_bytes: usize) -> String {
    let mut end = max_bytes.min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_basic_filename() {
        let name = build_filename_for_date("My: Talk?", "abc12345678", 200, fixed_date());
        assert_eq!(name, "2024-01-01__my-talk__abc12345678.md");
    }

    #[test]
    fn test_whitespace_and_invalid_char_runs_collapse() {
        let name =
            build_filename_for_date("What  is /  AI|really*?", "abc12345678", 200, fixed_date());
        assert_eq!(name, "2024-01-01__what-is-ai-really__abc12345678.md");
    }

    #[test]
    fn test_repeated_hyphens_collapse() {
        let name = build_filename_for_date("a -- b --- c", "abc12345678", 200, fixed_date());
        assert_eq!(name, "2024-01-01__a-b-c__abc12345678.md");
    }

    #[test]
    fn test_long_title_truncated_within_budget() {
        let title = "word ".repeat(100);
        let name = build_filename_for_date(&title, "abc12345678", 200, fixed_date());
        assert!(name.len() <= 200);
        assert!(name.starts_with("2024-01-01__word-word"));
        assert!(name.ends_with("__abc12345678.md"));
        // Truncation never leaves a dangling hyphen before the separator
        assert!(!name.contains("-__"));
    }

    #[test]
    fn test_empty_title_still_unique() {
        let name = build_filename_for_date("", "abc12345678", 200, fixed_date());
        assert_eq!(name, "2024-01-01____abc12345678.md");
    }

    #[test]
    fn test_reserved_names_detected() {
        assert!(is_reserved_name("CON"));
        assert!(is_reserved_name("con"));
        assert!(is_reserved_name("Lpt9"));
        assert!(!is_reserved_name("console"));
        assert!(!is_reserved_name("2024-01-01__con__abc12345678"));
    }

    #[test]
    fn test_unicode_title_truncates_on_char_boundary() {
        let title = "é".repeat(300);
        let name = build_filename_for_date(&title, "abc12345678", 200, fixed_date());
        assert!(name.len() <= 200);
        assert!(name.ends_with("__abc12345678.md"));
    }
}
