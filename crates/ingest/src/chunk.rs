//! Transcript chunking and result merging.
//!
//! Chunking packs whole sentences greedily up to the size limit; a chunk
//! boundary never splits a sentence, at the cost of a single oversized
//! chunk when one sentence alone exceeds the limit. Merging preserves
//! chunk order and first-seen casing while deduplicating case-insensitively.

use std::collections::HashSet;

use tubescribe_core::schema::ChunkExtraction;

/// Default chunk size limit in bytes.
pub const DEFAULT_MAX_CHUNK_SIZE: usize = 100_000;

/// Bound on each slice of the representative sample.
pub const REPRESENTATIVE_SLICE_LEN: usize = 50_000;

/// Merged key points are capped at this many entries.
pub const MAX_KEY_POINTS: usize = 12;

/// Split a transcript into chunks at sentence boundaries.
///
/// Texts within the limit come back as a single chunk, untouched.
pub fn chunk_transcript(text: &str, max_chunk_size: usize) -> Vec<String> {
    if text.len() <= max_chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in text.split(". ") {
        if current.is_empty() {
            current.push_str(sentence);
        } else if current.len() + sentence.len() + 2 <= max_chunk_size {
            current.push_str(". ");
            current.push_str(sentence);
        } else {
            chunks.push(std::mem::take(&mut current));
            current.push_str(sentence);
        }
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Merge per-chunk extraction results into one record, in chunk order.
///
/// Summaries are concatenated verbatim, separated by a blank line — no
/// summarization of summaries. Key points and topics are deduplicated
/// case-insensitively, keeping first-seen order and casing; key points are
/// capped at [`MAX_KEY_POINTS`].
pub fn merge_extractions(results: &[ChunkExtraction]) -> ChunkExtraction {
    let summary = results
        .iter()
        .map(|r| r.summary.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut key_points = dedup_case_insensitive(results.iter().flat_map(|r| r.key_points.iter()));
    key_points.truncate(MAX_KEY_POINTS);

    let topics = dedup_case_insensitive(results.iter().flat_map(|r| r.topics.iter()));

    ChunkExtraction {
        summary,
        key_points,
        topics,
    }
}

/// Build the representative sample used for the structural extraction pass:
/// the first chunk's leading portion plus the last chunk's trailing portion.
pub fn representative_sample(chunks: &[String], slice_len: usize) -> String {
    match chunks {
        [] => String::new(),
        [only] => only.clone(),
        [first, .., last] => {
            let head = &first[..floor_char_boundary(first, slice_len)];
            let tail_start = ceil_char_boundary(last, last.len().saturating_sub(slice_len));
            format!("{}...{}", head, &last[tail_start..])
        }
    }
}

fn dedup_case_insensitive<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item.to_lowercase()) {
            out.push(item.clone());
        }
    }
    out
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut index = index.min(s.len());
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(s: &str, index: usize) -> usize {
    let mut index = index.min(s.len());
    while index < s.len() && !s.is_char_boundary(index) {
        index += 1;
    }
    index
}
