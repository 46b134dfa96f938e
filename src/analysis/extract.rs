//! Heuristic parsing of free-text model replies.
//!
//! None of the section or bullet helpers fail: a reply that does not follow the
//! requested layout degrades to empty sections and lists.

use anyhow::{Context, Result};
use serde_json::Value;

use super::types::DetailedCommentAnalysis;

const MAX_BULLETS: usize = 5;
const DEFAULT_DETAIL_SENTIMENT: &str = "Neutral";

/// Returns the text from the first `start_label` up to the next `end_label`,
/// or to the end of `text` when `end_label` never follows. Matching ignores case.
pub fn extract_section<'a>(text: &'a str, start_label: &str, end_label: &str) -> &'a str {
    let Some(start) = find_ignore_case(text, start_label, 0) else {
        return "";
    };
    let end = find_ignore_case(text, end_label, start).unwrap_or(text.len());
    &text[start..end]
}

/// Picks up to five `-`, `•`, `*` or numbered lines and strips their markers.
pub fn extract_bullet_points(section: &str) -> Vec<String> {
    section
        .split('\n')
        .map(str::trim)
        .filter(|line| is_bullet(line))
        .map(|line| strip_bullet_marker(line).trim())
        .filter(|point| !point.is_empty())
        .take(MAX_BULLETS)
        .map(str::to_string)
        .collect()
}

fn is_bullet(line: &str) -> bool {
    match line.chars().next() {
        Some('-' | '•' | '*') => true,
        Some(c) => is_decimal_digit(c),
        None => false,
    }
}

/// ASCII, Arabic-Indic and Persian decimal digits.
fn is_decimal_digit(c: char) -> bool {
    c.is_ascii_digit() || ('٠'..='٩').contains(&c) || ('۰'..='۹').contains(&c)
}

fn strip_bullet_marker(line: &str) -> &str {
    line.trim_start_matches(|c: char| {
        matches!(c, '-' | '•' | '*' | ' ' | '.' | ')') || c.is_ascii_digit()
    })
}

fn find_ignore_case(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from);
    }
    haystack[from..]
        .char_indices()
        .map(|(offset, _)| from + offset)
        .find(|&start| starts_with_ignore_case(&haystack[start..], needle))
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    let mut text_chars = text.chars();
    prefix.chars().all(|p| {
        text_chars
            .next()
            .is_some_and(|t| t == p || t.to_lowercase().eq(p.to_lowercase()))
    })
}

/// Slice from the first `{` through the last `}`, if they appear in that order.
pub fn carve_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Decodes a per-comment reply of the form `{sentiment, keyPhrases, topics}`
/// that may be wrapped in commentary.
pub fn parse_detail_reply(comment_id: i32, reply: &str) -> Result<DetailedCommentAnalysis> {
    let json = carve_json_object(reply).context("No JSON object found in model reply")?;
    let value: Value = serde_json::from_str(json).context("Model reply is not valid JSON")?;
    let object = value
        .as_object()
        .context("Model reply JSON is not an object")?;

    let sentiment = object
        .get("sentiment")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_DETAIL_SENTIMENT)
        .to_string();

    Ok(DetailedCommentAnalysis {
        comment_id,
        sentiment,
        key_phrases: string_list(object.get("keyPhrases"), "keyPhrases")?,
        topics: string_list(object.get("topics"), "topics")?,
    })
}

fn string_list(value: Option<&Value>, field: &str) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()),
        Some(other) => anyhow::bail!("`{}` must be an array, got {}", field, other),
    }
}
