//! Plain-text projection of rich note content.
//!
//! # Responsibility
//! - Strip markup from rich payloads for previews, metrics and exports.
//! - Render the relative "last saved" label shown next to the editor.
//!
//! # Invariants
//! - All functions are pure; none touch storage or the clock.
//! - `plain_text` never contains leading/trailing or repeated whitespace.

use crate::model::note::{PREVIEW_MAX_CHARS, PREVIEW_TRUNCATION_MARKER};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static BLOCK_BREAK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)<br\s*/?>|</?(?:p|div|li|ul|ol|h[1-6]|blockquote|pre|tr|table|section|article)\b[^>]*>",
    )
    .expect("valid block tag regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);").expect("valid entity regex")
});
static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("valid blank lines regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const MS_PER_MINUTE: i64 = 60_000;
const MS_PER_HOUR: i64 = 3_600_000;
const MS_PER_DAY: i64 = 86_400_000;

/// Returns the text nodes of `html`, keeping line structure.
///
/// Block-level tags and `<br>` become line breaks; other tags are dropped
/// and common entities are decoded.
pub fn text_content(html: &str) -> String {
    let with_breaks = BLOCK_BREAK_RE.replace_all(html, "\n");
    let without_tags = TAG_RE.replace_all(&with_breaks, "");
    let decoded = decode_entities(&without_tags);
    let squeezed = BLANK_LINES_RE.replace_all(&decoded, "\n\n");
    squeezed.trim_matches(|c| c == '\n' || c == '\r').to_string()
}

/// Returns the whitespace-collapsed plain-text projection of `html`.
pub fn plain_text(html: &str) -> String {
    let text = text_content(html);
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Derives the list preview: first 100 projected chars plus `...` when cut.
pub fn derive_preview(html: &str) -> String {
    truncate_preview(&plain_text(html))
}

fn truncate_preview(text: &str) -> String {
    let mut preview: String = text.chars().take(PREVIEW_MAX_CHARS).collect();
    if text.chars().count() > PREVIEW_MAX_CHARS {
        preview.push_str(PREVIEW_TRUNCATION_MARKER);
    }
    preview
}

/// Derived metrics for one content payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextMetrics {
    pub word_count: u32,
    pub char_count: u32,
}

/// Counts words (whitespace separated) and characters of the projection.
pub fn text_metrics(html: &str) -> TextMetrics {
    let text = plain_text(html);
    TextMetrics {
        word_count: saturating_u32(text.split_whitespace().count()),
        char_count: saturating_u32(text.chars().count()),
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Escapes text for embedding inside HTML markup.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures<'_>| {
            let body = &caps[1];
            decode_entity(body).map_or_else(|| caps[0].to_string(), |ch| ch.to_string())
        })
        .into_owned()
}

fn decode_entity(body: &str) -> Option<char> {
    if let Some(hex) = body
        .strip_prefix("#x")
        .or_else(|| body.strip_prefix("#X"))
    {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(decimal) = body.strip_prefix('#') {
        return decimal.parse::<u32>().ok().and_then(char::from_u32);
    }
    match body {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => None,
    }
}

/// Formats how long ago `updated_at_ms` was, relative to `now_ms`.
///
/// `<60s` "Just now", `<1h` "N minutes ago", `<1d` "N hours ago", otherwise
/// the local calendar date.
pub fn relative_time_label(updated_at_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(updated_at_ms);
    if diff < MS_PER_MINUTE {
        return "Just now".to_string();
    }
    if diff < MS_PER_HOUR {
        return format!("{} minutes ago", diff / MS_PER_MINUTE);
    }
    if diff < MS_PER_DAY {
        return format!("{} hours ago", diff / MS_PER_HOUR);
    }
    calendar_date(updated_at_ms)
}

/// Renders an epoch-ms timestamp as a local `M/D/YYYY` date.
pub fn calendar_date(epoch_ms: i64) -> String {
    format_calendar_date(local_date(epoch_ms))
}

/// `M/D/YYYY` without zero padding.
pub fn format_calendar_date(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

/// Local calendar day of an epoch-ms timestamp (UTC when ambiguous).
pub fn local_date(epoch_ms: i64) -> NaiveDate {
    match Local.timestamp_millis_opt(epoch_ms).single() {
        Some(local) => local.date_naive(),
        None => DateTime::<Utc>::from_timestamp_millis(epoch_ms)
            .map(|utc| utc.date_naive())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        calendar_date, derive_preview, escape_html, format_calendar_date, plain_text,
        relative_time_label, text_content, text_metrics,
    };
    use chrono::NaiveDate;

    #[test]
    fn plain_text_strips_tags_and_collapses_whitespace() {
        let html = "<p>Hello   <b>world</b></p><p>again&nbsp;&amp; again</p>";
        assert_eq!(plain_text(html), "Hello world again & again");
    }

    #[test]
    fn text_content_keeps_paragraph_breaks() {
        assert_eq!(text_content("<p>one</p><p>two</p>"), "one\n\ntwo");
        assert_eq!(text_content("a<br>b"), "a\nb");
    }

    #[test]
    fn numeric_entities_decode_and_unknown_ones_survive() {
        assert_eq!(plain_text("&#72;&#x69; &bogus;"), "Hi &bogus;");
    }

    #[test]
    fn preview_truncates_at_100_chars_with_marker() {
        let long = "x".repeat(150);
        let preview = derive_preview(&long);
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.ends_with("..."));
        assert_eq!(derive_preview("short"), "short");
    }

    #[test]
    fn metrics_count_projected_text() {
        let metrics = text_metrics("<div>Hello <i>big</i></div><div>world</div>");
        assert_eq!(metrics.word_count, 3);
        assert_eq!(metrics.char_count, "Hello big world".len() as u32);
        assert_eq!(text_metrics("   ").word_count, 0);
    }

    #[test]
    fn escape_html_escapes_markup_characters() {
        assert_eq!(escape_html("<a & 'b'>"), "&lt;a &amp; &#39;b&#39;&gt;");
    }

    #[test]
    fn relative_labels_follow_thresholds() {
        let now = 10_000_000_000;
        assert_eq!(relative_time_label(now - 45_000, now), "Just now");
        assert_eq!(relative_time_label(now - 125_000, now), "2 minutes ago");
        assert_eq!(relative_time_label(now - 7_300_000, now), "2 hours ago");
        assert_eq!(relative_time_label(now + 5_000, now), "Just now");
        assert_eq!(
            relative_time_label(now - 90_000_000, now),
            calendar_date(now - 90_000_000)
        );
    }

    #[test]
    fn calendar_dates_are_unpadded_month_day_year() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(format_calendar_date(date), "3/5/2024");
        let date = NaiveDate::from_ymd_opt(2023, 11, 28).unwrap();
        assert_eq!(format_calendar_date(date), "11/28/2023");
    }
}
