//! Export formatter.
//!
//! # Responsibility
//! - Turn a note's title and rich content into downloadable payloads.
//!
//! # Invariants
//! - Output is a pure function of `(title, content, format, date)`.
//! - No storage access; delivering the payload is the adapter's job.

use crate::service::text::{escape_html, format_calendar_date, text_content};
use chrono::NaiveDate;

/// Fallback title used when the document title is blank.
pub const EXPORT_FALLBACK_TITLE: &str = "notepadzilla_note";
const EXPORT_SIGNATURE: &str = "Exported from NotepadZilla";

const HTML_STYLE: &str = "body {
    font-family: Arial, sans-serif;
    line-height: 1.6;
    padding: 40px;
    max-width: 800px;
    margin: 0 auto;
    color: #333;
}
h1 {
    color: #2563eb;
    border-bottom: 2px solid #e5e7eb;
    padding-bottom: 10px;
    margin-bottom: 20px;
}
.content {
    margin-top: 20px;
}
.footer {
    margin-top: 40px;
    padding-top: 20px;
    border-top: 1px solid #e5e7eb;
    color: #6b7280;
    font-size: 0.9rem;
    text-align: center;
}";

/// Supported export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Standalone markup document with content embedded verbatim.
    Html,
    /// Text nodes only.
    Text,
    /// Word-processor stand-in: plain text with a title line.
    Docx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Text => "txt",
            Self::Docx => "docx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Html => "text/html",
            Self::Text => "text/plain",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// In-memory export result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    /// Suggested download name, `{title}.{ext}`.
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportPayload {
    /// Payload as UTF-8 text. Every format is textual.
    pub fn as_text(&self) -> &str {
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }
}

/// Renders one export payload.
pub fn export_document(
    title: &str,
    content: &str,
    format: ExportFormat,
    exported_on: NaiveDate,
) -> ExportPayload {
    let title = export_title(title);
    let date = format_calendar_date(exported_on);
    let body = match format {
        ExportFormat::Html => render_html(&title, content, &date),
        ExportFormat::Text => format!(
            "{title}\n\n{}\n\n---\n{EXPORT_SIGNATURE} on {date}",
            text_content(content)
        ),
        ExportFormat::Docx => format!(
            "Title: {title}\n\n{}\n\n{EXPORT_SIGNATURE}",
            text_content(content)
        ),
    };

    ExportPayload {
        filename: format!("{}.{}", filename_stem(&title), format.extension()),
        content_type: format.content_type(),
        bytes: body.into_bytes(),
    }
}

fn render_html(title: &str, content: &str, date: &str) -> String {
    let title = escape_html(title);
    format!(
        "<!DOCTYPE html>
<html>
<head>
<meta charset=\"UTF-8\">
<title>{title}</title>
<style>
{HTML_STYLE}
</style>
</head>
<body>
<h1>{title}</h1>
<div class=\"content\">{content}</div>
<div class=\"footer\">
{EXPORT_SIGNATURE} on {date}
</div>
</body>
</html>
"
    )
}

fn export_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        EXPORT_FALLBACK_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

fn filename_stem(title: &str) -> String {
    title
        .chars()
        .map(|ch| match ch {
            '/' | '\\' => '_',
            ch if ch.is_control() => '_',
            ch => ch,
        })
        .collect()
}
