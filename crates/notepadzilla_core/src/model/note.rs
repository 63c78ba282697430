//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note record and its derived fields.
//! - Provide constructors for the default "untitled" note.
//!
//! # Invariants
//! - `id` is stable and never reassigned.
//! - `created_at` never changes after construction; `updated_at >= created_at`.
//! - `title` is never blank once a note has been normalized.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a note.
pub type NoteId = Uuid;

/// Title substituted whenever the user leaves the title blank.
pub const DEFAULT_TITLE: &str = "Untitled Document";

/// Maximum number of projected characters kept in `preview`.
pub const PREVIEW_MAX_CHARS: usize = 100;

/// Marker appended to truncated previews.
pub const PREVIEW_TRUNCATION_MARKER: &str = "...";

/// One persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Rich-text payload. Opaque to everything except text projection.
    pub content: String,
    #[serde(default)]
    pub preview: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
    #[serde(default)]
    pub word_count: u32,
    #[serde(default)]
    pub char_count: u32,
}

impl Note {
    /// Creates the empty default note with a fresh id.
    pub fn new_default(now_ms: i64) -> Self {
        Self::with_id(Uuid::new_v4(), now_ms)
    }

    /// Creates an empty note with a caller-provided id.
    pub fn with_id(id: NoteId, now_ms: i64) -> Self {
        Self {
            id,
            title: DEFAULT_TITLE.to_string(),
            content: String::new(),
            preview: String::new(),
            created_at: now_ms,
            updated_at: now_ms,
            word_count: 0,
            char_count: 0,
        }
    }

    /// Validates record-level invariants before persistence or after decode.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.trim().is_empty() {
            return Err(NoteValidationError::BlankTitle);
        }
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::UpdatedBeforeCreated {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        let max_preview = PREVIEW_MAX_CHARS + PREVIEW_TRUNCATION_MARKER.len();
        let preview_chars = self.preview.chars().count();
        if preview_chars > max_preview {
            return Err(NoteValidationError::PreviewTooLong(preview_chars));
        }
        Ok(())
    }
}

/// Trims a user-entered title, substituting `DEFAULT_TITLE` when blank.
pub fn normalize_title(title: &str) -> String {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Record-level validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    BlankTitle,
    UpdatedBeforeCreated { created_at: i64, updated_at: i64 },
    PreviewTooLong(usize),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "note title must not be blank"),
            Self::UpdatedBeforeCreated {
                created_at,
                updated_at,
            } => write!(
                f,
                "note updated_at {updated_at} is earlier than created_at {created_at}"
            ),
            Self::PreviewTooLong(len) => write!(f, "note preview too long: {len} chars"),
        }
    }
}

impl Error for NoteValidationError {}
