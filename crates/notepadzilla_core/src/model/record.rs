//! Versioned envelopes for values written to the key-value store.
//!
//! # Responsibility
//! - Encode notes, note lists and settings as versioned JSON documents.
//! - Decode stored text with schema and invariant validation.
//!
//! # Invariants
//! - Every envelope carries `version`; unknown versions are rejected.
//! - Decoded notes always pass `Note::validate()`.
//! - List decoding drops individually invalid entries instead of failing the
//!   whole list; callers receive the count of dropped entries.

use crate::model::note::{Note, NoteValidationError};
use crate::model::settings::EditorSettings;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Schema version written by this binary.
pub const RECORD_VERSION: u32 = 1;

/// A persisted value that could not be decoded.
#[derive(Debug)]
pub enum RecordError {
    Json(serde_json::Error),
    UnsupportedVersion(u32),
    InvalidNote(NoteValidationError),
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed record: {err}"),
            Self::UnsupportedVersion(version) => write!(
                f,
                "unsupported record version {version}; expected {RECORD_VERSION}"
            ),
            Self::InvalidNote(err) => write!(f, "invalid note record: {err}"),
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::UnsupportedVersion(_) => None,
            Self::InvalidNote(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<NoteValidationError> for RecordError {
    fn from(value: NoteValidationError) -> Self {
        Self::InvalidNote(value)
    }
}

/// Version header read before the body so newer layouts are recognized
/// even when their shape differs.
#[derive(Deserialize)]
struct VersionHeader {
    version: u32,
}

#[derive(Serialize)]
struct NoteEnvelopeRef<'a> {
    version: u32,
    note: &'a Note,
}

#[derive(Deserialize)]
struct NoteEnvelope {
    note: Note,
}

#[derive(Serialize)]
struct NoteListEnvelopeRef<'a> {
    version: u32,
    notes: &'a [Note],
}

#[derive(Deserialize)]
struct NoteListEnvelope {
    // Entries stay untyped so one bad note does not poison the list.
    notes: Vec<serde_json::Value>,
}

#[derive(Serialize)]
struct SettingsEnvelopeRef<'a> {
    version: u32,
    settings: &'a EditorSettings,
}

#[derive(Deserialize)]
struct SettingsEnvelope {
    settings: EditorSettings,
}

/// Result of decoding a stored notes list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedNoteList {
    pub notes: Vec<Note>,
    /// Entries skipped because they failed to parse or validate.
    pub dropped: usize,
}

pub fn encode_note(note: &Note) -> Result<String, RecordError> {
    Ok(serde_json::to_string(&NoteEnvelopeRef {
        version: RECORD_VERSION,
        note,
    })?)
}

pub fn decode_note(raw: &str) -> Result<Note, RecordError> {
    check_version(read_version(raw)?)?;
    let envelope: NoteEnvelope = serde_json::from_str(raw)?;
    envelope.note.validate()?;
    Ok(envelope.note)
}

pub fn encode_note_list(notes: &[Note]) -> Result<String, RecordError> {
    Ok(serde_json::to_string(&NoteListEnvelopeRef {
        version: RECORD_VERSION,
        notes,
    })?)
}

pub fn decode_note_list(raw: &str) -> Result<DecodedNoteList, RecordError> {
    check_version(read_version(raw)?)?;
    let envelope: NoteListEnvelope = serde_json::from_str(raw)?;

    let mut notes = Vec::with_capacity(envelope.notes.len());
    let mut dropped = 0;
    for value in envelope.notes {
        match serde_json::from_value::<Note>(value) {
            Ok(note) if note.validate().is_ok() => notes.push(note),
            _ => dropped += 1,
        }
    }

    Ok(DecodedNoteList { notes, dropped })
}

pub fn encode_settings(settings: &EditorSettings) -> Result<String, RecordError> {
    Ok(serde_json::to_string(&SettingsEnvelopeRef {
        version: RECORD_VERSION,
        settings,
    })?)
}

pub fn decode_settings(raw: &str) -> Result<EditorSettings, RecordError> {
    check_version(read_version(raw)?)?;
    let envelope: SettingsEnvelope = serde_json::from_str(raw)?;
    Ok(envelope.settings)
}

fn read_version(raw: &str) -> Result<u32, RecordError> {
    Ok(serde_json::from_str::<VersionHeader>(raw)?.version)
}

fn check_version(version: u32) -> Result<(), RecordError> {
    if version == RECORD_VERSION {
        Ok(())
    } else {
        Err(RecordError::UnsupportedVersion(version))
    }
}
