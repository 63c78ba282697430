//! Repository layer over the key-value storage adapter.
//!
//! # Responsibility
//! - Define use-case oriented access contracts for notes and settings.
//! - Isolate record encoding and key layout from session orchestration.
//!
//! # Invariants
//! - The note repository is the sole writer of the notes list key.
//! - Malformed persisted values are recovered with defaults, never surfaced
//!   as fatal errors; storage failures always propagate.

use crate::model::note::NoteValidationError;
use crate::model::record::RecordError;
use crate::storage::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod note_repo;
pub mod settings_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note/settings persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Note failed invariants and was not written.
    Validation(NoteValidationError),
    /// Value could not be encoded for storage.
    Encode(RecordError),
    /// Stored value uses a record version this build cannot rewrite safely.
    IncompatibleRecord(RecordError),
    Storage(StorageError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode record: {err}"),
            Self::IncompatibleRecord(err) => {
                write!(f, "refusing to overwrite stored record: {err}")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Encode(err) | Self::IncompatibleRecord(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RecordError> for RepoError {
    fn from(value: RecordError) -> Self {
        Self::Encode(value)
    }
}

impl From<StorageError> for RepoError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}
