//! Key-value storage adapter.
//!
//! # Responsibility
//! - Expose a narrow `key -> string` get/set/delete facade to the repository
//!   layer.
//! - Hide which backing store (SQLite file, memory, unavailable) is in use.
//!
//! # Invariants
//! - Adapters never interpret stored values; decoding lives in `model::record`.
//! - Every failure surfaces as a `StorageError`; adapters never panic.
//! - The store is shared by independently running sessions; last writer wins.

use crate::db::DbError;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;

mod memory;
mod sqlite;

pub use memory::{MemoryKeyValueStore, UnavailableStore};
pub use sqlite::SqliteKeyValueStore;

/// Key of the single current-note slot.
pub const CURRENT_NOTE_KEY: &str = "current_note";
/// Key of the bounded, head-first notes list.
pub const NOTES_LIST_KEY: &str = "notepadzilla_notes";
/// Key of editor preferences stored alongside the notes.
pub const SETTINGS_KEY: &str = "notepadzilla_settings";

pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by storage adapters.
#[derive(Debug)]
pub enum StorageError {
    /// Underlying store is inaccessible or disabled.
    Unavailable(String),
    /// Backing database failure.
    Backend(DbError),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
            Self::Backend(err) => write!(f, "storage backend failure: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(_) => None,
            Self::Backend(err) => Some(err),
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Backend(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Backend(DbError::Sqlite(value))
    }
}

/// Whether the persistent store could be opened at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageHealth {
    Available,
    /// Session runs in memory only; saves fail fast.
    Unavailable,
}

/// Minimal persistence facade depended on by repositories.
pub trait KeyValueStore {
    /// Reads one value; `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    /// Inserts or overwrites one value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    /// Removes one value. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> StorageResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        (**self).delete(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        (**self).delete(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> StorageResult<()> {
        (**self).delete(key)
    }
}

/// Opens the SQLite store at `path`, degrading to an always-failing store
/// when it cannot be opened.
///
/// The failure is logged once here; callers receive `StorageHealth` so the
/// session can report it instead of retrying the open.
pub fn open_store_or_degrade(
    path: impl AsRef<Path>,
) -> (Box<dyn KeyValueStore + Send>, StorageHealth) {
    match SqliteKeyValueStore::open(path) {
        Ok(store) => {
            info!("event=storage_open module=storage status=ok backend=sqlite");
            (Box::new(store), StorageHealth::Available)
        }
        Err(err) => {
            error!(
                "event=storage_open module=storage status=error error_code=storage_unavailable error={}",
                err
            );
            (
                Box::new(UnavailableStore::new(err.to_string())),
                StorageHealth::Unavailable,
            )
        }
    }
}
