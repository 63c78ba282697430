//! Note repository contracts and key-value implementation.
//!
//! # Responsibility
//! - Own the bounded, head-first notes list and the current-note slot.
//! - Provide upsert/list/get plus current-slot load/save.
//!
//! # Invariants
//! - List ids are unique; an upsert moves the note to the head.
//! - The list never exceeds `cap` entries; tail entries are evicted first.
//! - The current-note slot is independent of list eviction.
//! - Reads are side-effect free: malformed values fall back to defaults in
//!   memory and are not rewritten.
//! - A list written with a newer record version is never overwritten; upserts
//!   fail with `RepoError::IncompatibleRecord` instead.

use crate::config::CoreConfig;
use crate::model::note::{Note, NoteId};
use crate::model::record::{
    decode_note, decode_note_list, encode_note, encode_note_list, RecordError,
};
use crate::repo::{RepoError, RepoResult};
use crate::storage::{KeyValueStore, CURRENT_NOTE_KEY, NOTES_LIST_KEY};
use log::{debug, warn};

/// Default maximum number of notes kept in the history list.
pub const DEFAULT_HISTORY_CAP: usize = 100;
const HISTORY_CAP_MAX: usize = 1000;

/// Repository interface for the notes list and current-note slot.
pub trait NoteRepository {
    /// Inserts or replaces `note` at the head of the list, then evicts tail
    /// entries beyond the cap.
    fn upsert(&self, note: &Note) -> RepoResult<()>;
    /// Returns all listed notes, most recently saved first.
    fn list(&self) -> RepoResult<Vec<Note>>;
    /// Returns the listed note with `id`, or `None`.
    fn get(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Returns the current-slot note, or a fresh default note when the slot
    /// is absent or unparseable.
    fn load_current(&self, now_ms: i64) -> RepoResult<Note>;
    /// Overwrites the current-note slot verbatim.
    fn save_current(&self, note: &Note) -> RepoResult<()>;
}

/// Key-value backed note repository.
pub struct KvNoteRepository<S: KeyValueStore> {
    store: S,
    cap: usize,
}

impl<S: KeyValueStore> KvNoteRepository<S> {
    /// Creates a repository with the default history cap.
    pub fn new(store: S) -> Self {
        Self::with_cap(store, DEFAULT_HISTORY_CAP)
    }

    /// Creates a repository with a custom history cap (normalized).
    pub fn with_cap(store: S, cap: usize) -> Self {
        Self {
            store,
            cap: normalize_history_cap(cap),
        }
    }

    /// Creates a repository using `config.history_cap`.
    pub fn from_config(store: S, config: &CoreConfig) -> Self {
        Self::with_cap(store, config.history_cap)
    }

    /// Effective history cap.
    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Underlying storage adapter.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn read_list(&self, mode: ListRead) -> RepoResult<Vec<Note>> {
        let Some(raw) = self.store.get(NOTES_LIST_KEY)? else {
            return Ok(Vec::new());
        };

        match decode_note_list(&raw) {
            Ok(decoded) => {
                if decoded.dropped > 0 {
                    warn!(
                        "event=notes_list_decode module=repo status=partial dropped={}",
                        decoded.dropped
                    );
                }
                Ok(decoded.notes)
            }
            Err(err @ RecordError::UnsupportedVersion(_)) if mode == ListRead::ForRewrite => {
                warn!(
                    "event=notes_list_decode module=repo status=error error_code=unsupported_version error={}",
                    err
                );
                Err(RepoError::IncompatibleRecord(err))
            }
            Err(err) => {
                warn!(
                    "event=notes_list_decode module=repo status=error error_code=malformed_record error={}",
                    err
                );
                Ok(Vec::new())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListRead {
    Display,
    /// The caller is about to write the list back.
    ForRewrite,
}

impl<S: KeyValueStore> NoteRepository for KvNoteRepository<S> {
    fn upsert(&self, note: &Note) -> RepoResult<()> {
        note.validate()?;

        let mut notes = self.read_list(ListRead::ForRewrite)?;
        notes.retain(|existing| existing.id != note.id);
        notes.insert(0, note.clone());
        let evicted = notes.len().saturating_sub(self.cap);
        notes.truncate(self.cap);

        let encoded = encode_note_list(&notes)?;
        self.store.set(NOTES_LIST_KEY, &encoded)?;
        debug!(
            "event=notes_upsert module=repo status=ok note_id={} list_len={} evicted={}",
            note.id,
            notes.len(),
            evicted
        );
        Ok(())
    }

    fn list(&self) -> RepoResult<Vec<Note>> {
        self.read_list(ListRead::Display)
    }

    fn get(&self, id: NoteId) -> RepoResult<Option<Note>> {
        Ok(self
            .read_list(ListRead::Display)?
            .into_iter().find(|note| note.id == id))
    }

    fn load_current(&self, now_ms: i64) -> RepoResult<Note> {
        let Some(raw) = self.store.get(CURRENT_NOTE_KEY)? else {
            debug!("event=current_load module=repo status=ok source=default reason=absent");
            return Ok(Note::new_default(now_ms));
        };

        match decode_note(&raw) {
            Ok(note) => Ok(note),
            Err(err) => {
                warn!(
                    "event=current_load module=repo status=error error_code=malformed_record source=default error={}",
                    err
                );
                Ok(Note::new_default(now_ms))
            }
        }
    }

    fn save_current(&self, note: &Note) -> RepoResult<()> {
        note.validate()?;
        let encoded = encode_note(note)?;
        self.store.set(CURRENT_NOTE_KEY, &encoded)?;
        Ok(())
    }
}

/// Clamps a configured history cap into `1..=1000`.
pub fn normalize_history_cap(cap: usize) -> usize {
    cap.clamp(1, HISTORY_CAP_MAX)
}

#[cfg(test)]
mod tests {
    use super::{normalize_history_cap, KvNoteRepository, NoteRepository};
    use crate::config::CoreConfig;
    use crate::model::note::Note;
    use crate::storage::{KeyValueStore, MemoryKeyValueStore, CURRENT_NOTE_KEY, NOTES_LIST_KEY};

    #[test]
    fn history_cap_is_clamped() {
        assert_eq!(normalize_history_cap(0), 1);
        assert_eq!(normalize_history_cap(100), 100);
        assert_eq!(normalize_history_cap(50_000), 1000);
    }

    #[test]
    fn from_config_applies_history_cap() {
        let config = CoreConfig::from_json_str(r#"{"historyCap":3}"#).unwrap();
        let repo = KvNoteRepository::from_config(MemoryKeyValueStore::new(), &config);
        assert_eq!(repo.cap(), 3);
    }

    #[test]
    fn malformed_list_reads_as_empty_without_rewriting() {
        let repo = KvNoteRepository::new(MemoryKeyValueStore::new());
        repo.store().set(NOTES_LIST_KEY, "[not json").unwrap();

        assert!(repo.list().unwrap().is_empty());
        assert_eq!(
            repo.store().get(NOTES_LIST_KEY).unwrap().as_deref(),
            Some("[not json")
        );
    }

    #[test]
    fn malformed_current_slot_yields_default_note() {
        let repo = KvNoteRepository::new(MemoryKeyValueStore::new());
        repo.store().set(CURRENT_NOTE_KEY, "{}").unwrap();

        let note = repo.load_current(42).unwrap();
        assert_eq!(note.created_at, 42);
        assert!(note.content.is_empty());
    }

    #[test]
    fn upsert_moves_existing_note_to_head() {
        let repo = KvNoteRepository::new(MemoryKeyValueStore::new());
        let first = Note::new_default(1);
        let second = Note::new_default(2);
        repo.upsert(&first).unwrap();
        repo.upsert(&second).unwrap();
        repo.upsert(&first).unwrap();

        let ids: Vec<_> = repo.list().unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }
}
