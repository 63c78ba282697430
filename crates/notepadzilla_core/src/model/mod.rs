//! Domain model for persisted notes and editor preferences.
//!
//! # Responsibility
//! - Define the note record and its validation rules.
//! - Define the versioned envelopes written to the key-value store.
//!
//! # Invariants
//! - Every note is identified by a stable `NoteId`.
//! - Notes are never hard-deleted by core; the history cap evicts them.

pub mod note;
pub mod record;
pub mod settings;
