//! Core persistence and session logic for the NotepadZilla note editor.
//! This crate is the single source of truth for note invariants; the
//! presentation adapter only forwards intents and renders `SessionStatus`.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, init_logging_with_config, logging_status};
pub use model::note::{normalize_title, Note, NoteId, NoteValidationError, DEFAULT_TITLE};
pub use model::settings::EditorSettings;
pub use repo::note_repo::{KvNoteRepository, NoteRepository};
pub use repo::settings_repo::SettingsRepository;
pub use repo::{RepoError, RepoResult};
pub use service::autosave::{AutosaveSchedule, AutosaveWorker};
pub use service::export::{export_document, ExportFormat, ExportPayload};
pub use service::session::{
    SaveOutcome, Session, SessionController, SessionError, SessionListener, SessionResult,
    SessionState, SessionStatus, SwitchOutcome,
};
pub use service::text::relative_time_label;
pub use storage::{
    open_store_or_degrade, KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore,
    StorageError, StorageHealth, StorageResult, UnavailableStore,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
