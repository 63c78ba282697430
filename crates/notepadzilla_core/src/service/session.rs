//! Editing session controller.
//!
//! # Responsibility
//! - Own the live note, its unsaved draft and the last-saved snapshot.
//! - Orchestrate saves into the current-note slot and the notes list.
//! - Drive fixed-rate autosave and switch/create semantics.
//!
//! # Invariants
//! - Dirty detection is a value comparison of the normalized draft against
//!   the last-saved snapshot; a failed save keeps the session `Dirty`.
//! - A save requested while `Saving` is skipped, never queued.
//! - Switching or creating never discards unsaved edits: a failed implicit
//!   save aborts the operation.
//! - `created_at` of the live note survives every save.
//! - Concurrent sessions on one store are last-writer-wins; no locking.

use crate::clock::Clock;
use crate::config::CoreConfig;
use crate::model::note::{normalize_title, Note, NoteId};
use crate::model::settings::EditorSettings;
use crate::repo::note_repo::NoteRepository;
use crate::repo::settings_repo::SettingsRepository;
use crate::repo::RepoError;
use crate::service::autosave::AutosaveSchedule;
use crate::service::export::{export_document, ExportFormat, ExportPayload};
use crate::service::text::{
    derive_preview, escape_html, local_date, relative_time_label, text_content, text_metrics,
};
use crate::storage::StorageHealth;
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SessionResult<T> = Result<T, SessionError>;

/// Save lifecycle of the live note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Draft matches the last-saved snapshot.
    Idle,
    /// Draft has edits that are not persisted (or the last save failed).
    Dirty,
    /// A save is writing to storage.
    Saving,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dirty => "dirty",
            Self::Saving => "saving",
        }
    }
}

/// Errors from session operations.
#[derive(Debug)]
pub enum SessionError {
    /// Persistence failed; the draft is kept and the session stays `Dirty`.
    Repo(RepoError),
    /// Switch/create was requested while a save was still in flight.
    SaveInFlight,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::SaveInFlight => write!(f, "a save is already in progress"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::SaveInFlight => None,
        }
    }
}

impl From<RepoError> for SessionError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Note written to the current slot and the list.
    Saved(Note),
    /// Another save was in flight; nothing was written.
    Skipped,
}

/// Result of a switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    Switched,
    /// No listed note has the requested id; the session is unchanged.
    NotFound,
}

/// Snapshot pushed to the presentation adapter after each transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub note_id: NoteId,
    pub state: SessionState,
    /// Metrics of the current draft.
    pub word_count: u32,
    pub char_count: u32,
    /// Relative label for the live note's `updated_at`.
    pub last_saved_label: String,
    /// Set when the most recent save attempt failed.
    pub last_save_failed: bool,
    pub storage: StorageHealth,
}

/// Receiver of outbound session notifications.
pub trait SessionListener {
    fn on_status(&mut self, status: &SessionStatus);
}

impl<F: FnMut(&SessionStatus)> SessionListener for F {
    fn on_status(&mut self, status: &SessionStatus) {
        self(status);
    }
}

/// Explicit session value: live note, draft and save state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    live: Note,
    draft_title: String,
    draft_content: String,
    state: SessionState,
    last_save_failed: bool,
}

impl Session {
    /// Starts an `Idle` session on `note`.
    pub fn from_note(note: Note) -> Self {
        Self {
            draft_title: note.title.clone(),
            draft_content: note.content.clone(),
            live: note,
            state: SessionState::Idle,
            last_save_failed: false,
        }
    }

    /// Last-saved (or loaded) snapshot of the live note.
    pub fn live_note(&self) -> &Note {
        &self.live
    }

    pub fn draft_title(&self) -> &str {
        &self.draft_title
    }

    pub fn draft_content(&self) -> &str {
        &self.draft_content
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn last_save_failed(&self) -> bool {
        self.last_save_failed
    }

    fn differs_from_snapshot(&self) -> bool {
        normalize_title(&self.draft_title) != self.live.title
            || self.draft_content != self.live.content
    }

    fn refresh_state(&mut self) {
        if self.state == SessionState::Saving {
            return;
        }
        self.state = if self.last_save_failed || self.differs_from_snapshot() {
            SessionState::Dirty
        } else {
            SessionState::Idle
        };
    }

    fn build_saved_note(&self, now_ms: i64) -> Note {
        let metrics = text_metrics(&self.draft_content);
        Note {
            id: self.live.id,
            title: normalize_title(&self.draft_title),
            content: self.draft_content.clone(),
            preview: derive_preview(&self.draft_content),
            created_at: self.live.created_at,
            updated_at: now_ms.max(self.live.created_at),
            word_count: metrics.word_count,
            char_count: metrics.char_count,
        }
    }
}

/// Session controller over a note repository and a clock.
pub struct SessionController<R, C>
where
    R: NoteRepository + SettingsRepository,
    C: Clock,
{
    repo: R,
    clock: C,
    session: Session,
    autosave: AutosaveSchedule,
    storage: StorageHealth,
    listener: Option<Box<dyn SessionListener + Send>>,
}

impl<R, C> SessionController<R, C>
where
    R: NoteRepository + SettingsRepository,
    C: Clock,
{
    /// Initializes a session from the current-note slot and starts autosave.
    ///
    /// A store that cannot be read at startup is reported once through
    /// `StorageHealth::Unavailable`; the session then edits a default note
    /// in memory and later saves fail fast.
    pub fn open(repo: R, clock: C, config: &CoreConfig) -> Self {
        let now = clock.now_ms();
        let (note, storage) = match repo.load_current(now) {
            Ok(note) => (note, StorageHealth::Available),
            Err(err) => {
                error!(
                    "event=session_open module=session status=error error_code=storage_unavailable error={}",
                    err
                );
                (Note::new_default(now), StorageHealth::Unavailable)
            }
        };

        let mut autosave = AutosaveSchedule::new(config.autosave_interval_ms);
        autosave.start(now);
        info!(
            "event=session_open module=session status=ok note_id={} storage={:?} autosave_interval_ms={}",
            note.id,
            storage,
            autosave.interval_ms()
        );

        Self {
            repo,
            clock,
            session: Session::from_note(note),
            autosave,
            storage,
            listener: None,
        }
    }

    /// Registers the outbound status listener, replacing any previous one.
    pub fn set_listener(&mut self, listener: impl SessionListener + Send + 'static) {
        self.listener = Some(Box::new(listener));
        self.notify();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn storage_health(&self) -> StorageHealth {
        self.storage
    }

    pub fn autosave(&self) -> &AutosaveSchedule {
        &self.autosave
    }

    /// Whether leaving now would lose edits.
    pub fn has_unsaved_changes(&self) -> bool {
        self.session.state != SessionState::Idle
    }

    /// Replaces the draft title.
    pub fn edit_title(&mut self, title: impl Into<String>) {
        self.session.draft_title = title.into();
        self.after_edit();
    }

    /// Replaces the draft rich-text payload.
    pub fn edit_content(&mut self, content: impl Into<String>) {
        self.session.draft_content = content.into();
        self.after_edit();
    }

    /// Drops all markup from the draft, keeping its text.
    pub fn clear_formatting(&mut self) {
        let text = text_content(&self.session.draft_content);
        self.session.draft_content = escape_html(&text).replace('\n', "<br>");
        self.after_edit();
    }

    fn after_edit(&mut self) {
        let before = self.session.state;
        self.session.refresh_state();
        if before != self.session.state {
            debug!(
                "event=session_state module=session from={} to={}",
                before.as_str(),
                self.session.state.as_str()
            );
        }
        self.notify();
    }

    /// Persists the draft to the current-note slot and the notes list.
    ///
    /// # Errors
    /// - Returns `SessionError::Repo` when either write fails; the session
    ///   is left `Dirty` with `last_save_failed` set so the save can be
    ///   retried.
    pub fn save(&mut self) -> SessionResult<SaveOutcome> {
        if self.session.state == SessionState::Saving {
            debug!("event=session_save module=session status=skipped reason=save_in_flight");
            return Ok(SaveOutcome::Skipped);
        }

        self.session.state = SessionState::Saving;
        self.notify();

        let note = self.session.build_saved_note(self.clock.now_ms());
        let written = self
            .repo
            .save_current(&note)
            .and_then(|()| self.repo.upsert(&note));

        match written {
            Ok(()) => {
                self.session.live = note.clone();
                self.session.last_save_failed = false;
                self.session.state = SessionState::Idle;
                self.session.refresh_state();
                info!(
                    "event=session_save module=session status=ok note_id={} word_count={} char_count={}",
                    note.id, note.word_count, note.char_count
                );
                self.notify();
                Ok(SaveOutcome::Saved(note))
            }
            Err(err) => {
                self.session.last_save_failed = true;
                self.session.state = SessionState::Dirty;
                error!(
                    "event=session_save module=session status=error note_id={} error={}",
                    note.id, err
                );
                self.notify();
                Err(err.into())
            }
        }
    }

    /// Runs a due autosave tick against the controller clock.
    ///
    /// Saves only when the schedule is due and the session is `Dirty`.
    /// Returns `None` when nothing was attempted.
    pub fn autosave_tick(&mut self) -> SessionResult<Option<SaveOutcome>> {
        if !self.autosave.poll(self.clock.now_ms()) {
            return Ok(None);
        }

        match self.session.state {
            SessionState::Dirty => self.save().map(Some),
            SessionState::Saving => {
                debug!("event=autosave module=session status=skipped reason=save_in_flight");
                Ok(Some(SaveOutcome::Skipped))
            }
            SessionState::Idle => Ok(None),
        }
    }

    /// Makes the listed note `id` the live note, saving unsaved edits first.
    pub fn switch_to(&mut self, id: NoteId) -> SessionResult<SwitchOutcome> {
        self.save_before_leaving()?;

        let Some(target) = self.repo.get(id)? else {
            info!("event=session_switch module=session status=not_found note_id={id}");
            return Ok(SwitchOutcome::NotFound);
        };

        self.mirror_current_slot(&target, "session_switch");
        self.remember_active_note(target.id);

        info!("event=session_switch module=session status=ok note_id={}", target.id);
        self.session = Session::from_note(target);
        self.notify();
        Ok(SwitchOutcome::Switched)
    }

    /// Replaces the live note with a fresh default note, saving unsaved
    /// edits first. The fresh note is mirrored to the current-note slot but
    /// only joins the list on its first save.
    pub fn create_new(&mut self) -> SessionResult<&Note> {
        self.save_before_leaving()?;

        let note = Note::new_default(self.clock.now_ms());
        self.mirror_current_slot(&note, "session_create");
        info!("event=session_create module=session status=ok note_id={}", note.id);
        self.session = Session::from_note(note);
        self.notify();
        Ok(&self.session.live)
    }

    fn save_before_leaving(&mut self) -> SessionResult<()> {
        match self.session.state {
            SessionState::Idle => Ok(()),
            SessionState::Saving => Err(SessionError::SaveInFlight),
            SessionState::Dirty => match self.save()? {
                SaveOutcome::Saved(_) => Ok(()),
                SaveOutcome::Skipped => Err(SessionError::SaveInFlight),
            },
        }
    }

    /// Points the current-note slot at `note` so a restart reopens it.
    /// The list is left untouched; failures are logged only.
    fn mirror_current_slot(&self, note: &Note, event: &str) {
        if let Err(err) = self.repo.save_current(note) {
            warn!(
                "event={} module=session status=partial error_code=current_slot_write_failed error={}",
                event, err
            );
        }
    }

    fn remember_active_note(&self, id: NoteId) {
        let result = self.repo.load_settings().and_then(|mut settings| {
            settings.last_active_note = Some(id);
            self.repo.save_settings(&settings)
        });
        if let Err(err) = result {
            warn!("event=settings_save module=session status=error error={err}");
        }
    }

    /// Lists saved notes, most recently saved first.
    pub fn list(&self) -> SessionResult<Vec<Note>> {
        Ok(self.repo.list()?)
    }

    /// Exports the current draft.
    pub fn export(&self, format: ExportFormat) -> ExportPayload {
        export_document(
            &self.session.draft_title,
            &self.session.draft_content,
            format,
            local_date(self.clock.now_ms()),
        )
    }

    pub fn load_settings(&self) -> SessionResult<EditorSettings> {
        Ok(self.repo.load_settings()?)
    }

    pub fn save_settings(&self, settings: &EditorSettings) -> SessionResult<()> {
        Ok(self.repo.save_settings(settings)?)
    }

    /// Current outbound status snapshot.
    pub fn status(&self) -> SessionStatus {
        let metrics = text_metrics(&self.session.draft_content);
        SessionStatus {
            note_id: self.session.live.id,
            state: self.session.state,
            word_count: metrics.word_count,
            char_count: metrics.char_count,
            last_saved_label: relative_time_label(
                self.session.live.updated_at,
                self.clock.now_ms(),
            ),
            last_save_failed: self.session.last_save_failed,
            storage: self.storage,
        }
    }

    fn notify(&mut self) {
        if self.listener.is_none() {
            return;
        }
        let status = self.status();
        if let Some(listener) = self.listener.as_mut() {
            listener.on_status(&status);
        }
    }

    /// Cancels autosave and hands back the final session value.
    pub fn shutdown(mut self) -> Session {
        self.autosave.cancel();
        info!(
            "event=session_shutdown module=session status=ok note_id={} unsaved={}",
            self.session.live.id,
            self.has_unsaved_changes()
        );
        self.session
    }
}
