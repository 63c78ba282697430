//! Editor settings persistence.

use crate::model::record::{decode_settings, encode_settings};
use crate::model::settings::EditorSettings;
use crate::repo::note_repo::KvNoteRepository;
use crate::repo::RepoResult;
use crate::storage::{KeyValueStore, SETTINGS_KEY};
use log::warn;

/// Repository interface for editor preferences.
pub trait SettingsRepository {
    /// Returns stored settings, or defaults when absent or malformed.
    fn load_settings(&self) -> RepoResult<EditorSettings>;
    fn save_settings(&self, settings: &EditorSettings) -> RepoResult<()>;
}

impl<S: KeyValueStore> SettingsRepository for KvNoteRepository<S> {
    fn load_settings(&self) -> RepoResult<EditorSettings> {
        let Some(raw) = self.store().get(SETTINGS_KEY)? else {
            return Ok(EditorSettings::default());
        };

        match decode_settings(&raw) {
            Ok(settings) => Ok(settings),
            Err(err) => {
                warn!(
                    "event=settings_load module=repo status=error error_code=malformed_record source=default error={}",
                    err
                );
                Ok(EditorSettings::default())
            }
        }
    }

    fn save_settings(&self, settings: &EditorSettings) -> RepoResult<()> {
        let encoded = encode_settings(settings)?;
        self.store().set(SETTINGS_KEY, &encoded)?;
        Ok(())
    }
}
