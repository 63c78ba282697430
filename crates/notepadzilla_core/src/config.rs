//! Core runtime configuration.
//!
//! # Responsibility
//! - Hold tunables for autosave cadence, history size and log level.
//! - Parse host-provided JSON with per-field defaults.
//!
//! # Invariants
//! - Values returned by constructors are always normalized (clamped).
//! - Malformed input never aborts startup; defaults are used instead.

use crate::logging::default_log_level;
use crate::repo::note_repo::{normalize_history_cap, DEFAULT_HISTORY_CAP};
use log::warn;
use serde::{Deserialize, Serialize};

/// Default fixed autosave period.
pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 3_000;
const AUTOSAVE_INTERVAL_MIN_MS: u64 = 500;
const AUTOSAVE_INTERVAL_MAX_MS: u64 = 600_000;

/// Tunables supplied by the hosting adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreConfig {
    pub autosave_interval_ms: u64,
    pub history_cap: usize,
    pub log_level: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            autosave_interval_ms: DEFAULT_AUTOSAVE_INTERVAL_MS,
            history_cap: DEFAULT_HISTORY_CAP,
            log_level: default_log_level().to_string(),
        }
    }
}

impl CoreConfig {
    /// Parses JSON config; missing fields take defaults.
    ///
    /// # Errors
    /// - Returns the parser error when `raw` is not a JSON object of the
    ///   expected shape.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let parsed: Self = serde_json::from_str(raw)?;
        Ok(parsed.normalized())
    }

    /// Parses JSON config, falling back to defaults on any parse error.
    pub fn from_json_str_or_default(raw: &str) -> Self {
        Self::from_json_str(raw).unwrap_or_else(|err| {
            warn!("event=config_load module=config status=error source=default error={err}");
            Self::default()
        })
    }

    /// Clamps every field into its supported range.
    pub fn normalized(mut self) -> Self {
        self.autosave_interval_ms = self
            .autosave_interval_ms
            .clamp(AUTOSAVE_INTERVAL_MIN_MS, AUTOSAVE_INTERVAL_MAX_MS);
        self.history_cap = normalize_history_cap(self.history_cap);
        if self.log_level.trim().is_empty() {
            self.log_level = default_log_level().to_string();
        }
        self
    }
}
