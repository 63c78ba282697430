//! Editor preferences stored next to the notes.

use crate::model::note::NoteId;
use serde::{Deserialize, Serialize};

const DEFAULT_FONT_SIZE: &str = "4";
const DEFAULT_FONT_FAMILY: &str = "Arial, sans-serif";
const DEFAULT_FONT_SIZE_PT: &str = "14pt";

/// Presentation preferences. The core only persists them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorSettings {
    pub dark_mode: bool,
    /// Host font-size step, `"1"` through `"7"`.
    pub font_size: String,
    pub font_family: String,
    pub last_active_note: Option<NoteId>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            font_size: DEFAULT_FONT_SIZE.to_string(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            last_active_note: None,
        }
    }
}

impl EditorSettings {
    /// Maps the font-size step to a point size; unknown steps use 14pt.
    pub fn font_size_pt(&self) -> &'static str {
        match self.font_size.trim() {
            "1" => "8pt",
            "2" => "10pt",
            "3" => "12pt",
            "4" => "14pt",
            "5" => "18pt",
            "6" => "24pt",
            "7" => "36pt",
            _ => DEFAULT_FONT_SIZE_PT,
        }
    }
}
