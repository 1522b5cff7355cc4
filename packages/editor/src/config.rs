//! Editor configuration.

use crate::errors::EditorError;
use quire_document::DEFAULT_COLUMN_GAP;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Fixed identity seed; a per-session seed is derived when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_seed: Option<String>,

    /// Gap in pixels given to new column groups
    #[serde(default = "default_column_gap")]
    pub default_column_gap: u32,

    /// Border flag given to new column groups
    #[serde(default)]
    pub show_column_borders: bool,

    /// Wrap legacy top-level blocks into sections when a document is loaded
    #[serde(default = "default_true")]
    pub migrate_on_load: bool,
}

fn default_column_gap() -> u32 {
    DEFAULT_COLUMN_GAP
}

fn default_true() -> bool {
    true
}

impl EditorConfig {
    pub fn from_json(source: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(source)?)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            id_seed: None,
            default_column_gap: default_column_gap(),
            show_column_borders: false,
            migrate_on_load: true,
        }
    }
}
