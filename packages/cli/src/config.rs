use quire_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "quire.config.json";

/// Quire configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory scanned by `quire check` when no input is given
    #[serde(default = "default_doc_dir")]
    pub doc_dir: String,

    /// Options handed to every edit session
    #[serde(default)]
    pub editor: EditorConfig,
}

fn default_doc_dir() -> String {
    "docs".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the document directory
    pub fn get_doc_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.doc_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            doc_dir: default_doc_dir(),
            editor: EditorConfig::default(),
        }
    }
}
