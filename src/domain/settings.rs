//! Export configuration.
//!
//! [`AppConfig`] mirrors the optional TOML file; [`ExportConfig`] is the
//! resolved set of options the export pipeline runs with.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Directory (under the output root) receiving Markdown files.
pub const MARKDOWN_DIR_NAME: &str = "cursor_chats";
/// Directory (under the output root) receiving JSON files.
pub const JSON_DIR_NAME: &str = "cursor_chats_json";

/// `[export]` section of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Workspace storage directory to use instead of auto-detection.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,

    /// Also write one JSON file per conversation.
    #[serde(default)]
    pub emit_json: bool,

    /// Prefix file names with the conversation's last send time.
    #[serde(default = "default_timestamp_in_filename")]
    pub timestamp_in_filename: bool,

    /// Directory in which the output folders are created.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            storage_path: None,
            emit_json: false,
            timestamp_in_filename: default_timestamp_in_filename(),
            output_dir: None,
        }
    }
}

const fn default_timestamp_in_filename() -> bool {
    true
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub export: ExportSettings,
}

impl AppConfig {
    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cursor-chat-export")
    }

    /// Get the config file path.
    #[must_use]
    pub fn config_file_path() -> PathBuf {
        Self::default_data_dir().join("config.toml")
    }

    /// Build the runtime export options from file settings.
    #[must_use]
    pub fn export_config(&self) -> ExportConfig {
        ExportConfig {
            storage_path_override: self.export.storage_path.clone(),
            emit_json: self.export.emit_json,
            timestamp_in_filename: self.export.timestamp_in_filename,
            output_root: self
                .export
                .output_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

/// Options for a single export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// If set, must be an existing directory; skips auto-detection.
    pub storage_path_override: Option<PathBuf>,
    pub emit_json: bool,
    pub timestamp_in_filename: bool,
    /// Parent of the Markdown and JSON output directories.
    pub output_root: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        AppConfig::default().export_config()
    }
}

impl ExportConfig {
    #[must_use]
    pub fn markdown_dir(&self) -> PathBuf {
        self.output_root.join(MARKDOWN_DIR_NAME)
    }

    /// JSON output directory, only when JSON output is enabled.
    #[must_use]
    pub fn json_dir(&self) -> Option<PathBuf> {
        self.emit_json
            .then(|| self.output_root.join(JSON_DIR_NAME))
    }

    /// Options rooted at `root`, used by the CLI `--output-dir` flag and tests.
    #[must_use]
    pub fn with_output_root(mut self, root: impl AsRef<Path>) -> Self {
        self.output_root = root.as_ref().to_path_buf();
        self
    }
}
