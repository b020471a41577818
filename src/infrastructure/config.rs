//! Configuration file management.
//!
//! Handles loading and creating the optional TOML configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# Cursor Chat Export Configuration
# Command-line flags take precedence over these values.

[export]
# Workspace storage directory (auto-detected when unset)
# storage_path = "/home/me/.config/Cursor/User/workspaceStorage"

# Also write one JSON file per conversation
emit_json = false

# Prefix file names with the conversation time (YYYY-MM-DD_HH-MM)
timestamp_in_filename = true

# Where cursor_chats/ and cursor_chats_json/ are created (default: current directory)
# output_dir = "/home/me/chat-archive"
"#;

/// Load configuration from the default location, or defaults if absent.
///
/// # Errors
/// Returns error if file exists but cannot be read or parsed.
pub fn load_config() -> Result<AppConfig> {
    let config_path = AppConfig::config_file_path();

    if config_path.exists() {
        load_config_from_file(&config_path)
    } else {
        Ok(AppConfig::default())
    }
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| AppError::io(format!("Failed to read config file: {}", path.display()), e))?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Write the default configuration file if it doesn't exist.
///
/// Returns the path and whether a file was created.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists() -> Result<(PathBuf, bool)> {
    let config_path = AppConfig::config_file_path();
    let created = write_default_config(&config_path)?;
    Ok((config_path, created))
}

fn write_default_config(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AppError::io("Failed to create config directory", e))?;
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok(true)
}

/// Render configuration as TOML for display.
///
/// # Errors
/// Returns error if serialization fails.
pub fn render_config(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config).map_err(|e| AppError::Config {
        message: format!("Failed to serialize config: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_parses() {
        let config: AppConfig = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(
            &config_path,
            "[export]\nemit_json = true\ntimestamp_in_filename = false\nstorage_path = \"/data/ws\"\n",
        )
        .unwrap();

        let loaded = load_config_from_file(&config_path).unwrap();
        assert!(loaded.export.emit_json);
        assert!(!loaded.export.timestamp_in_filename);
        assert_eq!(loaded.export.storage_path, Some(PathBuf::from("/data/ws")));
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[export]\nemit_json = \"yes\"\n").unwrap();

        let err = load_config_from_file(&config_path).unwrap_err();
        assert!(matches!(err, AppError::Config { .. }));
    }

    #[test]
    fn test_write_default_config_once() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("nested").join("config.toml");

        assert!(write_default_config(&config_path).unwrap());
        assert!(!write_default_config(&config_path).unwrap());
        assert_eq!(
            load_config_from_file(&config_path).unwrap(),
            AppConfig::default()
        );
    }

    #[test]
    fn test_render_roundtrip() {
        let mut config = AppConfig::default();
        config.export.emit_json = true;
        let text = render_config(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
