//! Domain-level error types for cursor-chat-export.
//!
//! The export taxonomy is split in two: failures that end a run
//! (see [`AppError::is_terminal`]) and failures that only skip one
//! workspace, row or file and are counted in the run summary.

use std::path::PathBuf;
use thiserror::Error;

/// Application-level errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// No workspace storage directory could be located.
    #[error("Cursor workspace storage not found (searched: {searched:?})")]
    StorageNotFound { searched: Vec<PathBuf> },

    /// One workspace database could not be opened or queried.
    #[error("Workspace {workspace_id} is unreadable: {message}")]
    WorkspaceUnreadable {
        workspace_id: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// One stored row did not contain valid JSON.
    #[error("Failed to decode {key} in workspace {workspace_id}: {message}")]
    RecordDecodeFailed {
        workspace_id: String,
        key: String,
        message: String,
    },

    /// Enumeration worked but produced no conversations at all.
    #[error("No chat conversations found ({workspaces_scanned} workspace(s) scanned)")]
    NoConversationsFound { workspaces_scanned: usize },

    /// An output directory could not be created.
    #[error("Failed to create output directory {path}")]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single output file could not be written.
    #[error("Failed to write {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration or environment error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO operation failed.
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl AppError {
    /// Wrap a rusqlite error as an unreadable workspace.
    pub fn workspace_unreadable(workspace_id: impl Into<String>, err: rusqlite::Error) -> Self {
        Self::WorkspaceUnreadable {
            workspace_id: workspace_id.into(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    /// Create an IO error with context.
    pub fn io(message: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(err),
        }
    }

    /// Whether this error ends an export run instead of skipping one item.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Self::WorkspaceUnreadable { .. } | Self::RecordDecodeFailed { .. } | Self::WriteFailed { .. }
        )
    }
}

/// Result type alias using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_classification() {
        let storage = AppError::StorageNotFound { searched: vec![] };
        assert!(storage.is_terminal());

        let empty = AppError::NoConversationsFound {
            workspaces_scanned: 3,
        };
        assert!(empty.is_terminal());

        let decode = AppError::RecordDecodeFailed {
            workspace_id: "abc".into(),
            key: "k".into(),
            message: "bad".into(),
        };
        assert!(!decode.is_terminal());

        let write = AppError::WriteFailed {
            path: PathBuf::from("x.md"),
            source: std::io::Error::other("disk full"),
        };
        assert!(!write.is_terminal());
    }

    #[test]
    fn test_messages_carry_context() {
        let err = AppError::NoConversationsFound {
            workspaces_scanned: 2,
        };
        assert!(err.to_string().contains("2 workspace(s)"));
    }
}
