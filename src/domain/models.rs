//! Domain models for exported Cursor chat data.
//!
//! Raw rows read from a workspace's `state.vscdb` are normalized into
//! [`ConversationRecord`] values before anything is rendered.

use std::path::PathBuf;

use chrono::DateTime;
use serde_json::Value;

/// Shown in place of a timestamp that is missing or out of range.
pub const UNKNOWN_TIME: &str = "unknown_time";

/// Formats epoch milliseconds as `YYYY-MM-DD_HH-MM` (UTC).
#[must_use]
pub fn format_timestamp(millis: Option<i64>) -> String {
    millis
        .and_then(DateTime::from_timestamp_millis)
        .map_or_else(
            || UNKNOWN_TIME.to_string(),
            |dt| dt.format("%Y-%m-%d_%H-%M").to_string(),
        )
}

/// Author of a message bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Message typed by the user.
    User,
    /// Message produced by the AI assistant.
    Assistant,
}

impl Role {
    /// Classify a bubble by its stored `type` field.
    ///
    /// Unrecognized values yield `None`; such bubbles are dropped.
    #[must_use]
    pub fn from_bubble_type(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "ai" | "assistant" => Some(Self::Assistant),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "User"),
            Self::Assistant => write!(f, "Assistant"),
        }
    }
}

/// Keys in `ItemTable` known to hold chat payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKey {
    /// Chat panel data holding a `tabs` array.
    ChatData,
    /// Composer session data. Decoded but not normalized.
    ComposerData,
}

impl SourceKey {
    pub const ALL: [Self; 2] = [Self::ChatData, Self::ComposerData];

    /// The literal key stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChatData => "workbench.panel.aichat.view.aichat.chatdata",
            Self::ComposerData => "composer.composerData",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

/// One workspace directory under the storage root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceEntry {
    /// Directory name, used as the workspace identifier.
    pub id: String,
    /// Path to the workspace's `state.vscdb`.
    pub db_path: PathBuf,
}

/// A decoded row from a workspace database.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub workspace_id: String,
    pub source_key: SourceKey,
    pub payload: Value,
}

/// Code attached to a message: a user selection or an assistant code block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeArtifact {
    /// Language for code blocks, file path for selections.
    pub label: Option<String>,
    pub content: String,
}

/// A single message turn in a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    /// Message text; `None` when the bubble had no text field.
    pub text: Option<String>,
    pub code_artifacts: Vec<CodeArtifact>,
}

/// One normalized chat tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRecord {
    pub workspace_id: String,
    /// Stored title, or a synthesized one for untitled tabs.
    pub title: String,
    /// Last send time in milliseconds since the Unix epoch.
    pub timestamp: Option<i64>,
    /// Messages in source bubble order.
    pub messages: Vec<Message>,
}

impl ConversationRecord {
    /// Get user message count.
    #[must_use]
    pub fn user_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::User).count()
    }

    /// Get assistant message count.
    #[must_use]
    pub fn assistant_message_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .count()
    }
}

/// Output file locations for one conversation, derived once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub base_name: String,
    pub markdown_path: PathBuf,
    pub json_path: Option<PathBuf>,
}

/// Counters and output locations of a finished export run.
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    /// Workspace directories visited.
    pub workspaces_scanned: usize,
    /// Workspaces skipped because their database could not be read.
    pub unreadable_workspaces: usize,
    /// Chat-bearing rows decoded across all workspaces.
    pub workspace_record_count: usize,
    /// Rows skipped because their payload was not valid JSON.
    pub decode_failures: usize,
    /// Conversations (tabs) found.
    pub conversation_count: usize,
    /// Markdown files written.
    pub markdown_count: usize,
    /// JSON files written.
    pub json_count: usize,
    /// Files that could not be written.
    pub failed_writes: usize,
    /// Files written more than once because two conversations share a name.
    pub overwritten_files: usize,
    pub markdown_dir: Option<PathBuf>,
    pub json_dir: Option<PathBuf>,
}

impl ExportSummary {
    /// True when every conversation was written.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.failed_writes == 0
    }
}

/// Notifications emitted while an export runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportProgress {
    /// The storage root was resolved.
    StorageResolved(PathBuf),
    /// A workspace database was read.
    WorkspaceScanned { workspace_id: String },
    /// A conversation's Markdown file was written.
    ConversationExported { base_name: String, written: usize },
    /// A conversation's Markdown file could not be written.
    ConversationFailed { base_name: String },
}
