//! Domain layer - core types, configuration and errors.
//!
//! This layer holds plain data types without any I/O.

pub mod error;
pub mod models;
pub mod settings;

pub use error::{AppError, Result};
pub use models::{
    CodeArtifact, ConversationRecord, ExportProgress, ExportSummary, ExportTarget, Message,
    RawRecord, Role, SourceKey, WorkspaceEntry,
};
pub use settings::{AppConfig, ExportConfig, ExportSettings};
