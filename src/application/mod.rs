//! Application layer - use cases and orchestration.
//!
//! Reading raw records, normalizing them into conversations, naming and
//! rendering output files, and running whole exports.

pub mod export_service;
pub mod extractor;
pub mod formatter;
pub mod naming;
pub mod parser;

pub use export_service::{run_export, spawn_export, ExportTask};
pub use extractor::read_workspace;
pub use formatter::format_conversation_markdown;
pub use parser::{normalize, normalize_exported};
