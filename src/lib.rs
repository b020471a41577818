//! Cursor Chat Export - save Cursor IDE workspace chats as Markdown and JSON.
//!
//! Each workspace under Cursor's `workspaceStorage` directory has its own
//! `state.vscdb`. The chat panel tabs stored there are normalized into
//! [`ConversationRecord`]s and written one file per conversation:
//!
//! ```text
//! workspaceStorage/<id>/state.vscdb ──▶ RawRecord ──▶ ConversationRecord
//!                                                          │
//!                          cursor_chats/<name>.md ◀────────┤
//!                   cursor_chats_json/<name>.json ◀────────┘ (optional)
//! ```
//!
//! [`run_export`] is the entry point for front ends; [`spawn_export`] runs it
//! on a worker thread with progress reporting.

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;

pub use application::{run_export, spawn_export, ExportTask};
pub use domain::{AppError, ConversationRecord, ExportConfig, ExportProgress, ExportSummary};
