//! Export orchestration.
//!
//! Runs resolve → enumerate → read → normalize → name → render → write
//! for one export run, strictly one workspace at a time. Partial files may
//! remain on disk if a run fails midway.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tokio::sync::{mpsc, oneshot};

use crate::domain::{
    AppError, ConversationRecord, ExportConfig, ExportProgress, ExportSummary, ExportTarget,
    Result,
};
use crate::infrastructure::{resolve_override, resolve_storage_root, HostEnv};

use super::extractor::WorkspaceRecords;
use super::formatter::{write_json, write_markdown};
use super::naming::export_target;
use super::parser::normalize;

/// Runs an export, detecting the host environment.
///
/// # Errors
/// Returns a terminal error: storage not found, no conversations, or an
/// output directory that cannot be created.
pub fn run_export(config: &ExportConfig) -> Result<ExportSummary> {
    run_export_with_progress(config, |_| {})
}

/// Runs an export, reporting milestones to `on_progress`.
///
/// # Errors
/// See [`run_export`].
pub fn run_export_with_progress(
    config: &ExportConfig,
    on_progress: impl FnMut(ExportProgress),
) -> Result<ExportSummary> {
    let storage_root = match &config.storage_path_override {
        Some(path) => resolve_override(path)?,
        None => resolve_storage_root(&HostEnv::detect()?, None)?,
    };
    export_from_root(config, &storage_root, on_progress)
}

/// Runs an export against an already resolved storage root.
///
/// # Errors
/// See [`run_export`].
pub fn export_from_root(
    config: &ExportConfig,
    storage_root: &Path,
    mut on_progress: impl FnMut(ExportProgress),
) -> Result<ExportSummary> {
    tracing::info!(root = %storage_root.display(), "Exporting chats");
    on_progress(ExportProgress::StorageResolved(storage_root.to_path_buf()));

    let mut records = WorkspaceRecords::open(storage_root)?;
    let mut writer = ExportWriter::new(config);
    let mut summary = ExportSummary::default();

    while let Some(item) = records.next() {
        for workspace_id in records.take_scanned() {
            on_progress(ExportProgress::WorkspaceScanned { workspace_id });
        }

        let record = match item {
            Ok(record) => record,
            Err(AppError::WorkspaceUnreadable { .. }) => {
                summary.unreadable_workspaces += 1;
                continue;
            }
            Err(AppError::RecordDecodeFailed { .. }) => {
                summary.decode_failures += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        summary.workspace_record_count += 1;

        for conversation in normalize(&record) {
            summary.conversation_count += 1;
            let event = writer.export(&conversation, &mut summary)?;
            on_progress(event);
        }
    }

    for workspace_id in records.take_scanned() {
        on_progress(ExportProgress::WorkspaceScanned { workspace_id });
    }
    summary.workspaces_scanned = records.workspaces_scanned();

    if summary.conversation_count == 0 {
        tracing::warn!(
            workspaces = summary.workspaces_scanned,
            records = summary.workspace_record_count,
            "No conversations found"
        );
        return Err(AppError::NoConversationsFound {
            workspaces_scanned: summary.workspaces_scanned,
        });
    }

    summary.markdown_dir = writer.markdown_dir();
    summary.json_dir = writer.json_dir();

    tracing::info!(
        conversations = summary.conversation_count,
        markdown = summary.markdown_count,
        json = summary.json_count,
        failed = summary.failed_writes,
        "Export finished"
    );

    Ok(summary)
}

/// Writes conversations, creating the output directories on first use.
struct ExportWriter<'a> {
    config: &'a ExportConfig,
    dirs_ready: bool,
    written: HashSet<String>,
}

impl<'a> ExportWriter<'a> {
    fn new(config: &'a ExportConfig) -> Self {
        Self {
            config,
            dirs_ready: false,
            written: HashSet::new(),
        }
    }

    fn ensure_dirs(&mut self) -> Result<()> {
        if self.dirs_ready {
            return Ok(());
        }
        let dirs = std::iter::once(self.config.markdown_dir()).chain(self.config.json_dir());
        for dir in dirs {
            fs::create_dir_all(&dir)
                .map_err(|source| AppError::DirectoryCreateFailed { path: dir, source })?;
        }
        self.dirs_ready = true;
        Ok(())
    }

    fn markdown_dir(&self) -> Option<PathBuf> {
        self.dirs_ready
            .then(|| absolute(&self.config.markdown_dir()))
    }

    fn json_dir(&self) -> Option<PathBuf> {
        if !self.dirs_ready {
            return None;
        }
        self.config.json_dir().map(|dir| absolute(&dir))
    }

    /// Writes one conversation and returns the progress event describing it.
    ///
    /// Only directory creation failures propagate.
    fn export(
        &mut self,
        conversation: &ConversationRecord,
        summary: &mut ExportSummary,
    ) -> Result<ExportProgress> {
        self.ensure_dirs()?;

        let markdown_dir = self.config.markdown_dir();
        let json_dir = self.config.json_dir();
        let target = export_target(
            conversation,
            self.config.timestamp_in_filename,
            &markdown_dir,
            json_dir.as_deref(),
        );

        if !self.written.insert(target.base_name.clone()) {
            tracing::warn!(name = %target.base_name, "Duplicate file name, overwriting earlier export");
            summary.overwritten_files += 1;
        }

        let markdown_written = match write_target(&target, conversation) {
            Ok(json_written) => {
                summary.markdown_count += 1;
                if json_written {
                    summary.json_count += 1;
                }
                tracing::debug!(
                    name = %target.base_name,
                    user = conversation.user_message_count(),
                    assistant = conversation.assistant_message_count(),
                    "Exported conversation"
                );
                true
            }
            Err(WriteFailure::MarkdownFailed(e)) => {
                tracing::warn!("{}: {}", e, error_source(&e));
                summary.failed_writes += 1;
                false
            }
            Err(WriteFailure::JsonFailed(e)) => {
                tracing::warn!("{}: {}", e, error_source(&e));
                summary.markdown_count += 1;
                summary.failed_writes += 1;
                true
            }
        };

        let base_name = target.base_name;
        Ok(if markdown_written {
            ExportProgress::ConversationExported {
                base_name,
                written: summary.markdown_count,
            }
        } else {
            ExportProgress::ConversationFailed { base_name }
        })
    }
}

enum WriteFailure {
    MarkdownFailed(AppError),
    JsonFailed(AppError),
}

/// Writes the Markdown file, then the JSON file if requested.
///
/// Returns whether a JSON file was written.
fn write_target(
    target: &ExportTarget,
    conversation: &ConversationRecord,
) -> std::result::Result<bool, WriteFailure> {
    write_file(&target.markdown_path, |w| write_markdown(w, conversation))
        .map_err(WriteFailure::MarkdownFailed)?;

    match &target.json_path {
        Some(path) => {
            write_file(path, |w| write_json(w, conversation)).map_err(WriteFailure::JsonFailed)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn write_file(
    path: &Path,
    render: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> Result<()> {
    let to_error = |source| AppError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(to_error)?);
    render(&mut writer).map_err(to_error)?;
    writer.flush().map_err(to_error)
}

fn error_source(err: &AppError) -> String {
    std::error::Error::source(err).map_or_else(String::new, ToString::to_string)
}

fn absolute(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Handle to an export running on a blocking worker thread.
pub struct ExportTask {
    /// Progress notifications; closes when the run ends.
    pub progress: mpsc::UnboundedReceiver<ExportProgress>,
    /// Final result of the run.
    pub result: oneshot::Receiver<Result<ExportSummary>>,
}

/// Starts an export in the background.
///
/// The worker owns `config` for the whole run and only sends messages back.
/// Must be called from within a Tokio runtime.
#[must_use]
pub fn spawn_export(config: ExportConfig) -> ExportTask {
    let (progress_tx, progress) = mpsc::unbounded_channel();
    let (result_tx, result) = oneshot::channel();

    tokio::task::spawn_blocking(move || {
        let outcome = run_export_with_progress(&config, |event| {
            // Receiver may be gone if the caller stopped listening
            let _ = progress_tx.send(event);
        });
        let _ = result_tx.send(outcome);
    });

    ExportTask { progress, result }
}
