//! Raw record extraction.
//!
//! Walks the workspaces of a storage root one at a time, yielding decoded
//! chat rows. Each database is opened, read and closed before the next
//! workspace is touched.

use std::collections::VecDeque;
use std::path::Path;

use crate::domain::{AppError, RawRecord, Result, WorkspaceEntry};
use crate::infrastructure::{list_workspaces, StateDbReader};

/// Lazy iterator over the raw chat records of every workspace.
///
/// Yields `Err(WorkspaceUnreadable)` or `Err(RecordDecodeFailed)` for items
/// that had to be skipped; iteration continues after either.
pub struct WorkspaceRecords {
    workspaces: std::vec::IntoIter<WorkspaceEntry>,
    pending: VecDeque<Result<RawRecord>>,
    newly_scanned: Vec<String>,
    scanned: usize,
}

impl WorkspaceRecords {
    /// Enumerate the workspaces under `storage_root`.
    ///
    /// # Errors
    /// Returns error if the storage root cannot be listed.
    pub fn open(storage_root: &Path) -> Result<Self> {
        Ok(Self::from_workspaces(list_workspaces(storage_root)?))
    }

    #[must_use]
    pub fn from_workspaces(workspaces: Vec<WorkspaceEntry>) -> Self {
        Self {
            workspaces: workspaces.into_iter(),
            pending: VecDeque::new(),
            newly_scanned: Vec::new(),
            scanned: 0,
        }
    }

    /// Number of workspaces whose database was found and opened so far.
    #[must_use]
    pub const fn workspaces_scanned(&self) -> usize {
        self.scanned
    }

    /// Ids of workspaces read since the last call, in read order.
    ///
    /// Includes workspaces whose database held no chat rows.
    pub fn take_scanned(&mut self) -> Vec<String> {
        std::mem::take(&mut self.newly_scanned)
    }

    /// Reads the next workspace that has a state database.
    ///
    /// Returns `None` once all workspaces are exhausted.
    fn load_next_workspace(&mut self) -> Option<()> {
        for workspace in self.workspaces.by_ref() {
            if !workspace.db_path.is_file() {
                tracing::debug!(workspace = %workspace.id, "No state database, skipping");
                continue;
            }

            self.scanned += 1;
            self.pending.extend(read_workspace(&workspace));
            self.newly_scanned.push(workspace.id);
            return Some(());
        }
        None
    }
}

impl Iterator for WorkspaceRecords {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }
            self.load_next_workspace()?;
        }
    }
}

/// Reads and decodes every known chat row of one workspace.
///
/// The database connection is released before this returns.
pub fn read_workspace(workspace: &WorkspaceEntry) -> Vec<Result<RawRecord>> {
    let entries = match StateDbReader::open(&workspace.db_path)
        .and_then(|reader| reader.fetch_chat_entries())
    {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(workspace = %workspace.id, "Failed to read state database: {}", e);
            return vec![Err(AppError::workspace_unreadable(&workspace.id, e))];
        }
    };

    entries
        .into_iter()
        .map(|entry| {
            serde_json::from_slice(&entry.value)
                .map(|payload| RawRecord {
                    workspace_id: workspace.id.clone(),
                    source_key: entry.key,
                    payload,
                })
                .map_err(|e| {
                    tracing::warn!(
                        workspace = %workspace.id,
                        key = entry.key.as_str(),
                        "Skipping undecodable row: {}",
                        e
                    );
                    AppError::RecordDecodeFailed {
                        workspace_id: workspace.id.clone(),
                        key: entry.key.as_str().to_string(),
                        message: e.to_string(),
                    }
                })
        })
        .collect()
}
