//! Cursor IDE path discovery.
//!
//! Locates the `workspaceStorage` directory across the layouts Cursor has
//! used on each platform, and enumerates the workspaces inside it.

use std::path::{Path, PathBuf};

use crate::domain::{AppError, Result, WorkspaceEntry};

/// Workspace storage location relative to Cursor's config directory.
const WORKSPACE_STORAGE_PATH: &str = "Cursor/User/workspaceStorage";
/// Per-workspace state database.
pub const STATE_DB_NAME: &str = "state.vscdb";

/// Operating system family, with WSL split out from plain Linux.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    Linux,
    /// Linux running under Windows Subsystem for Linux.
    Wsl,
    MacOs,
    Other,
}

/// Facts about the host used to build storage candidates.
#[derive(Debug, Clone)]
pub struct HostEnv {
    pub os: OsFamily,
    pub home: PathBuf,
    /// `%APPDATA%`, when set.
    pub appdata: Option<PathBuf>,
    /// Login name, used to find the Windows profile from WSL.
    pub user: Option<String>,
}

impl HostEnv {
    /// Describe the running host.
    ///
    /// # Errors
    /// Returns error if the home directory cannot be determined.
    pub fn detect() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| AppError::Config {
            message: "Could not determine home directory".into(),
        })?;

        let os = match std::env::consts::OS {
            "windows" => OsFamily::Windows,
            "macos" => OsFamily::MacOs,
            "linux" if is_wsl() => OsFamily::Wsl,
            "linux" => OsFamily::Linux,
            _ => OsFamily::Other,
        };

        Ok(Self {
            os,
            home,
            appdata: std::env::var_os("APPDATA").map(PathBuf::from),
            user: std::env::var("USER").ok(),
        })
    }
}

fn is_wsl() -> bool {
    std::fs::read_to_string("/proc/sys/kernel/osrelease")
        .map(|release| release.to_lowercase().contains("microsoft"))
        .unwrap_or(false)
}

/// Candidate storage roots in priority order.
#[must_use]
pub fn candidate_paths(env: &HostEnv) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Windows
    if let Some(appdata) = &env.appdata {
        candidates.push(appdata.join(WORKSPACE_STORAGE_PATH));
    }
    candidates.push(env.home.join("AppData/Roaming").join(WORKSPACE_STORAGE_PATH));

    // Linux
    candidates.push(env.home.join(".config").join(WORKSPACE_STORAGE_PATH));

    // WSL reads the paired Windows profile
    if env.os == OsFamily::Wsl {
        if let Some(user) = &env.user {
            candidates.push(
                Path::new("/mnt/c/Users")
                    .join(user)
                    .join("AppData/Roaming")
                    .join(WORKSPACE_STORAGE_PATH),
            );
        }
    }

    // macOS
    candidates.push(
        env.home
            .join("Library/Application Support")
            .join(WORKSPACE_STORAGE_PATH),
    );

    candidates
}

/// Resolves the workspace storage root.
///
/// An override always wins, but must name an existing directory.
///
/// # Errors
/// Returns `StorageNotFound` if the override is invalid or no candidate exists.
pub fn resolve_storage_root(env: &HostEnv, override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return resolve_override(path);
    }

    let candidates = candidate_paths(env);
    if let Some(found) = candidates.iter().find(|p| p.is_dir()) {
        tracing::debug!("Found workspace storage at: {}", found.display());
        return Ok(found.clone());
    }

    Err(AppError::StorageNotFound {
        searched: candidates,
    })
}

/// Accepts a user-supplied storage root if it is an existing directory.
///
/// # Errors
/// Returns `StorageNotFound` naming the path otherwise.
pub fn resolve_override(path: &Path) -> Result<PathBuf> {
    if path.is_dir() {
        tracing::debug!("Using storage override: {}", path.display());
        Ok(path.to_path_buf())
    } else {
        Err(AppError::StorageNotFound {
            searched: vec![path.to_path_buf()],
        })
    }
}

/// Lists workspace directories under the storage root, sorted by name.
///
/// Workspaces without a state database are still listed; the reader
/// skips them.
///
/// # Errors
/// Returns error if the storage root cannot be read.
pub fn list_workspaces(storage_root: &Path) -> Result<Vec<WorkspaceEntry>> {
    let entries = std::fs::read_dir(storage_root).map_err(|e| {
        AppError::io(
            format!("Failed to read workspace storage: {}", storage_root.display()),
            e,
        )
    })?;

    let mut workspaces: Vec<WorkspaceEntry> = entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.path().is_dir())
        .map(|entry| WorkspaceEntry {
            id: entry.file_name().to_string_lossy().into_owned(),
            db_path: entry.path().join(STATE_DB_NAME),
        })
        .collect();

    workspaces.sort_by(|a, b| a.id.cmp(&b.id));

    tracing::debug!(
        "Found {} workspace directories in {}",
        workspaces.len(),
        storage_root.display()
    );

    Ok(workspaces)
}
