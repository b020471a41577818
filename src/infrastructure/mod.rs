//! Infrastructure layer - external adapters (database, filesystem).
//!
//! This layer handles all I/O operations and external dependencies.

pub mod config;
pub mod cursor_paths;
pub mod sqlite_reader;

pub use config::{ensure_config_exists, load_config, render_config};
pub use cursor_paths::{
    candidate_paths, list_workspaces, resolve_override, resolve_storage_root, HostEnv, OsFamily,
    STATE_DB_NAME,
};
pub use sqlite_reader::{RawKvEntry, StateDbReader};
