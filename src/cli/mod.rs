//! CLI interface using clap.
//!
//! Provides command-line arguments and subcommands for the tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::AppConfig;

/// Cursor Chat Export - Save Cursor IDE workspace chats as Markdown/JSON files.
#[derive(Parser, Debug)]
#[command(name = "cursor-chat-export")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging (use multiple times for more verbosity).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export every chat tab to cursor_chats/ (and cursor_chats_json/).
    Export(ExportArgs),

    /// Show candidate workspace storage paths and which one is used.
    Paths {
        /// Workspace storage directory to check instead of auto-detection.
        #[arg(short, long)]
        storage_path: Option<PathBuf>,
    },

    /// List workspaces and how many conversations each holds.
    Workspaces {
        /// Workspace storage directory to use instead of auto-detection.
        #[arg(short, long)]
        storage_path: Option<PathBuf>,
    },

    /// Re-render an exported JSON file as Markdown on stdout.
    Render {
        /// JSON file previously written by `export --json`.
        file: PathBuf,
    },

    /// Manage the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Workspace storage directory to use instead of auto-detection.
    #[arg(short, long)]
    pub storage_path: Option<PathBuf>,

    /// Also write one JSON file per conversation.
    #[arg(long)]
    pub json: bool,

    /// Do not prefix file names with the conversation time.
    #[arg(long)]
    pub no_timestamp: bool,

    /// Directory in which the output folders are created.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

impl ExportArgs {
    /// Apply command-line flags on top of file configuration.
    #[must_use]
    pub fn apply(&self, mut config: AppConfig) -> AppConfig {
        if let Some(path) = &self.storage_path {
            config.export.storage_path = Some(path.clone());
        }
        if self.json {
            config.export.emit_json = true;
        }
        if self.no_timestamp {
            config.export.timestamp_in_filename = false;
        }
        if let Some(dir) = &self.output_dir {
            config.export.output_dir = Some(dir.clone());
        }
        config
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file if none exists.
    Init,
    /// Print the effective configuration.
    Show,
}
