//! Command-line front end for cursor-chat-export.
//!
//!   cursor-chat-export export                 # Markdown into ./cursor_chats
//!   cursor-chat-export export --json          # plus ./cursor_chats_json
//!   cursor-chat-export paths                  # where is Cursor's storage?
//!   cursor-chat-export workspaces             # what will be exported?

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Table};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cursor_chat_export::application::{
    format_conversation_markdown, normalize, normalize_exported, read_workspace, spawn_export,
};
use cursor_chat_export::cli::{Cli, Commands, ConfigAction, ExportArgs};
use cursor_chat_export::domain::{AppError, ExportProgress, ExportSummary};
use cursor_chat_export::infrastructure::{
    candidate_paths, ensure_config_exists, list_workspaces, load_config, render_config,
    resolve_storage_root, HostEnv, STATE_DB_NAME,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Main application logic.
async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Export(args) => cmd_export(&args).await,
        Commands::Paths { storage_path } => cmd_paths(storage_path.as_deref()),
        Commands::Workspaces { storage_path } => cmd_workspaces(storage_path.as_deref()),
        Commands::Render { file } => cmd_render(&file),
        Commands::Config { action } => cmd_config(&action),
    }
}

/// Export all conversations.
async fn cmd_export(args: &ExportArgs) -> anyhow::Result<()> {
    let config = args.apply(load_config()?).export_config();

    println!("{} Exporting Cursor chats...", "⏳".bold());

    let mut task = spawn_export(config);
    while let Some(event) = task.progress.recv().await {
        match event {
            ExportProgress::StorageResolved(root) => {
                println!("{} Storage: {}", "📂".bold(), root.display());
            }
            ExportProgress::WorkspaceScanned { workspace_id } => {
                tracing::info!(workspace = %workspace_id, "Scanned workspace");
            }
            ExportProgress::ConversationExported { base_name, .. } => {
                println!("{} {}", "✓".green(), base_name.cyan());
            }
            ExportProgress::ConversationFailed { base_name } => {
                println!("{} {}", "✗".red(), base_name.yellow());
            }
        }
    }

    let outcome = task
        .result
        .await
        .context("Export worker stopped unexpectedly")?;

    match outcome {
        Ok(summary) => {
            print_summary(&summary);
            if summary.success() {
                Ok(())
            } else {
                anyhow::bail!("{} file(s) could not be written", summary.failed_writes)
            }
        }
        Err(AppError::NoConversationsFound { workspaces_scanned }) => {
            println!(
                "{} No chat conversations found ({} workspace database(s) scanned)",
                "ℹ".yellow(),
                workspaces_scanned
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_summary(summary: &ExportSummary) {
    println!();
    println!("{} Export complete!", "✅".bold());
    println!(
        "  Chat records found: {}",
        summary.workspace_record_count.to_string().cyan()
    );
    println!(
        "  Conversations: {}",
        summary.conversation_count.to_string().cyan()
    );
    if let Some(dir) = &summary.markdown_dir {
        println!(
            "{} Markdown: {} ({} files)",
            "📁".bold(),
            dir.display(),
            summary.markdown_count.to_string().green()
        );
    }
    if let Some(dir) = &summary.json_dir {
        println!(
            "{} JSON: {} ({} files)",
            "📁".bold(),
            dir.display(),
            summary.json_count.to_string().green()
        );
    }

    let skipped = [
        (summary.unreadable_workspaces, "unreadable workspace(s)"),
        (summary.decode_failures, "undecodable record(s)"),
        (summary.overwritten_files, "file name collision(s), later chat kept"),
        (summary.failed_writes, "failed write(s)"),
    ];
    for (count, label) in skipped.into_iter().filter(|(count, _)| *count > 0) {
        println!("  {} {} {}", "⚠".yellow(), count.to_string().yellow(), label);
    }
}

/// Show storage path candidates.
fn cmd_paths(storage_path: Option<&Path>) -> anyhow::Result<()> {
    let env = HostEnv::detect()?;

    println!("{}", "📂 Cursor Workspace Storage".bold());
    println!("  OS: {:?}", env.os);
    println!();

    for (i, path) in candidate_paths(&env).iter().enumerate() {
        let status = if path.is_dir() {
            "found".green()
        } else {
            "missing".dimmed()
        };
        println!("  {}. [{}] {}", i + 1, status, path.display());
    }

    println!();
    match resolve_storage_root(&env, storage_path) {
        Ok(root) => println!("Using: {}", root.display().to_string().cyan()),
        Err(e) => println!("{} {}", "Not found:".red(), e),
    }

    Ok(())
}

fn storage_root(storage_path: Option<&Path>) -> anyhow::Result<PathBuf> {
    let configured = load_config()?.export.storage_path;
    let override_path = storage_path.or(configured.as_deref());
    Ok(resolve_storage_root(&HostEnv::detect()?, override_path)?)
}

/// List workspaces and their chat contents.
fn cmd_workspaces(storage_path: Option<&Path>) -> anyhow::Result<()> {
    let root = storage_root(storage_path)?;
    let workspaces = list_workspaces(&root)?;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Workspace", "Database", "Records", "Conversations"]);

    for workspace in &workspaces {
        if !workspace.db_path.is_file() {
            table.add_row(vec![workspace.id.as_str(), "-", "-", "-"]);
            continue;
        }

        let items = read_workspace(workspace);
        let (records, errors): (Vec<_>, Vec<_>) = items.into_iter().partition(Result::is_ok);
        let conversations: usize = records
            .iter()
            .flatten()
            .map(|record| normalize(record).len())
            .sum();
        let status = if errors.is_empty() {
            STATE_DB_NAME.to_string()
        } else {
            format!("{STATE_DB_NAME} ({} error(s))", errors.len())
        };

        table.add_row(vec![
            workspace.id.clone(),
            status,
            records.len().to_string(),
            conversations.to_string(),
        ]);
    }

    println!("{table}");
    println!();
    println!("Total: {} workspace(s) in {}", workspaces.len(), root.display());

    Ok(())
}

/// Render an exported JSON conversation as Markdown.
fn cmd_render(file: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;
    let conversation = normalize_exported(&value)
        .with_context(|| format!("{} does not contain an exported conversation", file.display()))?;

    print!("{}", format_conversation_markdown(&conversation));
    Ok(())
}

/// Configuration file commands.
fn cmd_config(action: &ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let (path, created) = ensure_config_exists()?;
            if created {
                println!("{} Created {}", "✓".green().bold(), path.display());
            } else {
                println!("Config already exists: {}", path.display());
            }
        }
        ConfigAction::Show => {
            println!("{}", render_config(&load_config()?)?);
        }
    }
    Ok(())
}

/// Setup tracing/logging based on verbosity level.
fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
