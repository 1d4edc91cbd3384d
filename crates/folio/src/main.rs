//! Folio - document version control.
//!
//! This is the main entry point for the folio CLI.

mod app;
mod commands;

use app::{Actor, App};
use clap::{Parser, Subcommand};
use commands::*;
use folio_core::FolioConfig;
use folio_util::log::{LogConfig, LogLevel};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about = "Document version control", long_about = None)]
struct Cli {
    /// Directory of the record store
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Load configuration from this file instead of the layered lookup
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// ID of the acting user
    #[arg(long, global = true, default_value = "local")]
    user: String,

    /// Display name of the acting user
    #[arg(long, global = true, default_value = "Local User")]
    user_name: String,

    /// Print output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage documents
    Doc {
        #[command(subcommand)]
        command: DocCommands,
    },
    /// Take a manual snapshot of a document
    Snapshot {
        /// Document ID
        document: String,
        /// Change summary
        #[arg(short, long)]
        message: Option<String>,
        /// Snapshot this content instead of the live document
        #[arg(long)]
        content: Option<String>,
        /// Snapshot the content of a file instead of the live document
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// List versions of a document
    History {
        /// Document ID
        document: String,
        /// Maximum number of versions
        #[arg(short, long)]
        limit: Option<usize>,
        /// Number of versions to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Only manual and restore snapshots
        #[arg(long)]
        snapshots: bool,
    },
    /// Show a version
    Show {
        /// Version ID
        version: String,
    },
    /// Diff two versions
    Compare {
        /// Old version ID
        from: String,
        /// New version ID
        to: String,
    },
    /// Restore a document to a version
    Restore {
        /// Document ID
        document: String,
        /// Version ID
        version: String,
    },
    /// Delete old versions of a document
    Cleanup {
        /// Document ID
        document: String,
        /// Number of recent versions to keep
        #[arg(short, long)]
        keep: Option<usize>,
        /// Also delete manual snapshots outside the window
        #[arg(long)]
        prune_snapshots: bool,
        /// Keep restore backups and records outside the window
        #[arg(long)]
        keep_restore_points: bool,
    },
    /// Show configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    folio_util::log::init(LogConfig {
        print: true,
        level: if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::default()
        },
        include_location: cli.verbose,
    });

    let (config, sources) = match cli.config {
        Some(path) => (FolioConfig::load_file(&path).await?, vec![path]),
        None => {
            let cwd = std::env::current_dir()?;
            FolioConfig::load(Some(&cwd)).await?
        }
    };

    if let Commands::Config = cli.command {
        return show_config(&config, &sources, cli.json);
    }

    let actor = Actor {
        id: cli.user,
        name: cli.user_name,
    };
    let app = App::open(config, cli.data_dir, actor, cli.json)?;

    match cli.command {
        Commands::Doc { command } => handle_doc(&app, command).await,
        Commands::Snapshot {
            document,
            message,
            content,
            file,
        } => handle_snapshot(&app, &document, message, content, file).await,
        Commands::History {
            document,
            limit,
            offset,
            snapshots,
        } => handle_history(&app, &document, limit, offset, snapshots).await,
        Commands::Show { version } => handle_show(&app, &version).await,
        Commands::Compare { from, to } => handle_compare(&app, &from, &to).await,
        Commands::Restore { document, version } => {
            handle_restore(&app, &document, &version).await
        }
        Commands::Cleanup {
            document,
            keep,
            prune_snapshots,
            keep_restore_points,
        } => handle_cleanup(&app, &document, keep, prune_snapshots, keep_restore_points).await,
        Commands::Config => Ok(()),
    }
}

fn show_config(config: &FolioConfig, sources: &[PathBuf], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    println!("Configuration sources:");
    if sources.is_empty() {
        println!("  (none)");
    } else {
        for source in sources {
            println!("  {}", source.display());
        }
    }
    println!();

    println!("Current configuration:");
    println!("{}", serde_json::to_string_pretty(config)?);

    Ok(())
}
