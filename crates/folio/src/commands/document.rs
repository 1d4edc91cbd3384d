//! Document command handlers.
//!
//! Handles creating, listing, showing and saving documents.

use crate::app::{read_content, truncate, App};
use clap::Subcommand;
use folio_core::{DocumentService, DocumentUpdate};
use serde_json::json;
use std::path::PathBuf;

/// Document subcommands.
#[derive(Subcommand)]
pub enum DocCommands {
    /// Create a document
    Create {
        /// Document title
        title: String,
        /// Initial content (reads --file or stdin when omitted)
        content: Option<String>,
        /// Read initial content from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Do not take an initial snapshot
        #[arg(long)]
        no_snapshot: bool,
    },
    /// List documents
    List,
    /// Show a document's live content
    Show {
        /// Document ID
        id: String,
    },
    /// Replace a document's content, snapshotting significant changes
    Save {
        /// Document ID
        id: String,
        /// New content (reads --file or stdin when omitted)
        content: Option<String>,
        /// Read new content from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Handle document commands.
pub async fn handle_doc(app: &App, command: DocCommands) -> anyhow::Result<()> {
    match command {
        DocCommands::Create {
            title,
            content,
            file,
            no_snapshot,
        } => {
            let content = read_content(content, file.as_deref())?;
            let document = app
                .documents
                .create_document(&title, &content, &app.actor.id, &app.actor.name)
                .await?;

            let snapshot = if no_snapshot || document.content.is_empty() {
                None
            } else {
                app.versions
                    .create_auto_snapshot(
                        &document.id,
                        None,
                        &document.content,
                        &app.actor.id,
                        &app.actor.name,
                    )
                    .await
            };

            if app.json {
                app.print_json(&json!({ "document": document, "snapshot": snapshot }))?;
            } else {
                println!("Created document {}", document.id);
                if let Some(version) = snapshot {
                    println!("Snapshot: version {} ({})", version.version_number, version.id);
                }
            }
        }
        DocCommands::List => {
            let documents = app.documents.list_documents().await?;

            if app.json {
                app.print_json(&documents)?;
            } else if documents.is_empty() {
                println!("No documents found.");
            } else {
                println!("{:<30} {:<30} {:<20}", "ID", "TITLE", "UPDATED");
                println!("{}", "-".repeat(80));
                for document in documents {
                    println!(
                        "{:<30} {:<30} {:<20}",
                        document.id,
                        truncate(&document.title, 28),
                        document.updated_at.format("%Y-%m-%d %H:%M:%S")
                    );
                }
            }
        }
        DocCommands::Show { id } => {
            let document = app.documents.get_document(&id).await?;

            if app.json {
                app.print_json(&document)?;
            } else {
                println!("Document: {}", document.id);
                println!("Title: {}", document.title);
                println!(
                    "Updated: {} by {}",
                    document.updated_at.format("%Y-%m-%d %H:%M:%S"),
                    document.updated_by_name
                );
                println!();
                println!("{}", document.content);
            }
        }
        DocCommands::Save { id, content, file } => {
            let content = read_content(content, file.as_deref())?;
            let before = app.documents.get_document(&id).await?;
            let document = app
                .documents
                .update_document(
                    &id,
                    DocumentUpdate::content(content),
                    &app.actor.id,
                    &app.actor.name,
                )
                .await?;

            let snapshot = app
                .versions
                .create_auto_snapshot(
                    &id,
                    Some(&before.content),
                    &document.content,
                    &app.actor.id,
                    &app.actor.name,
                )
                .await;

            if app.json {
                app.print_json(&json!({ "document": document, "snapshot": snapshot }))?;
            } else {
                println!("Saved document {}", document.id);
                match snapshot {
                    Some(version) => println!(
                        "Snapshot: version {} ({})",
                        version.version_number, version.changes_summary
                    ),
                    None => println!("No snapshot taken."),
                }
            }
        }
    }

    Ok(())
}
