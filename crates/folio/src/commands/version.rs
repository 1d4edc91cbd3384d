//! Version command handlers.

use crate::app::{read_content, truncate, App};
use folio_core::diff::render;
use folio_core::{DocumentService, HistoryOptions, SnapshotMeta, Version};
use serde_json::json;
use std::path::PathBuf;

/// Take a manual snapshot, of the live content by default.
pub async fn handle_snapshot(
    app: &App,
    document_id: &str,
    message: Option<String>,
    content: Option<String>,
    file: Option<PathBuf>,
) -> anyhow::Result<()> {
    let content = if content.is_some() || file.is_some() {
        read_content(content, file.as_deref())?
    } else {
        app.documents.get_document(document_id).await?.content
    };

    let mut meta = SnapshotMeta::manual(&app.actor.id, &app.actor.name);
    if let Some(message) = message {
        meta = meta.with_summary(message);
    }

    let version = app
        .versions
        .create_snapshot(document_id, &content, meta)
        .await?;

    if app.json {
        app.print_json(&version)?;
    } else {
        println!("Version {} ({})", version.version_number, version.id);
    }
    Ok(())
}

/// List versions of a document, newest first.
pub async fn handle_history(
    app: &App,
    document_id: &str,
    limit: Option<usize>,
    offset: usize,
    snapshots_only: bool,
) -> anyhow::Result<()> {
    let options = HistoryOptions {
        limit,
        offset,
        snapshots_only,
    };
    let versions = app
        .versions
        .get_version_history(document_id, options)
        .await?;

    if app.json {
        return app.print_json(&versions);
    }

    if versions.is_empty() {
        println!("No versions found.");
        return Ok(());
    }

    println!(
        "{:<5} {:<30} {:<15} {:<20} {:<16} {}",
        "#", "ID", "KIND", "CREATED", "AUTHOR", "SUMMARY"
    );
    println!("{}", "-".repeat(110));
    for version in &versions {
        println!(
            "{:<5} {:<30} {:<15} {:<20} {:<16} {}",
            version.version_number,
            version.id,
            version.kind,
            version.created_at.format("%Y-%m-%d %H:%M:%S"),
            truncate(&version.created_by_name, 16),
            version.changes_summary
        );
    }
    Ok(())
}

/// Show a single version.
pub async fn handle_show(app: &App, version_id: &str) -> anyhow::Result<()> {
    let version = app.versions.get_version_content(version_id).await?;

    if app.json {
        return app.print_json(&version);
    }

    print_header(&version);
    println!();
    println!("{}", version.content);
    Ok(())
}

/// Diff two versions.
pub async fn handle_compare(app: &App, from: &str, to: &str) -> anyhow::Result<()> {
    let comparison = app.versions.compare_versions(from, to).await?;

    if app.json {
        return app.print_json(&comparison);
    }

    println!(
        "--- version {} ({})",
        comparison.version1.version_number, comparison.version1.id
    );
    println!(
        "+++ version {} ({})",
        comparison.version2.version_number, comparison.version2.id
    );
    if comparison.summary.is_empty() {
        println!("No differences.");
        return Ok(());
    }

    print!("{}", render(&comparison.diff));
    println!(
        "{} added, {} removed",
        comparison.summary.lines_added, comparison.summary.lines_removed
    );
    Ok(())
}

/// Restore a document to a version.
pub async fn handle_restore(app: &App, document_id: &str, version_id: &str) -> anyhow::Result<()> {
    let document = app
        .versions
        .restore_version(document_id, version_id, &app.actor.id, &app.actor.name)
        .await?;

    if app.json {
        return app.print_json(&document);
    }

    println!("Restored document {} to {}", document.id, version_id);
    Ok(())
}

/// Prune old versions of a document.
pub async fn handle_cleanup(
    app: &App,
    document_id: &str,
    keep: Option<usize>,
    prune_snapshots: bool,
    keep_restore_points: bool,
) -> anyhow::Result<()> {
    let mut options = app.retention.defaults().clone();
    if let Some(keep) = keep {
        options = options.keep_recent(keep);
    }
    if prune_snapshots {
        options = options.keep_all_snapshots(false);
    }
    if keep_restore_points {
        options = options.keep_restore_points(true);
    }

    let deleted = app
        .retention
        .cleanup_old_versions(document_id, &options)
        .await?;

    if app.json {
        return app.print_json(&json!({ "document_id": document_id, "deleted": deleted }));
    }

    println!("Deleted {deleted} version(s)");
    Ok(())
}

fn print_header(version: &Version) {
    println!("Version: {} ({})", version.version_number, version.id);
    println!("Document: {}", version.document_id);
    println!("Kind: {}", version.kind);
    println!(
        "Created: {} by {}",
        version.created_at.format("%Y-%m-%d %H:%M:%S"),
        version.created_by_name
    );
    println!("Summary: {}", version.changes_summary);
    println!("Size: {} bytes", version.size());
}
