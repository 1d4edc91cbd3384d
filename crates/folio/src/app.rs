//! Wiring shared by all commands.

use anyhow::Context as _;
use folio_core::{FolioConfig, RetentionManager, StoreDocumentService, VersionManager};
use folio_store::{JsonStore, RecordStore};
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Acting user for writes.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: String,
    pub name: String,
}

/// Store, services and output settings for one CLI invocation.
pub struct App {
    pub config: FolioConfig,
    pub documents: Arc<StoreDocumentService>,
    pub versions: VersionManager,
    pub retention: RetentionManager,
    pub actor: Actor,
    pub json: bool,
}

impl App {
    /// Open the JSON store under `data_dir`, or the configured directory.
    pub fn open(
        config: FolioConfig,
        data_dir: Option<PathBuf>,
        actor: Actor,
        json: bool,
    ) -> anyhow::Result<Self> {
        let data_dir = data_dir
            .or_else(|| config.resolve_data_dir())
            .context("No data directory: pass --data-dir or set data_dir in folio.json")?;
        debug!(path = %data_dir.display(), "Opening store");

        let store: Arc<dyn RecordStore> = Arc::new(JsonStore::new(data_dir));
        let documents = Arc::new(StoreDocumentService::new(store.clone()));
        let versions = VersionManager::from_config(store.clone(), documents.clone(), &config);
        let retention = RetentionManager::new(store).with_defaults(config.retention.clone());

        Ok(Self {
            config,
            documents,
            versions,
            retention,
            actor,
            json,
        })
    }

    /// Print `value` as pretty JSON.
    pub fn print_json<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Content from an inline argument, a file, or stdin.
pub fn read_content(inline: Option<String>, file: Option<&Path>) -> anyhow::Result<String> {
    if let Some(content) = inline {
        return Ok(content);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()));
    }

    let mut content = String::new();
    std::io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read content from stdin")?;
    Ok(content)
}

/// Shorten to at most `max` characters for table output.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text.to_string()
    }
}
