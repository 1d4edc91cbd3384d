//! Configuration management.
//!
//! Configuration is loaded from multiple sources with the following precedence
//! (later sources override earlier ones):
//! 1. Global config: `~/.config/folio/folio.json` or `folio.jsonc`
//! 2. `FOLIO_CONFIG_CONTENT` environment variable
//! 3. Project config: `folio.jsonc` or `folio.json` in the project directory

use crate::diff::DiffAlgorithm;
use crate::policy::SnapshotPolicy;
use crate::retention::RetentionOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding inline JSONC configuration.
pub const CONFIG_ENV_VAR: &str = "FOLIO_CONFIG_CONTENT";

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid JSON/JSONC syntax.
    #[error("invalid config at {path}: {message}")]
    InvalidJson { path: String, message: String },

    /// Config validation failed.
    #[error("config validation failed: {message}")]
    Validation { message: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// History paging limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Page size when the caller gives none.
    pub default_limit: usize,
    /// Upper bound on any page size.
    pub max_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 100,
        }
    }
}

impl HistoryConfig {
    /// Effective page size for a requested limit.
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

/// Top-level folio configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Auto-snapshot thresholds.
    pub policy: SnapshotPolicy,

    /// History paging limits.
    pub history: HistoryConfig,

    /// Default retention applied by cleanup.
    pub retention: RetentionOptions,

    /// Diff algorithm used for comparisons.
    pub diff: DiffAlgorithm,

    /// Directory of the JSON record store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl FolioConfig {
    /// Load configuration from all sources.
    ///
    /// Returns the merged configuration and the files it was read from.
    pub async fn load(project_dir: Option<&Path>) -> ConfigResult<(Self, Vec<PathBuf>)> {
        let mut layers = Vec::new();
        let mut sources = Vec::new();

        if let Some(global_dir) = Self::global_config_dir() {
            if let Some(path) = Self::find_file(&global_dir, &["folio.jsonc", "folio.json"]) {
                layers.push(Self::read_layer(&path).await?);
                sources.push(path);
            }
        }

        if let Ok(content) = std::env::var(CONFIG_ENV_VAR) {
            layers.push(Self::parse_layer(&content, "<env>")?);
        }

        if let Some(dir) = project_dir {
            if let Some(path) = Self::find_file(dir, &["folio.jsonc", "folio.json"]) {
                layers.push(Self::read_layer(&path).await?);
                sources.push(path);
            }
        }

        let mut merged = serde_json::Value::Object(serde_json::Map::new());
        for layer in layers {
            merge_values(&mut merged, layer);
        }

        let config: Self = serde_json::from_value(merged).map_err(|e| ConfigError::InvalidJson {
            path: "<merged>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;

        Ok((config, sources))
    }

    /// Load configuration from a single file.
    pub async fn load_file(path: &Path) -> ConfigResult<Self> {
        let layer = Self::read_layer(path).await?;
        let config: Self = serde_json::from_value(layer).map_err(|e| ConfigError::InvalidJson {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Get the global config directory (`~/.config/folio` on Unix).
    pub fn global_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("folio"))
    }

    /// Directory for the record store: configured, or the platform data directory.
    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_local_dir().map(|p| p.join("folio")))
    }

    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.history.max_limit == 0 {
            return Err(ConfigError::Validation {
                message: "history.max_limit must be at least 1".to_string(),
            });
        }
        if self.history.default_limit > self.history.max_limit {
            return Err(ConfigError::Validation {
                message: format!(
                    "history.default_limit ({}) exceeds history.max_limit ({})",
                    self.history.default_limit, self.history.max_limit
                ),
            });
        }
        if !self.policy.line_delta_ratio.is_finite() || self.policy.line_delta_ratio < 0.0 {
            return Err(ConfigError::Validation {
                message: "policy.line_delta_ratio must be a non-negative number".to_string(),
            });
        }
        Ok(())
    }

    fn find_file(dir: &Path, names: &[&str]) -> Option<PathBuf> {
        names.iter().map(|n| dir.join(n)).find(|p| p.exists())
    }

    async fn read_layer(path: &Path) -> ConfigResult<serde_json::Value> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse_layer(&content, &path.display().to_string())
    }

    /// Parse JSONC (JSON with comments) into a raw layer.
    fn parse_layer(content: &str, source: &str) -> ConfigResult<serde_json::Value> {
        let stripped = strip_comments(content);
        let value: serde_json::Value =
            serde_json::from_str(&stripped).map_err(|e| ConfigError::InvalidJson {
                path: source.to_string(),
                message: e.to_string(),
            })?;

        if !value.is_object() {
            return Err(ConfigError::InvalidJson {
                path: source.to_string(),
                message: "top-level value must be an object".to_string(),
            });
        }
        Ok(value)
    }
}

/// Deep-merge `overlay` into `base`; objects merge per key, anything else replaces.
fn merge_values(base: &mut serde_json::Value, overlay: serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Strip `//` and `/* */` comments outside of strings.
fn strip_comments(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape_next = false;

    while let Some(c) = chars.next() {
        if escape_next {
            result.push(c);
            escape_next = false;
            continue;
        }

        if in_string {
            if c == '\\' {
                escape_next = true;
            } else if c == '"' {
                in_string = false;
            }
            result.push(c);
            continue;
        }

        match (c, chars.peek().copied()) {
            ('"', _) => {
                in_string = true;
                result.push(c);
            }
            ('/', Some('/')) => {
                for c in chars.by_ref() {
                    if c == '\n' {
                        result.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = ' ';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    // Preserve newlines for error reporting
                    if c == '\n' {
                        result.push('\n');
                    }
                    prev = c;
                }
            }
            _ => result.push(c),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = FolioConfig::default();
        assert_eq!(config.history.default_limit, 50);
        assert_eq!(config.history.max_limit, 100);
        assert_eq!(config.retention.keep_recent_count, 50);
        assert!(config.retention.keep_all_snapshots);
        assert_eq!(config.diff, DiffAlgorithm::Positional);
        assert_eq!(config.policy, SnapshotPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_effective_limit() {
        let history = HistoryConfig::default();
        assert_eq!(history.effective_limit(None), 50);
        assert_eq!(history.effective_limit(Some(10)), 10);
        assert_eq!(history.effective_limit(Some(500)), 100);
    }

    #[test]
    fn test_strip_comments() {
        let input = r#"{
            // line comment
            "a": "http://not-a-comment", /* block
            comment */ "b": "quote \" // still string"
        }"#;
        let value: serde_json::Value = serde_json::from_str(&strip_comments(input)).unwrap();
        assert_eq!(value["a"], "http://not-a-comment");
        assert_eq!(value["b"], "quote \" // still string");
    }

    #[test]
    fn test_merge_values_is_deep() {
        let mut base =
            serde_json::json!({"policy": {"min_line_delta": 3, "char_delta_threshold": 50}});
        merge_values(
            &mut base,
            serde_json::json!({"policy": {"char_delta_threshold": 200}, "diff": "lcs"}),
        );
        assert_eq!(
            base,
            serde_json::json!({
                "policy": {"min_line_delta": 3, "char_delta_threshold": 200},
                "diff": "lcs"
            })
        );
    }

    #[tokio::test]
    async fn test_load_file_partial_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("folio.jsonc");
        tokio::fs::write(
            &path,
            r#"{
                // switch to the realigning diff
                "diff": "lcs",
                "history": { "default_limit": 20 },
                "retention": { "keep_recent_count": 5 }
            }"#,
        )
        .await
        .unwrap();

        let config = FolioConfig::load_file(&path).await.unwrap();
        assert_eq!(config.diff, DiffAlgorithm::Lcs);
        assert_eq!(config.history.default_limit, 20);
        assert_eq!(config.history.max_limit, 100);
        assert_eq!(config.retention.keep_recent_count, 5);
        assert!(config.retention.keep_all_snapshots);
    }

    #[tokio::test]
    async fn test_load_file_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("folio.json");
        tokio::fs::write(&path, r#"{"history": {"default_limit": 500}}"#)
            .await
            .unwrap();

        let result = FolioConfig::load_file(&path).await;
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_load_file_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("folio.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();

        let result = FolioConfig::load_file(&path).await;
        assert!(matches!(result, Err(ConfigError::InvalidJson { .. })));
    }

    #[tokio::test]
    async fn test_load_project_dir() {
        let dir = TempDir::new().unwrap();
        tokio::fs::write(
            dir.path().join("folio.json"),
            r#"{"data_dir": "/tmp/folio-data", "policy": {"char_delta_threshold": 10}}"#,
        )
        .await
        .unwrap();

        let (config, sources) = FolioConfig::load(Some(dir.path())).await.unwrap();
        assert_eq!(config.policy.char_delta_threshold, 10);
        assert_eq!(config.resolve_data_dir(), Some(PathBuf::from("/tmp/folio-data")));
        assert!(sources.contains(&dir.path().join("folio.json")));
    }
}
