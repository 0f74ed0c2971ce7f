//! Workspace configuration stored in `.trail/config.json`.
//!
//! The file is a flat JSON object. Missing keys take their defaults, an
//! out-of-range value falls back to its default, and an unreadable file
//! falls back to defaults entirely.

use crate::paths::TrailPaths;
use crate::shard::ROTATE_BYTES;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_MERGE_WINDOW_MINUTES: i64 = 30;

/// Largest merge window whose length in seconds still fits an `i64`.
pub const MAX_MERGE_WINDOW_MINUTES: i64 = i64::MAX / 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Max gap between consecutive same-file events folded into one block.
    pub merge_window_minutes: i64,
    /// Shard size at which the log rotates.
    pub rotate_bytes: u64,
    /// Max number of files whose content the change detector remembers.
    pub cache_capacity: usize,
    /// Max lines of line context kept as a block's code excerpt.
    pub excerpt_max_lines: usize,
    /// OpenAI-compatible chat completions endpoint.
    pub generation_endpoint: String,
    pub generation_model: String,
    /// Name of the environment variable holding the API key.
    pub generation_api_key_env: String,
    pub generation_timeout_secs: u64,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            merge_window_minutes: DEFAULT_MERGE_WINDOW_MINUTES,
            rotate_bytes: ROTATE_BYTES,
            cache_capacity: 256,
            excerpt_max_lines: 20,
            generation_endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            generation_model: "gpt-4o-mini".to_string(),
            generation_api_key_env: "OPENAI_API_KEY".to_string(),
            generation_timeout_secs: 120,
        }
    }
}

impl TrailConfig {
    /// Load from `.trail/config.json`. Returns defaults if the file is
    /// missing or unparseable.
    pub fn load(paths: &TrailPaths) -> Self {
        let content = match std::fs::read_to_string(&paths.config_json) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str::<Self>(&content) {
            Ok(mut cfg) => {
                if let Err(e) = cfg.validate() {
                    tracing::warn!(
                        path = %paths.config_json.display(),
                        error = %e,
                        "ignoring out-of-range merge_window_minutes"
                    );
                    cfg.merge_window_minutes = DEFAULT_MERGE_WINDOW_MINUTES;
                }
                cfg
            }
            Err(e) => {
                tracing::warn!(
                    path = %paths.config_json.display(),
                    error = %e,
                    "ignoring unreadable config, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Reject values that would disable or overflow the merge window.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0..=MAX_MERGE_WINDOW_MINUTES).contains(&self.merge_window_minutes) {
            anyhow::bail!(
                "merge_window_minutes must be between 0 and {MAX_MERGE_WINDOW_MINUTES}, got {}",
                self.merge_window_minutes
            );
        }
        Ok(())
    }

    /// The merge window. An out-of-range value yields the default window.
    pub fn merge_window(&self) -> time::Duration {
        let minutes = if self.validate().is_ok() {
            self.merge_window_minutes
        } else {
            DEFAULT_MERGE_WINDOW_MINUTES
        };
        minutes
            .checked_mul(60)
            .map(time::Duration::seconds)
            .unwrap_or_else(|| time::Duration::minutes(DEFAULT_MERGE_WINDOW_MINUTES))
    }
}

/// Read the raw config object. Returns an empty map if the file doesn't exist.
pub fn read_config(path: &Path) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    if !path.exists() {
        return Ok(serde_json::Map::new());
    }
    let content = std::fs::read_to_string(path)?;
    let val: serde_json::Value = serde_json::from_str(&content)?;
    match val {
        serde_json::Value::Object(map) => Ok(map),
        _ => Ok(serde_json::Map::new()),
    }
}

/// Write the raw config object atomically.
pub fn write_config(
    path: &Path,
    config: &serde_json::Map<String, serde_json::Value>,
) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    crate::atomic::write_atomic(path, json.as_bytes())
}

/// Write the default config if none exists yet. Returns true if written.
pub fn init_config(paths: &TrailPaths) -> anyhow::Result<bool> {
    if paths.config_json.exists() {
        return Ok(false);
    }
    let json = serde_json::to_string_pretty(&TrailConfig::default())?;
    crate::atomic::write_atomic(&paths.config_json, json.as_bytes())?;
    Ok(true)
}
