use clap::Subcommand;
use std::path::Path;
use trail_ledger::config::{read_config, write_config};
use trail_ledger::{TrailConfig, TrailPaths};

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Set a config value
    Set {
        /// Config key (e.g. merge_window_minutes)
        key: String,
        /// Config value (true/false/number/string)
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values, including defaults
    List,
}

// ── Dispatch ──

pub fn run(cmd: ConfigCmd, repo_root: &Path) -> anyhow::Result<()> {
    match cmd {
        ConfigCmd::Set { key, value } => set(repo_root, &key, &value),
        ConfigCmd::Get { key } => get(repo_root, &key),
        ConfigCmd::List => list(repo_root),
    }
}

// ── Command Implementations ──

fn workspace(repo_root: &Path) -> anyhow::Result<TrailPaths> {
    let paths = TrailPaths::discover(repo_root);
    if !paths.is_initialized() {
        anyhow::bail!("No .trail/ workspace found. Run `trail init` first.");
    }
    Ok(paths)
}

/// Parse a string value into an appropriate JSON value (bool/number/string).
fn parse_value(s: &str) -> serde_json::Value {
    match s {
        "true" => serde_json::Value::Bool(true),
        "false" => serde_json::Value::Bool(false),
        _ => {
            if let Ok(n) = s.parse::<i64>() {
                serde_json::Value::Number(n.into())
            } else if let Ok(f) = s.parse::<f64>() {
                serde_json::json!(f)
            } else {
                serde_json::Value::String(s.to_string())
            }
        }
    }
}

/// The effective config as a flat object: defaults overlaid with the file.
fn effective(paths: &TrailPaths) -> anyhow::Result<serde_json::Map<String, serde_json::Value>> {
    let mut merged = match serde_json::to_value(TrailConfig::load(paths))? {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    for (k, v) in read_config(&paths.config_json)? {
        merged.entry(k).or_insert(v);
    }
    Ok(merged)
}

/// `trail config set <key> <value>`
pub fn set(repo_root: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let paths = workspace(repo_root)?;
    let mut config = read_config(&paths.config_json)?;
    config.insert(key.to_string(), parse_value(value));

    // Reject values the typed config would silently discard.
    let candidate = serde_json::Value::Object(config.clone());
    let typed = serde_json::from_value::<TrailConfig>(candidate)
        .map_err(|e| anyhow::anyhow!("invalid value for {key}: {e}"))?;
    typed
        .validate()
        .map_err(|e| anyhow::anyhow!("invalid value for {key}: {e}"))?;
    write_config(&paths.config_json, &config)?;
    println!("{key} = {value}");
    Ok(())
}

/// `trail config get <key>`
pub fn get(repo_root: &Path, key: &str) -> anyhow::Result<()> {
    let paths = workspace(repo_root)?;
    match effective(&paths)?.get(key) {
        Some(val) => println!("{val}"),
        None => println!("(not set)"),
    }
    Ok(())
}

/// `trail config list`
pub fn list(repo_root: &Path) -> anyhow::Result<()> {
    let paths = workspace(repo_root)?;
    for (k, v) in &effective(&paths)? {
        println!("{k} = {v}");
    }
    Ok(())
}
