use crate::config::TrailConfig;
use crate::paths::TrailPaths;
use crate::shard::{list_shards, select_active};
use fs2::FileExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use time::UtcOffset;
use trail_core::RawEvent;

/// Result of reading every shard.
#[derive(Debug, Default)]
pub struct ReadOutcome {
    /// Parsed events in shard order, then line order.
    pub events: Vec<RawEvent>,
    /// Non-empty lines that did not parse as an event.
    pub skipped: usize,
}

/// Append-only event log split into date-named shards under `.trail/logs/`.
///
/// Assumes a single writing process. Each append takes an exclusive
/// advisory lock on the shard for the duration of the write.
pub struct EventLog {
    logs_dir: PathBuf,
    rotate_bytes: u64,
}

impl EventLog {
    pub fn new(logs_dir: impl Into<PathBuf>, rotate_bytes: u64) -> Self {
        Self {
            logs_dir: logs_dir.into(),
            rotate_bytes,
        }
    }

    pub fn open(paths: &TrailPaths, config: &TrailConfig) -> Self {
        Self::new(&paths.logs_dir, config.rotate_bytes)
    }

    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Append one event as a single JSON line to the active shard for the
    /// event's UTC date. Returns the shard written to.
    pub fn append(&self, event: &RawEvent) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.logs_dir)?;
        let date = event.timestamp.to_offset(UtcOffset::UTC).date();
        let shard = select_active(&self.logs_dir, date, self.rotate_bytes)?;

        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&shard)
            .map_err(|e| anyhow::anyhow!("cannot open shard {}: {e}", shard.display()))?;
        file.lock_exclusive()?;
        let written = file.write_all(line.as_bytes());
        let _ = file.unlock();
        written.map_err(|e| anyhow::anyhow!("cannot append to {}: {e}", shard.display()))?;
        Ok(shard)
    }

    /// Read every event from every shard, in chronological shard order.
    ///
    /// Lines that fail to parse (partial writes, foreign content, invalid
    /// UTF-8) are skipped and counted, never raised.
    pub fn read_all(&self) -> anyhow::Result<ReadOutcome> {
        let mut outcome = ReadOutcome::default();
        for (_, path) in list_shards(&self.logs_dir)? {
            let bytes = std::fs::read(&path)?;
            for line in bytes.split(|b| *b == b'\n') {
                if line.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                match serde_json::from_slice::<RawEvent>(line) {
                    Ok(event) => outcome.events.push(event),
                    Err(e) => {
                        tracing::debug!(
                            shard = %path.display(),
                            error = %e,
                            "skipping unreadable line"
                        );
                        outcome.skipped += 1;
                    }
                }
            }
        }
        if outcome.skipped > 0 {
            tracing::warn!(
                skipped = outcome.skipped,
                kept = outcome.events.len(),
                "event log contained unreadable lines"
            );
        }
        Ok(outcome)
    }
}
