//! Shard naming and active-shard selection.
//!
//! A date's events live in `<date>.log`; once that file reaches the
//! rotation threshold, overflow goes to `<date>-2.log`, `<date>-3.log`, ...
//! There is never a `-1` shard. Existing logs already use this numbering.

use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::Date;

/// Default rotation threshold: 5 MiB.
pub const ROTATE_BYTES: u64 = 5_242_880;

/// Index of the first overflow shard.
pub const FIRST_OVERFLOW_INDEX: u32 = 2;

const SHARD_EXT: &str = ".log";

/// Parsed shard file name. Orders chronologically: by date, then the base
/// shard (`index == None`) before its overflow shards in index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ShardName {
    pub date: Date,
    pub index: Option<u32>,
}

impl ShardName {
    pub fn base(date: Date) -> Self {
        Self { date, index: None }
    }

    pub fn overflow(date: Date, index: u32) -> Self {
        Self {
            date,
            index: Some(index),
        }
    }

    pub fn file_name(&self) -> String {
        let date = format_date(self.date);
        match self.index {
            None => format!("{date}{SHARD_EXT}"),
            Some(n) => format!("{date}-{n}{SHARD_EXT}"),
        }
    }

    /// Parse `2026-03-01.log` or `2026-03-01-2.log`. Anything else is not a shard.
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(SHARD_EXT)?;
        let date_part = stem.get(..10)?;
        let date = Date::parse(date_part, format_description!("[year]-[month]-[day]")).ok()?;
        match &stem[10..] {
            "" => Some(Self::base(date)),
            rest => {
                let n: u32 = rest.strip_prefix('-')?.parse().ok()?;
                Some(Self::overflow(date, n))
            }
        }
    }
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

/// All shard files in `dir`, in chronological order. Missing dir yields no shards.
pub fn list_shards(dir: &Path) -> anyhow::Result<Vec<(ShardName, PathBuf)>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut shards = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str().and_then(ShardName::parse) else {
            continue;
        };
        shards.push((name, entry.path()));
    }
    shards.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(shards)
}

fn file_len(path: &Path) -> anyhow::Result<u64> {
    match std::fs::metadata(path) {
        Ok(m) => Ok(m.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e.into()),
    }
}

/// Pick the shard the next append for `date` should go to.
///
/// The base shard is used until it reaches `threshold`. After that the
/// newest overflow shard is reused until it too is full, and only then is a
/// new one opened. Its index is the larger of `existing overflow count + 2`
/// and `newest index + 1`, so a gap in the numbering never reopens a full
/// shard.
pub fn select_active(dir: &Path, date: Date, threshold: u64) -> anyhow::Result<PathBuf> {
    let base = dir.join(ShardName::base(date).file_name());
    if file_len(&base)? < threshold {
        return Ok(base);
    }

    let overflow: Vec<(ShardName, PathBuf)> = list_shards(dir)?
        .into_iter()
        .filter(|(name, _)| name.date == date && name.index.is_some())
        .collect();

    if let Some((_, newest)) = overflow.last() {
        if file_len(newest)? < threshold {
            return Ok(newest.clone());
        }
    }

    let newest_next = overflow
        .last()
        .and_then(|(name, _)| name.index)
        .map_or(FIRST_OVERFLOW_INDEX, |i| i.saturating_add(1));
    let next = (overflow.len() as u32 + FIRST_OVERFLOW_INDEX).max(newest_next);
    let path = dir.join(ShardName::overflow(date, next).file_name());
    tracing::info!(shard = %path.display(), "rotating event log");
    Ok(path)
}
