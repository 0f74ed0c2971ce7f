//! Line-level change detection against the last observed content of each file.

use crate::branch::BranchResolver;
use lru::LruCache;
use similar::{ChangeTag, TextDiff};
use std::num::NonZeroUsize;
use std::sync::Arc;
use trail_core::event::new_file_save_event;
use trail_core::RawEvent;

/// Lines inserted and removed between two versions of a file.
/// A modified line counts once in each direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineDelta {
    pub added: u64,
    pub removed: u64,
}

impl LineDelta {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Count inserted and removed lines from `prev` to `curr`.
pub fn line_delta(prev: &str, curr: &str) -> LineDelta {
    let diff = TextDiff::from_lines(prev, curr);
    let mut delta = LineDelta::default();
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => delta.added += 1,
            ChangeTag::Delete => delta.removed += 1,
            ChangeTag::Equal => {}
        }
    }
    delta
}

/// Tracks the last-known content per file and turns saves into `fileSave` events.
///
/// The cache is bounded: once `capacity` files are tracked, the least recently
/// touched one is evicted and its next save diffs against an empty baseline.
pub struct ChangeDetector {
    cache: LruCache<String, String>,
    branch: Arc<dyn BranchResolver>,
}

impl ChangeDetector {
    pub fn new(capacity: usize, branch: Arc<dyn BranchResolver>) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(cap),
            branch,
        }
    }

    /// Remember `content` as the baseline for `file`, unless one is already known.
    pub fn prime(&mut self, file: &str, content: &str) {
        if self.cache.get(file).is_none() {
            self.cache.put(file.to_string(), content.to_string());
        }
    }

    /// Diff `content` against the cached baseline (empty if never seen),
    /// update the baseline, and emit a `fileSave` event.
    ///
    /// A file that was never primed has its entire content counted as added.
    pub fn capture(&mut self, file: &str, language_id: &str, content: &str) -> RawEvent {
        let delta = match self.cache.get(file) {
            Some(baseline) => line_delta(baseline, content),
            None => line_delta("", content),
        };
        self.cache.put(file.to_string(), content.to_string());
        let branch = self.branch.branch_or_unknown();
        tracing::debug!(
            file,
            added = delta.added,
            removed = delta.removed,
            "captured save"
        );
        new_file_save_event(file, &branch, delta.added, delta.removed, language_id)
    }

    /// Drop the baseline for a closed file.
    pub fn forget(&mut self, file: &str) {
        self.cache.pop(file);
    }

    /// Unified diff of `content` against the cached baseline. Does not update the cache.
    pub fn unified_diff(&self, file: &str, content: &str) -> String {
        let baseline = self.cache.peek(file).map(String::as_str).unwrap_or("");
        let old_header = format!("a/{file}");
        let new_header = format!("b/{file}");
        TextDiff::from_lines(baseline, content)
            .unified_diff()
            .context_radius(3)
            .header(&old_header, &new_header)
            .to_string()
    }

    pub fn is_tracked(&self, file: &str) -> bool {
        self.cache.contains(file)
    }

    pub fn tracked_len(&self) -> usize {
        self.cache.len()
    }
}
