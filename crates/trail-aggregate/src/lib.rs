//! Folds an ordered raw event stream into per-file `BaseBlock`s.
//!
//! Consecutive events on the same file whose gap is within the merge window
//! collapse into one block. Merging is by temporal adjacency only: a later
//! burst on a file opens a new block even if an older block for that file
//! exists. Input must already be sorted by timestamp; output follows the
//! order in which blocks were opened.

use std::collections::BTreeSet;
use time::{Duration, OffsetDateTime};
use trail_core::{AiNotePayload, BaseBlock, EventKind, RawEvent, WorkType};

/// Separator between summary fragments of one block.
pub const SUMMARY_SEPARATOR: &str = " | ";

const SAVE_GOAL: &str = "code changes";
const DECISION_GOAL: &str = "decision memo";

#[derive(Debug, Clone)]
pub struct AggregateOptions {
    pub merge_window: Duration,
    pub excerpt_max_lines: usize,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            merge_window: Duration::minutes(30),
            excerpt_max_lines: 20,
        }
    }
}

struct BlockBuilder {
    file: String,
    start: OffsetDateTime,
    last_seen: OffsetDateTime,
    work_type: Option<WorkType>,
    main_goal: Option<String>,
    fragments: Vec<String>,
    functions: BTreeSet<String>,
    risks: Option<String>,
    next_steps: Option<String>,
    excerpt: Option<String>,
}

impl BlockBuilder {
    fn open(event: &RawEvent) -> Self {
        Self {
            file: event.file_key().to_string(),
            start: event.timestamp,
            last_seen: event.timestamp,
            work_type: None,
            main_goal: None,
            fragments: Vec::new(),
            functions: BTreeSet::new(),
            risks: None,
            next_steps: None,
            excerpt: None,
        }
    }

    fn accepts(&self, event: &RawEvent, window: Duration) -> bool {
        self.file == event.file_key() && event.timestamp - self.last_seen <= window
    }

    fn default_goal(&mut self, work_type: WorkType, goal: Option<&str>) {
        if self.work_type.is_none() {
            self.work_type = Some(work_type);
        }
        if self.main_goal.is_none() {
            self.main_goal = goal.map(str::to_string);
        }
    }

    fn fold(&mut self, event: &RawEvent, opts: &AggregateOptions) {
        if event.timestamp > self.last_seen {
            self.last_seen = event.timestamp;
        }
        match &event.kind {
            EventKind::FileSave {
                added_lines,
                removed_lines,
                ..
            } => {
                self.fragments
                    .push(format!("saved (+{added_lines}/-{removed_lines})"));
                self.default_goal(WorkType::Feature, Some(SAVE_GOAL));
            }
            EventKind::Decision { note, line_context } => {
                self.fragments.push(format!("decision: {note}"));
                self.default_goal(WorkType::Chore, Some(DECISION_GOAL));
                self.take_excerpt(line_context.as_deref(), opts.excerpt_max_lines);
            }
            EventKind::Bugfix { note, line_context } => {
                self.fragments.push(format!("bugfix note: {note}"));
                self.default_goal(WorkType::Bugfix, None);
                self.take_excerpt(line_context.as_deref(), opts.excerpt_max_lines);
            }
            EventKind::AiNote(note) => self.apply_ai_note(note),
        }
    }

    /// AI notes are authoritative for the block's classification.
    fn apply_ai_note(&mut self, note: &AiNotePayload) {
        self.work_type = Some(note.work_type);
        self.main_goal = Some(note.main_goal.clone());
        self.risks = note.risks.clone();
        self.next_steps = note.next_steps.clone();
        let summary = note.change_summary.trim();
        if !summary.is_empty() {
            self.fragments.push(summary.to_string());
        }
        self.functions.extend(
            note.important_functions
                .iter()
                .map(|f| f.trim())
                .filter(|f| !f.is_empty())
                .map(str::to_string),
        );
    }

    fn take_excerpt(&mut self, context: Option<&str>, max_lines: usize) {
        if let Some(ctx) = context {
            let clipped: Vec<&str> = ctx.lines().take(max_lines).collect();
            if !clipped.is_empty() {
                self.excerpt = Some(clipped.join("\n"));
            }
        }
    }

    fn finish(self) -> Option<BaseBlock> {
        let change_summary = self.fragments.join(SUMMARY_SEPARATOR);
        if change_summary.trim().is_empty() {
            return None;
        }
        Some(BaseBlock {
            time_start: self.start,
            time_end: self.last_seen,
            file: self.file,
            work_type: self.work_type,
            main_goal: self.main_goal,
            change_summary,
            important_functions: self.functions,
            risks: self.risks,
            next_steps: self.next_steps,
            code_excerpt: self.excerpt,
        })
    }
}

/// Aggregate timestamp-sorted events into blocks.
pub fn aggregate(events: &[RawEvent], opts: &AggregateOptions) -> Vec<BaseBlock> {
    let mut builders: Vec<BlockBuilder> = Vec::new();
    for event in events {
        match builders.last_mut() {
            Some(current) if current.accepts(event, opts.merge_window) => {
                current.fold(event, opts);
            }
            _ => {
                let mut builder = BlockBuilder::open(event);
                builder.fold(event, opts);
                builders.push(builder);
            }
        }
    }
    builders.into_iter().filter_map(BlockBuilder::finish).collect()
}

/// Sort events by timestamp. Stable, so same-instant events keep log order.
pub fn sort_events(events: &mut [RawEvent]) {
    events.sort_by_key(|e| e.timestamp);
}
