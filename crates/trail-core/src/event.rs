use crate::types::{AiNotePayload, EventKind, RawEvent};
use time::OffsetDateTime;

pub fn now_utc() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// Format a timestamp as RFC 3339. Falls back to an empty string, which
/// only happens for years outside 0..=9999.
pub fn format_rfc3339(ts: OffsetDateTime) -> String {
    ts.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}

fn new_event(file_path: Option<&str>, branch: Option<&str>, kind: EventKind) -> RawEvent {
    RawEvent {
        timestamp: now_utc(),
        file_path: file_path.map(|s| s.to_string()),
        branch: branch.map(|s| s.to_string()),
        kind,
    }
}

/// Create a new `fileSave` event stamped with the current time.
pub fn new_file_save_event(
    file_path: &str,
    branch: &str,
    added_lines: u64,
    removed_lines: u64,
    language_id: &str,
) -> RawEvent {
    new_event(
        Some(file_path),
        Some(branch),
        EventKind::FileSave {
            added_lines,
            removed_lines,
            language_id: language_id.to_string(),
        },
    )
}

/// Create a new `decision` event. Empty line context is dropped.
pub fn new_decision_event(
    file_path: Option<&str>,
    branch: Option<&str>,
    note: &str,
    line_context: Option<&str>,
) -> RawEvent {
    new_event(
        file_path,
        branch,
        EventKind::Decision {
            note: note.to_string(),
            line_context: non_empty(line_context),
        },
    )
}

/// Create a new `bugfix` event. Empty line context is dropped.
pub fn new_bugfix_event(
    file_path: Option<&str>,
    branch: Option<&str>,
    note: &str,
    line_context: Option<&str>,
) -> RawEvent {
    new_event(
        file_path,
        branch,
        EventKind::Bugfix {
            note: note.to_string(),
            line_context: non_empty(line_context),
        },
    )
}

/// Create a new `aiNote` event.
pub fn new_ai_note_event(
    file_path: Option<&str>,
    branch: Option<&str>,
    note: AiNotePayload,
) -> RawEvent {
    new_event(file_path, branch, EventKind::AiNote(note))
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim_end)
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
}
