use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Branch recorded when the VCS branch cannot be resolved.
pub const UNKNOWN_BRANCH: &str = "unknown";

/// Aggregation key for events that carry no file path (e.g. a free-standing decision).
pub const NO_FILE: &str = "(no file)";

/// Coarse classification of a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkType {
    Feature,
    Bugfix,
    Refactor,
    Chore,
    Docs,
    Test,
    /// Anything a generated note labels with a type we do not know.
    #[serde(other)]
    Other,
}

impl WorkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::Feature => "feature",
            WorkType::Bugfix => "bugfix",
            WorkType::Refactor => "refactor",
            WorkType::Chore => "chore",
            WorkType::Docs => "docs",
            WorkType::Test => "test",
            WorkType::Other => "other",
        }
    }

    /// Lenient parse used for CLI input and generated text. Unknown labels map to `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "feature" | "feat" => WorkType::Feature,
            "bugfix" | "fix" | "bug" => WorkType::Bugfix,
            "refactor" => WorkType::Refactor,
            "chore" => WorkType::Chore,
            "docs" | "doc" => WorkType::Docs,
            "test" | "tests" => WorkType::Test,
            _ => WorkType::Other,
        }
    }
}

impl std::fmt::Display for WorkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured note describing a change, usually drafted by an external generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiNotePayload {
    pub work_type: WorkType,
    pub main_goal: String,
    pub change_summary: String,
    #[serde(default)]
    pub important_functions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<String>,
}

/// Kind-specific part of a raw event. Serialized inline with a `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EventKind {
    FileSave {
        added_lines: u64,
        removed_lines: u64,
        language_id: String,
    },
    Decision {
        note: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line_context: Option<String>,
    },
    Bugfix {
        note: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line_context: Option<String>,
    },
    AiNote(AiNotePayload),
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::FileSave { .. } => "fileSave",
            EventKind::Decision { .. } => "decision",
            EventKind::Bugfix { .. } => "bugfix",
            EventKind::AiNote(_) => "aiNote",
        }
    }
}

/// A single captured activity event (one JSON line in a log shard).
/// Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl RawEvent {
    /// The key this event aggregates under.
    pub fn file_key(&self) -> &str {
        self.file_path.as_deref().unwrap_or(NO_FILE)
    }
}
