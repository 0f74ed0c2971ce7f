//! Recovery of structured results from untrusted generated text.
//!
//! Generated output is expected to encode one JSON value but may be wrapped
//! in commentary or code fences. Extraction order: the whole text, then the
//! span from the first `{` to the last `}`. The span from the first `[` to
//! the last `]` is only tried when the text has no `{`..`}` pair, so a
//! truncated object never degrades into its inner array.

use crate::error::ReasonError;
use serde_json::{Map, Value};
use trail_core::{AiNotePayload, Alternative, Concept, ReasoningBlock, WorkType};

/// Recover the JSON value encoded in `text`.
pub fn extract_json(text: &str) -> Result<Value, ReasonError> {
    if let Ok(v) = serde_json::from_str::<Value>(text.trim()) {
        return Ok(v);
    }
    let span = match delimited_span(text, '{', '}') {
        Some(object) => object,
        None => delimited_span(text, '[', ']').ok_or(ReasonError::NoJson)?,
    };
    serde_json::from_str::<Value>(span).map_err(|_| ReasonError::NoJson)
}

/// Inclusive span from the first `open` to the last `close`.
fn delimited_span(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parse and validate reasoning blocks from a generated response.
///
/// Accepts either a bare array of blocks or an object with a `blocks` array.
/// Entries without a non-empty `time`, `oneLineSummary` and `problem` are
/// dropped; if none survive the result is `EmptyResult`.
pub fn parse_reasoning(text: &str) -> Result<Vec<ReasoningBlock>, ReasonError> {
    let value = extract_json(text)?;
    let candidates = match &value {
        Value::Array(items) => items,
        Value::Object(obj) => match obj.get("blocks") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(ReasonError::Schema("`blocks` is not an array".into())),
            None => return Err(ReasonError::Schema("missing `blocks` array".into())),
        },
        _ => {
            return Err(ReasonError::Schema(
                "expected an array or an object with `blocks`".into(),
            ))
        }
    };

    let total = candidates.len();
    let blocks: Vec<ReasoningBlock> = candidates.iter().filter_map(coerce_block).collect();
    if blocks.len() < total {
        tracing::debug!(
            dropped = total - blocks.len(),
            kept = blocks.len(),
            "dropped invalid reasoning blocks"
        );
    }
    if blocks.is_empty() {
        return Err(ReasonError::EmptyResult);
    }
    Ok(blocks)
}

fn coerce_block(value: &Value) -> Option<ReasoningBlock> {
    let obj = value.as_object()?;
    Some(ReasoningBlock {
        time: required_str(obj, "time")?,
        one_line_summary: required_str(obj, "oneLineSummary")?,
        problem: required_str(obj, "problem")?,
        file: obj
            .get("file")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        behavior: str_list(obj.get("behavior")),
        concepts: objects(obj.get("concepts"))
            .map(|c| Concept {
                name: str_field(c, "name"),
                what_it_is: str_field(c, "whatItIs"),
                why_relevant_here: str_field(c, "whyRelevantHere"),
                pitfalls: str_list(c.get("pitfalls")),
            })
            .collect(),
        alternatives: objects(obj.get("alternatives"))
            .map(|a| Alternative {
                name: str_field(a, "name"),
                pros: str_list(a.get("pros")),
                cons: str_list(a.get("cons")),
            })
            .collect(),
        why_chosen: str_list(obj.get("whyChosen")),
        tradeoffs: str_list(obj.get("tradeoffs")),
        remember_this: str_list(obj.get("rememberThis")),
    })
}

/// Parse a generated AI-note draft. `mainGoal` and `changeSummary` must be
/// non-empty; an unknown or missing `workType` becomes `other`.
pub fn parse_ai_note(text: &str) -> Result<AiNotePayload, ReasonError> {
    let value = extract_json(text)?;
    let obj = match &value {
        Value::Object(obj) => obj,
        _ => return Err(ReasonError::Schema("expected an AI note object".into())),
    };
    let (Some(main_goal), Some(change_summary)) = (
        required_str(obj, "mainGoal"),
        required_str(obj, "changeSummary"),
    ) else {
        return Err(ReasonError::EmptyResult);
    };
    Ok(AiNotePayload {
        work_type: obj
            .get("workType")
            .and_then(Value::as_str)
            .map(WorkType::parse)
            .unwrap_or(WorkType::Other),
        main_goal,
        change_summary,
        important_functions: str_list(obj.get("importantFunctions")),
        risks: required_str(obj, "risks"),
        next_steps: required_str(obj, "nextSteps"),
    })
}

/// A string field that must be present and non-blank.
fn required_str(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

fn str_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// String items of a list field. Absent or non-list values yield an empty list.
fn str_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn objects(value: Option<&Value>) -> impl Iterator<Item = &Map<String, Value>> {
    let items: &[Value] = match value {
        Some(Value::Array(items)) => items,
        _ => &[],
    };
    items.iter().filter_map(Value::as_object)
}
