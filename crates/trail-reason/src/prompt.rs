use trail_core::BaseBlock;

/// Instruction sent with a report request. The payload is a JSON array of base blocks.
pub const REPORT_INSTRUCTION: &str = r#"You explain a developer's recent coding activity so they can learn from it.
The user message is a JSON array of work blocks in time order. Each block has
timeStart, timeEnd, file, workType, mainGoal, changeSummary, importantFunctions,
risks, nextSteps and codeExcerpt.

Respond with a single JSON object and nothing else:
{"blocks": [{
  "time": "HH:MM-HH:MM",
  "file": "path of the block's file",
  "oneLineSummary": "one sentence",
  "problem": "what problem this work addressed",
  "behavior": ["observable behavior after the change"],
  "concepts": [{"name": "", "whatItIs": "", "whyRelevantHere": "", "pitfalls": [""]}],
  "alternatives": [{"name": "", "pros": [""], "cons": [""]}],
  "whyChosen": [""],
  "tradeoffs": [""],
  "rememberThis": [""]
}]}
Emit one entry per input block, in the same order. time, oneLineSummary and
problem must be non-empty."#;

/// Instruction sent when drafting an AI note for a pending change.
pub const AI_NOTE_INSTRUCTION: &str = r#"You summarize an uncommitted code change.
The user message names the file and language and contains a unified diff.

Respond with a single JSON object and nothing else:
{"workType": "feature|bugfix|refactor|chore|docs|test",
 "mainGoal": "the intent of the change in one sentence",
 "changeSummary": "what changed",
 "importantFunctions": ["names of functions touched"],
 "risks": "optional",
 "nextSteps": "optional"}
mainGoal and changeSummary must be non-empty."#;

/// Serialize blocks as the report request payload.
pub fn report_payload(blocks: &[BaseBlock]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(blocks)
}

pub fn ai_note_payload(file: &str, language_id: &str, diff: &str) -> String {
    let diff = if diff.trim().is_empty() {
        "(no pending changes)"
    } else {
        diff
    };
    format!("file: {file}\nlanguage: {language_id}\n\n{diff}")
}
