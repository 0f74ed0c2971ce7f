use crate::cmd_init::{file_key, open_engine};
use crate::cmd_save::{language_for, read_baseline};
use std::path::Path;
use trail_capture::DocumentEvents;
use trail_core::{AiNotePayload, WorkType};

pub fn decision(
    repo_root: &Path,
    note: &str,
    file: Option<&Path>,
    context: Option<&str>,
) -> anyhow::Result<()> {
    let engine = open_engine(repo_root)?;
    let key = file.map(|f| file_key(repo_root, f));
    engine.record_decision(key.as_deref(), note, context)?;
    println!("Wrote decision");
    Ok(())
}

pub fn bugfix(
    repo_root: &Path,
    note: &str,
    file: Option<&Path>,
    context: Option<&str>,
) -> anyhow::Result<()> {
    let engine = open_engine(repo_root)?;
    let key = file.map(|f| file_key(repo_root, f));
    engine.record_bugfix(key.as_deref(), note, context)?;
    println!("Wrote bugfix");
    Ok(())
}

pub struct AiNoteParams<'a> {
    pub file: Option<&'a Path>,
    pub work_type: &'a str,
    pub goal: &'a str,
    pub summary: &'a str,
    pub functions: &'a [String],
    pub risks: Option<&'a str>,
    pub next: Option<&'a str>,
}

pub fn ai_note(repo_root: &Path, params: &AiNoteParams<'_>) -> anyhow::Result<()> {
    if params.goal.trim().is_empty() || params.summary.trim().is_empty() {
        anyhow::bail!("--goal and --summary must not be empty");
    }
    let engine = open_engine(repo_root)?;
    let key = params.file.map(|f| file_key(repo_root, f));
    let payload = AiNotePayload {
        work_type: WorkType::parse(params.work_type),
        main_goal: params.goal.to_string(),
        change_summary: params.summary.to_string(),
        important_functions: params.functions.to_vec(),
        risks: params.risks.map(str::to_string),
        next_steps: params.next.map(str::to_string),
    };
    engine.record_ai_note(key.as_deref(), payload)?;
    println!("Wrote aiNote");
    Ok(())
}

/// `trail ai-note --draft --file F [--baseline B]`
pub fn draft_ai_note(repo_root: &Path, file: &Path, baseline: Option<&Path>) -> anyhow::Result<()> {
    let mut engine = open_engine(repo_root)?;
    let key = file_key(repo_root, file);
    let content = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", file.display()))?;
    if let Some(base) = baseline {
        engine.on_open(&key, &read_baseline(base)?);
    }
    let generator = trail_engine::http_generator(engine.config())?;

    let rt = tokio::runtime::Runtime::new()?;
    let event = rt.block_on(engine.draft_ai_note(&key, language_for(file), &content, &generator))?;
    if let trail_core::EventKind::AiNote(note) = &event.kind {
        println!("Wrote aiNote ({}): {}", note.work_type, note.main_goal);
    }
    Ok(())
}
