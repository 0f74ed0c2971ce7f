use crate::cmd_init::open_engine;
use std::path::Path;
use trail_aggregate::sort_events;
use trail_core::event::format_rfc3339;
use trail_core::{EventKind, RawEvent};

pub fn execute(repo_root: &Path, json: bool, limit: usize) -> anyhow::Result<()> {
    let engine = open_engine(repo_root)?;
    let outcome = engine.read_events()?;
    let mut events = outcome.events;
    sort_events(&mut events);

    let mut shown: Vec<&RawEvent> = events.iter().rev().collect();
    if limit > 0 {
        shown.truncate(limit);
    }

    if shown.is_empty() {
        println!("No events recorded.");
    } else if json {
        for e in &shown {
            println!("{}", serde_json::to_string(e)?);
        }
    } else {
        for e in &shown {
            println!("{}", event_line(e));
        }
        println!("\n({} of {} events shown)", shown.len(), events.len());
    }
    if outcome.skipped > 0 {
        eprintln!("warning: skipped {} unreadable line(s)", outcome.skipped);
    }
    Ok(())
}

fn event_line(e: &RawEvent) -> String {
    let detail = match &e.kind {
        EventKind::FileSave {
            added_lines,
            removed_lines,
            language_id,
        } => format!("+{added_lines}/-{removed_lines} {language_id}"),
        EventKind::Decision { note, .. } | EventKind::Bugfix { note, .. } => note.clone(),
        EventKind::AiNote(n) => format!("[{}] {}", n.work_type, n.main_goal),
    };
    format!(
        "{}  {:<9} {:<24} {}",
        format_rfc3339(e.timestamp),
        e.kind.name(),
        e.file_key(),
        detail
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use trail_core::event::new_decision_event;

    #[test]
    fn line_shows_kind_file_and_note() {
        let e = new_decision_event(None, Some("main"), "chose X", None);
        let line = event_line(&e);
        assert!(line.contains("decision"));
        assert!(line.contains(trail_core::NO_FILE));
        assert!(line.ends_with("chose X"));
    }
}
