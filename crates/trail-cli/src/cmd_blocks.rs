use crate::cmd_init::open_engine;
use std::path::Path;
use trail_core::event::format_rfc3339;
use trail_core::BaseBlock;

pub fn execute(repo_root: &Path, json: bool) -> anyhow::Result<()> {
    let engine = open_engine(repo_root)?;
    let blocks = engine.snapshot()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&blocks)?);
        return Ok(());
    }
    if blocks.is_empty() {
        println!("No activity to aggregate.");
        return Ok(());
    }
    for b in &blocks {
        print_block(b);
    }
    println!("({} blocks)", blocks.len());
    Ok(())
}

fn print_block(b: &BaseBlock) {
    let work_type = b.work_type.map(|w| w.as_str()).unwrap_or("-");
    println!(
        "{} .. {}  {}  [{}] {}",
        format_rfc3339(b.time_start),
        format_rfc3339(b.time_end),
        b.file,
        work_type,
        b.main_goal.as_deref().unwrap_or("-")
    );
    println!("  {}", b.change_summary);
    if !b.important_functions.is_empty() {
        let names: Vec<&str> = b.important_functions.iter().map(String::as_str).collect();
        println!("  functions: {}", names.join(", "));
    }
    if let Some(r) = &b.risks {
        println!("  risks: {r}");
    }
    if let Some(n) = &b.next_steps {
        println!("  next: {n}");
    }
    println!();
}
