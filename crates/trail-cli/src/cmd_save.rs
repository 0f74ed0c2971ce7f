use crate::cmd_init::{file_key, open_engine};
use std::path::Path;
use trail_capture::DocumentEvents;
use trail_core::EventKind;

pub fn execute(
    repo_root: &Path,
    file: &Path,
    language: Option<&str>,
    baseline: Option<&Path>,
) -> anyhow::Result<()> {
    let mut engine = open_engine(repo_root)?;
    let key = file_key(repo_root, file);
    let content = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("cannot read {}: {e}", file.display()))?;
    if let Some(base) = baseline {
        engine.on_open(&key, &read_baseline(base)?);
    }

    let language = language.map(str::to_string).unwrap_or_else(|| language_for(file).to_string());
    let event = engine.on_save(&key, &language, &content)?;
    if let EventKind::FileSave {
        added_lines,
        removed_lines,
        ..
    } = event.kind
    {
        println!("Wrote fileSave {key} (+{added_lines}/-{removed_lines})");
    }
    Ok(())
}

pub fn read_baseline(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("cannot read baseline {}: {e}", path.display()))
}

/// Language id for a file, from its extension.
pub fn language_for(file: &Path) -> &'static str {
    let ext = file
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "rs" => "rust",
        "ts" | "tsx" => "typescript",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "py" => "python",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "sh" | "bash" => "shellscript",
        "md" => "markdown",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "html" => "html",
        "css" => "css",
        _ => "plaintext",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_is_inferred_from_extension() {
        assert_eq!(language_for(Path::new("src/main.rs")), "rust");
        assert_eq!(language_for(Path::new("App.TSX")), "typescript");
        assert_eq!(language_for(Path::new("README")), "plaintext");
    }

    #[test]
    fn save_with_baseline_records_only_the_delta() {
        let tmp = tempfile::tempdir().unwrap();
        crate::cmd_init::execute(tmp.path()).unwrap();
        let old = tmp.path().join("old.rs");
        let new = tmp.path().join("a.rs");
        std::fs::write(&old, "fn a() {}\n").unwrap();
        std::fs::write(&new, "fn a() {}\nfn b() {}\n").unwrap();

        execute(tmp.path(), &new, None, Some(&old)).unwrap();

        let events = open_engine(tmp.path()).unwrap().read_events().unwrap().events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].file_path.as_deref(), Some("a.rs"));
        match &events[0].kind {
            EventKind::FileSave {
                added_lines,
                removed_lines,
                language_id,
            } => {
                assert_eq!((*added_lines, *removed_lines), (1, 0));
                assert_eq!(language_id, "rust");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
