use std::path::{Path, PathBuf};
use trail_engine::Engine;
use trail_ledger::config::init_config;
use trail_ledger::TrailPaths;

pub fn execute(repo_root: &Path) -> anyhow::Result<()> {
    let paths = TrailPaths::discover(repo_root);
    if paths.is_initialized() {
        paths.ensure_layout()?;
        println!("Already initialized at {}", paths.trail_dir.display());
        return Ok(());
    }

    paths.ensure_layout()?;
    init_config(&paths)?;
    println!("Initialized trail workspace at {}", paths.trail_dir.display());
    Ok(())
}

/// Open the engine for an initialized workspace.
pub fn open_engine(repo_root: &Path) -> anyhow::Result<Engine> {
    let paths = TrailPaths::discover(repo_root);
    if !paths.is_initialized() {
        anyhow::bail!("No .trail/ workspace found. Run `trail init` first.");
    }
    Engine::open(repo_root)
}

/// Key a file is recorded under: relative to the workspace root when it
/// lies inside it, otherwise its absolute path. Relative paths resolve
/// against the current directory. Separators are normalized to `/`.
pub fn file_key(repo_root: &Path, file: &Path) -> String {
    match std::env::current_dir() {
        Ok(cwd) => key_from(repo_root, &cwd, file),
        Err(_) => file.to_string_lossy().replace('\\', "/"),
    }
}

fn key_from(repo_root: &Path, cwd: &Path, file: &Path) -> String {
    let abs = normalize(&cwd.join(file));
    let root = normalize(repo_root);
    let key = abs.strip_prefix(&root).unwrap_or(&abs);
    key.to_string_lossy().replace('\\', "/")
}

/// Canonicalize the longest existing ancestor and re-append the rest, so
/// files that do not exist yet still resolve `..` and symlinks above them.
fn normalize(path: &Path) -> PathBuf {
    if let Ok(real) = path.canonicalize() {
        return real;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
            normalize(parent).join(name)
        }
        _ => path.to_path_buf(),
    }
}
