use std::path::{Path, PathBuf};

/// Name of the per-project state directory.
pub const STATE_DIR: &str = ".trail";

/// All well-known paths under `.trail/`.
#[derive(Debug, Clone)]
pub struct TrailPaths {
    pub root: PathBuf,
    pub trail_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub report_json: PathBuf,
    pub config_json: PathBuf,
}

impl TrailPaths {
    /// Derive all paths from a project root. Pure computation, no I/O.
    pub fn discover(project_root: impl Into<PathBuf>) -> Self {
        let root = project_root.into();
        let trail_dir = root.join(STATE_DIR);
        let reports_dir = trail_dir.join("reports");
        Self {
            logs_dir: trail_dir.join("logs"),
            report_json: reports_dir.join("report.json"),
            config_json: trail_dir.join("config.json"),
            reports_dir,
            trail_dir,
            root,
        }
    }

    /// Create all required directories. Idempotent.
    pub fn ensure_layout(&self) -> anyhow::Result<()> {
        for dir in [&self.logs_dir, &self.reports_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Check whether `.trail/` exists.
    pub fn is_initialized(&self) -> bool {
        self.trail_dir.is_dir()
    }

    /// Walk up from `start` looking for a directory containing `.trail/`.
    pub fn find_root(start: &Path) -> Option<PathBuf> {
        let mut cur = start.to_path_buf();
        loop {
            if cur.join(STATE_DIR).is_dir() {
                return Some(cur);
            }
            if !cur.pop() {
                return None;
            }
        }
    }
}
