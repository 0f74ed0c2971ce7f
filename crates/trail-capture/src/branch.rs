use std::path::PathBuf;
use std::process::Command;

/// Source of the current VCS branch name.
/// Implementations must never fail loudly: `None` means "unknown".
pub trait BranchResolver: Send + Sync {
    fn current_branch(&self) -> Option<String>;

    /// Resolved branch, or `trail_core::UNKNOWN_BRANCH`.
    fn branch_or_unknown(&self) -> String {
        self.current_branch()
            .unwrap_or_else(|| trail_core::UNKNOWN_BRANCH.to_string())
    }
}

/// Reads the branch via `git rev-parse --abbrev-ref HEAD` in the project root.
#[derive(Debug, Clone)]
pub struct GitBranch {
    root: PathBuf,
}

impl GitBranch {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl BranchResolver for GitBranch {
    fn current_branch(&self) -> Option<String> {
        let output = match Command::new("git")
            .args(["rev-parse", "--abbrev-ref", "HEAD"])
            .current_dir(&self.root)
            .output()
        {
            Ok(o) => o,
            Err(e) => {
                tracing::debug!(error = %e, "git unavailable, branch unknown");
                return None;
            }
        };
        if !output.status.success() {
            tracing::debug!(root = %self.root.display(), "not a git repository, branch unknown");
            return None;
        }
        String::from_utf8(output.stdout)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
}

/// A resolver that always answers with the same value. Used by hosts that
/// already know the branch, and in tests.
#[derive(Debug, Clone, Default)]
pub struct FixedBranch(pub Option<String>);

impl FixedBranch {
    pub fn named(name: &str) -> Self {
        Self(Some(name.to_string()))
    }
}

impl BranchResolver for FixedBranch {
    fn current_branch(&self) -> Option<String> {
        self.0.clone()
    }
}
