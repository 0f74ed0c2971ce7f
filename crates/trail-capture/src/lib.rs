pub mod branch;
pub mod detector;
pub mod port;

pub use branch::{BranchResolver, FixedBranch, GitBranch};
pub use detector::{line_delta, ChangeDetector, LineDelta};
pub use port::DocumentEvents;
