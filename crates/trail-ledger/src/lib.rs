pub mod atomic;
pub mod config;
pub mod log;
pub mod paths;
pub mod shard;

pub use atomic::write_atomic;
pub use config::TrailConfig;
pub use log::{EventLog, ReadOutcome};
pub use paths::TrailPaths;
pub use shard::{ShardName, ROTATE_BYTES};
