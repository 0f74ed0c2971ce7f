pub mod block;
pub mod event;
pub mod types;

pub use block::{Alternative, BaseBlock, Concept, ReasoningBlock};
pub use types::*;
