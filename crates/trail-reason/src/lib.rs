pub mod error;
pub mod generator;
pub mod parse;
pub mod prompt;

pub use error::{FailureKind, ReasonError};
pub use generator::{message_content, Generator, HttpGenerator};
pub use parse::{extract_json, parse_ai_note, parse_reasoning};
pub use prompt::{ai_note_payload, report_payload, AI_NOTE_INSTRUCTION, REPORT_INSTRUCTION};
