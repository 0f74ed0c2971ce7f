//! Derived blocks built during report generation. Transient: owned by a
//! single report invocation and never persisted to the event log.

use crate::types::WorkType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::OffsetDateTime;

/// A time-windowed aggregation of raw events for one file.
/// This is the unit handed to the external generation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseBlock {
    #[serde(with = "time::serde::rfc3339")]
    pub time_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub time_end: OffsetDateTime,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_type: Option<WorkType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_goal: Option<String>,
    pub change_summary: String,
    #[serde(default)]
    pub important_functions: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_steps: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_excerpt: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concept {
    pub name: String,
    pub what_it_is: String,
    pub why_relevant_here: String,
    pub pitfalls: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub name: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// A validated narrative unit recovered from an external free-text response.
///
/// `time`, `one_line_summary` and `problem` are guaranteed non-empty for any
/// block that made it through validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasoningBlock {
    pub time: String,
    pub file: String,
    pub one_line_summary: String,
    pub problem: String,
    pub behavior: Vec<String>,
    pub concepts: Vec<Concept>,
    pub alternatives: Vec<Alternative>,
    pub why_chosen: Vec<String>,
    pub tradeoffs: Vec<String>,
    pub remember_this: Vec<String>,
}
