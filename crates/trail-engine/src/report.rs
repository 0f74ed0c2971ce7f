use serde::Serialize;
use std::path::{Path, PathBuf};
use trail_core::{BaseBlock, ReasoningBlock};
use trail_ledger::write_atomic;
use trail_reason::{FailureKind, ReasonError};

/// Output of one report invocation, handed to a [`ReportSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "blocks", rename_all = "lowercase")]
pub enum Report {
    /// Aggregated blocks passed through unreasoned. Produced when there was
    /// nothing to send to generation.
    Raw(Vec<BaseBlock>),
    Reasoned(Vec<ReasoningBlock>),
}

impl Report {
    pub fn len(&self) -> usize {
        match self {
            Report::Raw(b) => b.len(),
            Report::Reasoned(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("event log unavailable: {0:#}")]
    Log(anyhow::Error),

    #[error("cannot encode generation payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error(transparent)]
    Generation(#[from] ReasonError),
}

impl ReportError {
    /// Failure class of a generation error. `None` for local failures.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            ReportError::Generation(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Consumer of finished reports (the renderer side).
pub trait ReportSink {
    /// Persist or present `report`. Returns where it ended up.
    fn publish(&self, report: &Report) -> anyhow::Result<PathBuf>;
}

/// Writes the report as pretty JSON, replacing any previous one atomically.
pub struct JsonReportSink {
    path: PathBuf,
}

impl JsonReportSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonReportSink {
    fn publish(&self, report: &Report) -> anyhow::Result<PathBuf> {
        let mut json = serde_json::to_string_pretty(report)?;
        json.push('\n');
        write_atomic(&self.path, json.as_bytes())?;
        tracing::info!(path = %self.path.display(), blocks = report.len(), "report written");
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_writes_tagged_json() {
        let tmp = tempfile::tempdir().unwrap();
        let sink = JsonReportSink::new(tmp.path().join("reports").join("report.json"));
        let report = Report::Reasoned(vec![ReasoningBlock {
            time: "10:00-10:05".into(),
            one_line_summary: "s".into(),
            problem: "p".into(),
            ..Default::default()
        }]);
        let path = sink.publish(&report).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["kind"], "reasoned");
        assert_eq!(value["blocks"][0]["oneLineSummary"], "s");

        sink.publish(&Report::Raw(vec![])).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(sink.path()).unwrap()).unwrap();
        assert_eq!(value["kind"], "raw");
        assert!(value["blocks"].as_array().unwrap().is_empty());
    }

    #[test]
    fn only_generation_errors_carry_a_kind() {
        let err = ReportError::from(ReasonError::EmptyResult);
        assert_eq!(err.kind(), Some(FailureKind::EmptyResult));
        assert_eq!(ReportError::Log(anyhow::anyhow!("disk")).kind(), None);
    }
}
