pub mod engine;
pub mod report;

pub use engine::{http_generator, Engine};
pub use report::{JsonReportSink, Report, ReportError, ReportSink};
