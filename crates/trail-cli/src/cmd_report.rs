use crate::cmd_init::open_engine;
use std::path::Path;
use trail_engine::{JsonReportSink, Report, ReportSink};

/// `trail report`: aggregate, reason, and write `.trail/reports/report.json`.
pub fn execute(repo_root: &Path) -> anyhow::Result<()> {
    let engine = open_engine(repo_root)?;
    let generator = trail_engine::http_generator(engine.config())?;

    let rt = tokio::runtime::Runtime::new()?;
    let report = match rt.block_on(engine.generate_report(&generator)) {
        Ok(r) => r,
        Err(e) => match e.kind() {
            Some(kind) => anyhow::bail!("report failed ({kind:?}): {e}"),
            None => return Err(e.into()),
        },
    };

    let sink = JsonReportSink::new(&engine.paths().report_json);
    let path = sink.publish(&report)?;
    match &report {
        Report::Raw(_) => println!(
            "No activity recorded; wrote empty report to {}",
            path.display()
        ),
        Report::Reasoned(blocks) => {
            println!("Wrote {} reasoned blocks to {}", blocks.len(), path.display())
        }
    }
    Ok(())
}
