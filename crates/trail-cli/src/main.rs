mod cmd_blocks;
mod cmd_config;
mod cmd_init;
mod cmd_log;
mod cmd_note;
mod cmd_report;
mod cmd_save;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trail", version, about = "Developer activity trail")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize a new .trail/ workspace
    Init,
    /// Record a file save, diffed against a baseline
    Save {
        /// File that was saved
        file: PathBuf,
        /// Language id (inferred from the extension if omitted)
        #[arg(long)]
        language: Option<String>,
        /// Previous content of the file; without it the whole file counts as added
        #[arg(long)]
        baseline: Option<PathBuf>,
    },
    /// Record a design decision
    Decision {
        /// Decision text
        note: String,
        /// File the decision applies to
        #[arg(long)]
        file: Option<PathBuf>,
        /// Code the decision refers to
        #[arg(long)]
        context: Option<String>,
    },
    /// Record a bugfix note
    Bugfix {
        /// What was fixed
        note: String,
        /// File the fix applies to
        #[arg(long)]
        file: Option<PathBuf>,
        /// Code the fix refers to
        #[arg(long)]
        context: Option<String>,
    },
    /// Record an AI note, written by hand or drafted by the generation service
    AiNote {
        /// File the note describes (required with --draft)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Draft the note from the pending diff of --file
        #[arg(long)]
        draft: bool,
        /// Previous content of --file, used as the diff baseline for --draft
        #[arg(long, requires = "draft")]
        baseline: Option<PathBuf>,
        /// Work type: feature, bugfix, refactor, chore, docs, test
        #[arg(long = "type", default_value = "feature")]
        work_type: String,
        /// Intent of the change
        #[arg(long, required_unless_present = "draft")]
        goal: Option<String>,
        /// What changed
        #[arg(long, required_unless_present = "draft")]
        summary: Option<String>,
        /// Important functions (repeatable)
        #[arg(long = "function")]
        functions: Vec<String>,
        #[arg(long)]
        risks: Option<String>,
        #[arg(long)]
        next: Option<String>,
    },
    /// Show raw events from the log
    Log {
        /// Output as JSON lines
        #[arg(long)]
        json: bool,
        /// Maximum number of events to show, newest first (0 = unlimited)
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Show aggregated blocks
    Blocks {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Aggregate the log, reason about it, and write .trail/reports/report.json
    Report,
    /// Read or write workspace config (.trail/config.json)
    Config {
        #[command(subcommand)]
        cmd: cmd_config::ConfigCmd,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("TRAIL_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let repo_root = trail_ledger::TrailPaths::find_root(&cwd).unwrap_or_else(|| cwd.clone());

    match cli.cmd {
        Command::Init => cmd_init::execute(&cwd),
        Command::Save {
            file,
            language,
            baseline,
        } => cmd_save::execute(&repo_root, &file, language.as_deref(), baseline.as_deref()),
        Command::Decision {
            note,
            file,
            context,
        } => cmd_note::decision(&repo_root, &note, file.as_deref(), context.as_deref()),
        Command::Bugfix {
            note,
            file,
            context,
        } => cmd_note::bugfix(&repo_root, &note, file.as_deref(), context.as_deref()),
        Command::AiNote {
            file,
            draft,
            baseline,
            work_type,
            goal,
            summary,
            functions,
            risks,
            next,
        } => {
            if draft {
                let file = file.ok_or_else(|| anyhow::anyhow!("--draft needs --file"))?;
                cmd_note::draft_ai_note(&repo_root, &file, baseline.as_deref())
            } else {
                cmd_note::ai_note(
                    &repo_root,
                    &cmd_note::AiNoteParams {
                        file: file.as_deref(),
                        work_type: &work_type,
                        goal: goal.as_deref().unwrap_or_default(),
                        summary: summary.as_deref().unwrap_or_default(),
                        functions: &functions,
                        risks: risks.as_deref(),
                        next: next.as_deref(),
                    },
                )
            }
        }
        Command::Log { json, limit } => cmd_log::execute(&repo_root, json, limit),
        Command::Blocks { json } => cmd_blocks::execute(&repo_root, json),
        Command::Report => cmd_report::execute(&repo_root),
        Command::Config { cmd } => cmd_config::run(cmd, &repo_root),
    }
}
