//! One engine instance per workspace.
//!
//! The engine owns the change detector's content cache and the event log for
//! a single `.trail/` directory. Separate instances never share state, so
//! several workspaces (or tests) can run side by side in one process.

use crate::report::{Report, ReportError};
use std::sync::Arc;
use std::time::Duration;
use trail_aggregate::{aggregate, sort_events, AggregateOptions};
use trail_capture::{BranchResolver, ChangeDetector, DocumentEvents, GitBranch};
use trail_core::event::{new_ai_note_event, new_bugfix_event, new_decision_event};
use trail_core::{AiNotePayload, BaseBlock, RawEvent};
use trail_ledger::{EventLog, ReadOutcome, TrailConfig, TrailPaths};
use trail_reason::{
    ai_note_payload, parse_ai_note, parse_reasoning, report_payload, Generator, HttpGenerator,
    ReasonError, AI_NOTE_INSTRUCTION, REPORT_INSTRUCTION,
};

pub struct Engine {
    paths: TrailPaths,
    config: TrailConfig,
    detector: ChangeDetector,
    log: EventLog,
    branch: Arc<dyn BranchResolver>,
}

impl Engine {
    /// Open the workspace rooted at `root`, creating `.trail/` if needed.
    pub fn open(root: impl Into<std::path::PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        let paths = TrailPaths::discover(&root);
        paths.ensure_layout()?;
        let config = TrailConfig::load(&paths);
        Ok(Self::with_parts(paths, config, Arc::new(GitBranch::new(root))))
    }

    pub fn with_parts(
        paths: TrailPaths,
        config: TrailConfig,
        branch: Arc<dyn BranchResolver>,
    ) -> Self {
        let detector = ChangeDetector::new(config.cache_capacity, branch.clone());
        let log = EventLog::open(&paths, &config);
        Self {
            paths,
            config,
            detector,
            log,
            branch,
        }
    }

    pub fn paths(&self) -> &TrailPaths {
        &self.paths
    }

    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    pub fn record_decision(
        &self,
        file: Option<&str>,
        note: &str,
        line_context: Option<&str>,
    ) -> anyhow::Result<RawEvent> {
        let branch = self.branch.branch_or_unknown();
        self.append(new_decision_event(file, Some(&branch), note, line_context))
    }

    pub fn record_bugfix(
        &self,
        file: Option<&str>,
        note: &str,
        line_context: Option<&str>,
    ) -> anyhow::Result<RawEvent> {
        let branch = self.branch.branch_or_unknown();
        self.append(new_bugfix_event(file, Some(&branch), note, line_context))
    }

    pub fn record_ai_note(
        &self,
        file: Option<&str>,
        payload: AiNotePayload,
    ) -> anyhow::Result<RawEvent> {
        let branch = self.branch.branch_or_unknown();
        self.append(new_ai_note_event(file, Some(&branch), payload))
    }

    fn append(&self, event: RawEvent) -> anyhow::Result<RawEvent> {
        self.log.append(&event)?;
        Ok(event)
    }

    /// Every readable event, in shard order. Corrupt lines are skipped and counted.
    pub fn read_events(&self) -> anyhow::Result<ReadOutcome> {
        self.log.read_all()
    }

    /// Read, sort and aggregate the whole log into blocks.
    pub fn snapshot(&self) -> anyhow::Result<Vec<BaseBlock>> {
        let mut events = self.read_events()?.events;
        sort_events(&mut events);
        let opts = AggregateOptions {
            merge_window: self.config.merge_window(),
            excerpt_max_lines: self.config.excerpt_max_lines,
        };
        Ok(aggregate(&events, &opts))
    }

    /// Aggregate the log and ask `generator` to reason about the blocks.
    ///
    /// The snapshot is taken before the generation call; events appended
    /// while it is in flight belong to the next report. An empty log yields
    /// `Report::Raw` without calling the generator.
    pub async fn generate_report(&self, generator: &dyn Generator) -> Result<Report, ReportError> {
        let blocks = self.snapshot().map_err(ReportError::Log)?;
        if blocks.is_empty() {
            tracing::info!("no activity to report, skipping generation");
            return Ok(Report::Raw(blocks));
        }

        let payload = report_payload(&blocks)?;
        tracing::info!(blocks = blocks.len(), "generating report");
        let text = generator.generate(REPORT_INSTRUCTION, &payload).await?;
        let reasoned = parse_reasoning(&text)?;
        Ok(Report::Reasoned(reasoned))
    }

    /// Draft an AI note for the pending change to `file` and append it.
    ///
    /// The change is the diff of `content` against the detector's baseline.
    /// The baseline itself is left untouched.
    pub async fn draft_ai_note(
        &self,
        file: &str,
        language_id: &str,
        content: &str,
        generator: &dyn Generator,
    ) -> Result<RawEvent, ReportError> {
        let diff = self.detector.unified_diff(file, content);
        let payload = ai_note_payload(file, language_id, &diff);
        let text = generator.generate(AI_NOTE_INSTRUCTION, &payload).await?;
        let note = parse_ai_note(&text)?;
        self.record_ai_note(Some(file), note)
            .map_err(ReportError::Log)
    }
}

impl DocumentEvents for Engine {
    type Error = anyhow::Error;

    fn on_open(&mut self, file: &str, content: &str) {
        self.detector.prime(file, content);
    }

    /// Capture the save and append it. A failed append still advances the
    /// baseline, so the next save reports only its own delta.
    fn on_save(
        &mut self,
        file: &str,
        language_id: &str,
        content: &str,
    ) -> anyhow::Result<RawEvent> {
        let event = self.detector.capture(file, language_id, content);
        self.append(event)
    }

    fn on_close(&mut self, file: &str) {
        self.detector.forget(file);
    }
}

/// Build the HTTP generator described by `config`. The API key is read from
/// the environment variable the config names; a missing key sends no
/// authorization header.
pub fn http_generator(config: &TrailConfig) -> Result<HttpGenerator, ReasonError> {
    let api_key = std::env::var(&config.generation_api_key_env).ok();
    if api_key.is_none() {
        tracing::debug!(var = %config.generation_api_key_env, "no API key in environment");
    }
    HttpGenerator::new(
        &config.generation_endpoint,
        &config.generation_model,
        api_key,
        Duration::from_secs(config.generation_timeout_secs),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use trail_capture::FixedBranch;
    use trail_core::{EventKind, WorkType};
    use trail_reason::FailureKind;

    /// In-memory generator returning a canned reply and recording requests.
    struct Canned {
        reply: Result<String, u16>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl Canned {
        fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn status(code: u16) -> Self {
            Self {
                reply: Err(code),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Generator for Canned {
        async fn generate(&self, instruction: &str, payload: &str) -> Result<String, ReasonError> {
            self.calls
                .lock()
                .unwrap()
                .push((instruction.to_string(), payload.to_string()));
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(ReasonError::Transport {
                    status: *status,
                    body: "upstream said no".into(),
                }),
            }
        }
    }

    fn setup() -> (tempfile::TempDir, Engine) {
        let tmp = tempfile::tempdir().unwrap();
        let paths = TrailPaths::discover(tmp.path());
        paths.ensure_layout().unwrap();
        let engine = Engine::with_parts(
            paths,
            TrailConfig::default(),
            Arc::new(FixedBranch::named("main")),
        );
        (tmp, engine)
    }

    const ONE_BLOCK: &str =
        r#"{"blocks":[{"time":"10:00","file":"src/a.rs","oneLineSummary":"s","problem":"p"}]}"#;

    #[test]
    fn open_creates_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = Engine::open(tmp.path()).unwrap();
        assert!(engine.paths().is_initialized());
        assert!(engine.paths().logs_dir.is_dir());
        assert_eq!(engine.config().merge_window_minutes, 30);
    }

    #[test]
    fn save_after_open_records_delta_against_primed_content() {
        let (_tmp, mut engine) = setup();
        engine.on_open("src/a.rs", "fn a() {}\n");
        let event = engine
            .on_save("src/a.rs", "rust", "fn a() {}\nfn b() {}\n")
            .unwrap();
        match event.kind {
            EventKind::FileSave {
                added_lines,
                removed_lines,
                ..
            } => assert_eq!((added_lines, removed_lines), (1, 0)),
            other => panic!("unexpected event: {other:?}"),
        }
        assert_eq!(event.branch.as_deref(), Some("main"));
        assert_eq!(engine.read_events().unwrap().events, vec![event]);
    }

    #[test]
    fn close_drops_baseline() {
        let (_tmp, mut engine) = setup();
        engine.on_open("a.txt", "one\n");
        engine.on_close("a.txt");
        let event = engine.on_save("a.txt", "plaintext", "one\n").unwrap();
        assert!(matches!(
            event.kind,
            EventKind::FileSave { added_lines: 1, .. }
        ));
    }

    #[test]
    fn snapshot_folds_save_and_decision_on_same_file() {
        let (_tmp, mut engine) = setup();
        engine.on_save("src/a.rs", "rust", "x\n").unwrap();
        engine
            .record_decision(Some("src/a.rs"), "chose X", Some("let x = 1;"))
            .unwrap();
        engine.record_bugfix(None, "fixed flaky test", None).unwrap();

        let blocks = engine.snapshot().unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].file, "src/a.rs");
        assert!(blocks[0].change_summary.contains("decision: chose X"));
        assert_eq!(blocks[0].code_excerpt.as_deref(), Some("let x = 1;"));
        assert_eq!(blocks[1].file, trail_core::NO_FILE);
        assert_eq!(blocks[1].work_type, Some(WorkType::Bugfix));
    }

    #[test]
    fn snapshot_survives_corrupt_lines() {
        let (_tmp, engine) = setup();
        engine.record_decision(Some("a"), "keep", None).unwrap();
        let shard = std::fs::read_dir(&engine.paths().logs_dir)
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        let mut content = std::fs::read_to_string(&shard).unwrap();
        content.push_str("{not json\n");
        std::fs::write(&shard, content).unwrap();

        let outcome = engine.read_events().unwrap();
        assert_eq!(outcome.events.len(), 1);
        assert_eq!(outcome.skipped, 1);
        assert_eq!(engine.snapshot().unwrap().len(), 1);
    }

    #[test]
    fn huge_merge_window_in_config_does_not_break_snapshot() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = TrailPaths::discover(tmp.path());
        paths.ensure_layout().unwrap();
        std::fs::write(
            &paths.config_json,
            r#"{"merge_window_minutes": 9223372036854775807}"#,
        )
        .unwrap();
        let engine = Engine::open(tmp.path()).unwrap();
        assert_eq!(engine.config().merge_window_minutes, 30);
        engine.record_decision(Some("a"), "keep", None).unwrap();
        assert_eq!(engine.snapshot().unwrap().len(), 1);

        let config = TrailConfig {
            merge_window_minutes: i64::MAX,
            ..TrailConfig::default()
        };
        let engine = Engine::with_parts(paths, config, Arc::new(FixedBranch::named("main")));
        assert_eq!(engine.snapshot().unwrap().len(), 1);
    }

    #[test]
    fn instances_do_not_share_state() {
        let (_a_dir, mut a) = setup();
        let (_b_dir, mut b) = setup();
        a.on_open("f", "1\n2\n");
        let from_b = b.on_save("f", "plaintext", "1\n2\n").unwrap();
        assert!(matches!(
            from_b.kind,
            EventKind::FileSave { added_lines: 2, .. }
        ));
        assert!(a.read_events().unwrap().events.is_empty());
    }

    #[tokio::test]
    async fn empty_log_skips_generation() {
        let (_tmp, engine) = setup();
        let gen = Canned::ok(ONE_BLOCK);
        let report = engine.generate_report(&gen).await.unwrap();
        assert_eq!(report, Report::Raw(vec![]));
        assert!(gen.calls().is_empty());
    }

    #[tokio::test]
    async fn report_sends_blocks_and_parses_reply() {
        let (_tmp, mut engine) = setup();
        engine.on_save("src/a.rs", "rust", "x\n").unwrap();
        let gen = Canned::ok(&format!("Sure! {ONE_BLOCK} Hope this helps."));

        let report = engine.generate_report(&gen).await.unwrap();
        match report {
            Report::Reasoned(blocks) => {
                assert_eq!(blocks.len(), 1);
                assert_eq!(blocks[0].one_line_summary, "s");
            }
            other => panic!("unexpected report: {other:?}"),
        }

        let calls = gen.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, REPORT_INSTRUCTION);
        let sent: Vec<BaseBlock> = serde_json::from_str(&calls[0].1).unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].file, "src/a.rs");
    }

    #[tokio::test]
    async fn report_failures_keep_their_kind() {
        let (_tmp, mut engine) = setup();
        engine.on_save("a", "plaintext", "x\n").unwrap();

        let cases = [
            (Canned::status(503), FailureKind::Transport),
            (Canned::ok("I cannot help with that."), FailureKind::Schema),
            (Canned::ok(r#"{"items":[]}"#), FailureKind::Schema),
            (Canned::ok(r#"{"blocks":[{"time":"x"}]}"#), FailureKind::EmptyResult),
        ];
        for (gen, expected) in cases {
            let err = engine.generate_report(&gen).await.unwrap_err();
            assert_eq!(err.kind(), Some(expected), "{err}");
        }
    }

    #[tokio::test]
    async fn drafted_note_is_appended_and_overrides_goal() {
        let (_tmp, mut engine) = setup();
        engine.on_open("src/a.rs", "fn a() {}\n");
        engine.record_decision(Some("src/a.rs"), "split parser", None).unwrap();

        let gen = Canned::ok(
            r#"{"workType":"refactor","mainGoal":"split parser","changeSummary":"moved helpers","importantFunctions":["parse"]}"#,
        );
        let event = engine
            .draft_ai_note("src/a.rs", "rust", "fn a() {}\nfn parse() {}\n", &gen)
            .await
            .unwrap();
        assert!(matches!(event.kind, EventKind::AiNote(_)));

        let calls = gen.calls();
        assert_eq!(calls[0].0, AI_NOTE_INSTRUCTION);
        assert!(calls[0].1.contains("+fn parse() {}"));

        let blocks = engine.snapshot().unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].main_goal.as_deref(), Some("split parser"));
        assert_eq!(blocks[0].work_type, Some(WorkType::Refactor));
        assert!(blocks[0].important_functions.contains("parse"));
    }

    #[tokio::test]
    async fn failed_draft_appends_nothing() {
        let (_tmp, engine) = setup();
        let gen = Canned::ok(r#"{"workType":"feature"}"#);
        let err = engine
            .draft_ai_note("a", "plaintext", "x\n", &gen)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(FailureKind::EmptyResult));
        assert!(engine.read_events().unwrap().events.is_empty());
    }

    #[test]
    fn generator_follows_config() {
        let config = TrailConfig {
            generation_api_key_env: "TRAIL_TEST_KEY_THAT_IS_NOT_SET".into(),
            ..TrailConfig::default()
        };
        assert!(http_generator(&config).is_ok());
    }
}
