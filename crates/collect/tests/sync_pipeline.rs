#![cfg(unix)]

mod support;

use std::time::{Duration, Instant};

use chrono::NaiveDate;
use collect::{
    CollectError, DateRange, Invocation, PushOptions, SourceAdapter, SourceTool, SyncClient,
    SyncError, SyncState, payload_digest,
};
use ledger_core::{DateRejection, SubmissionSource};
use support::{RecordingSubmitter, printing_adapter, script, script_adapter};

const PRIMARY: &str = r#"{"daily":[{"date":"2025-06-10","inputTokens":1000,"outputTokens":500,"cacheCreationTokens":0,"cacheReadTokens":0,"totalTokens":1500,"totalCost":10.0,"modelsUsed":["model-a"],"modelBreakdowns":[{"modelName":"model-a","cost":10.0}]}]}"#;
const SECONDARY: &str = r#"{"daily":[{"date":"Jun 10, 2025","inputTokens":2000,"cachedInputTokens":800,"outputTokens":800,"totalTokens":2800,"costUSD":3.0,"models":{"model-b":{}}}]}"#;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 10).expect("date")
}

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("temp dir"),
        }
    }

    fn state_path(&self) -> std::path::PathBuf {
        self.dir.path().join("state/sync-state.json")
    }

    fn client(
        &self,
        primary: SourceAdapter,
        secondary: SourceAdapter,
        submitter: RecordingSubmitter,
    ) -> SyncClient<RecordingSubmitter> {
        SyncClient::new(primary, secondary, submitter, self.state_path(), today())
    }

    fn primary(&self) -> SourceAdapter {
        printing_adapter(self.dir.path(), SourceTool::ClaudeCode, PRIMARY)
    }

    fn secondary(&self) -> SourceAdapter {
        printing_adapter(self.dir.path(), SourceTool::Codex, SECONDARY)
    }

    fn failing(&self, tool: SourceTool) -> SourceAdapter {
        let path = script(
            self.dir.path(),
            &format!("{}-fail.sh", tool.name()),
            "echo 'boom: no session data' >&2\nexit 3",
        );
        script_adapter(tool, &path)
    }
}

#[tokio::test]
async fn dry_run_prints_merged_summary_without_submitting() {
    let fixture = Fixture::new();
    let client = fixture.client(
        fixture.primary(),
        fixture.secondary(),
        RecordingSubmitter::default(),
    );
    let mut out = Vec::new();

    let report = client
        .push(
            PushOptions {
                dry_run: true,
                ..Default::default()
            },
            &mut out,
        )
        .await
        .expect("push");

    assert_eq!(report.entries.len(), 1);
    let day = &report.entries[0];
    assert_eq!(day.cost_usd, 13.0);
    assert_eq!(day.total_tokens, 4300);
    assert_eq!(day.models, vec!["model-a".to_string(), "model-b".to_string()]);
    assert!(report.results.is_none());
    assert_eq!(report.hash, payload_digest(PRIMARY, Some(SECONDARY)));

    let printed = String::from_utf8(out).expect("utf8");
    assert!(printed.contains("2025-06-10  $13.00  4,300 tokens"));
    assert!(printed.contains("model-a, model-b"));
    assert!(!fixture.state_path().exists());
    assert_eq!(client.submitter().calls(), 0);
}

#[tokio::test]
async fn push_submits_verified_batch_and_records_last_date() {
    let fixture = Fixture::new();
    let client = fixture.client(
        fixture.primary(),
        fixture.secondary(),
        RecordingSubmitter::default(),
    );
    let mut out = Vec::new();

    let report = client
        .push(PushOptions::default(), &mut out)
        .await
        .expect("push");

    let results = report.results.expect("results");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].date, "2025-06-10");

    let printed = String::from_utf8(out).expect("utf8");
    assert!(printed.contains("created 2025-06-10 -> https://ledger.test/posts/1"));

    let state = SyncState::load(&fixture.state_path()).expect("state");
    assert_eq!(state.last_pushed_date.as_deref(), Some("2025-06-10"));
}

#[tokio::test]
async fn submitted_batch_carries_hash_and_cli_source() {
    let fixture = Fixture::new();
    let client = fixture.client(
        fixture.primary(),
        fixture.secondary(),
        RecordingSubmitter::default(),
    );
    client
        .push(PushOptions::default(), &mut Vec::new())
        .await
        .expect("push");

    let batches = client.submitter().batches.lock().expect("lock");
    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.source, SubmissionSource::Cli.as_str());
    assert_eq!(
        batch.hash.as_deref(),
        Some(payload_digest(PRIMARY, Some(SECONDARY)).as_str())
    );
    assert_eq!(batch.entries.len(), 1);
    assert_eq!(batch.entries[0].date, "2025-06-10");
    assert_eq!(batch.entries[0].data.cache_read_tokens, 800);
    assert_eq!(batch.entries[0].data.input_tokens, 1000 + 1200);
}

#[tokio::test]
async fn secondary_failure_falls_back_to_primary_only() {
    let fixture = Fixture::new();
    let client = fixture.client(
        fixture.primary(),
        fixture.failing(SourceTool::Codex),
        RecordingSubmitter::default(),
    );

    let collected = client
        .collect(&DateRange::single(today()))
        .await
        .expect("collect");

    assert!(!collected.secondary_ok);
    assert_eq!(collected.entries.len(), 1);
    assert_eq!(collected.entries[0].cost_usd, 10.0);
    assert_eq!(collected.hash, payload_digest(PRIMARY, None));
}

#[tokio::test]
async fn primary_failure_aborts_with_tool_diagnostics() {
    let fixture = Fixture::new();
    let client = fixture.client(
        fixture.failing(SourceTool::ClaudeCode),
        fixture.secondary(),
        RecordingSubmitter::default(),
    );

    let err = client
        .push(PushOptions::default(), &mut Vec::new())
        .await
        .expect_err("primary failure");

    match err {
        SyncError::Primary(CollectError::Exit { stderr, .. }) => {
            assert_eq!(stderr, "boom: no session data");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(client.submitter().calls(), 0);
    assert!(!fixture.state_path().exists());
}

#[tokio::test]
async fn slow_primary_times_out() {
    let fixture = Fixture::new();
    let slow = script(fixture.dir.path(), "slow.sh", "sleep 5");
    let primary = script_adapter(SourceTool::ClaudeCode, &slow)
        .with_timeout(Duration::from_millis(200));
    let client = fixture.client(primary, fixture.secondary(), RecordingSubmitter::default());

    let err = client
        .collect(&DateRange::single(today()))
        .await
        .expect_err("timeout");
    assert!(matches!(err, CollectError::Timeout { .. }));
    assert_eq!(client.submitter().calls(), 0);
}

#[tokio::test]
async fn oversized_output_is_rejected() {
    let fixture = Fixture::new();
    let primary = fixture.primary().with_output_limit(16);
    let client = fixture.client(primary, fixture.secondary(), RecordingSubmitter::default());

    let err = client
        .collect(&DateRange::single(today()))
        .await
        .expect_err("too large");
    assert!(matches!(err, CollectError::OutputTooLarge { limit: 16, .. }));
}

#[tokio::test]
async fn dates_outside_window_are_rejected_before_running_tools() {
    let fixture = Fixture::new();
    let missing = SourceAdapter::new(
        SourceTool::ClaudeCode,
        Invocation::direct("/nonexistent/ccusage"),
    );
    let client = fixture.client(missing, fixture.secondary(), RecordingSubmitter::default());

    let future = client
        .push(
            PushOptions {
                date: NaiveDate::from_ymd_opt(2025, 6, 11),
                ..Default::default()
            },
            &mut Vec::new(),
        )
        .await
        .expect_err("future");
    assert!(matches!(future, SyncError::Date(DateRejection::Future { .. })));

    let stale = client
        .push(
            PushOptions {
                date: NaiveDate::from_ymd_opt(2025, 6, 2),
                ..Default::default()
            },
            &mut Vec::new(),
        )
        .await
        .expect_err("stale");
    assert!(matches!(stale, SyncError::Date(DateRejection::TooOld { .. })));
}

#[tokio::test]
async fn rejected_submission_is_reported_and_state_untouched() {
    let fixture = Fixture::new();
    let submitter = RecordingSubmitter {
        reject_with: Some((400, "date 2025-06-10 is invalid".to_string())),
        ..Default::default()
    };
    let client = fixture.client(fixture.primary(), fixture.secondary(), submitter);

    let err = client
        .push(PushOptions::default(), &mut Vec::new())
        .await
        .expect_err("rejected");
    assert!(err.to_string().contains("date 2025-06-10 is invalid"));
    assert!(!fixture.state_path().exists());
}

#[tokio::test]
async fn entries_outside_the_requested_range_are_dropped() {
    let fixture = Fixture::new();
    let payload = r#"[
      {"date":"2025-05-01","totalCost":1.0,"modelsUsed":["old"]},
      {"date":"2025-06-09","totalCost":2.0,"modelsUsed":["a"]},
      {"date":"2025-06-10","totalCost":3.0,"modelsUsed":["a"]}
    ]"#;
    let primary = printing_adapter(fixture.dir.path(), SourceTool::ClaudeCode, payload);
    let client = fixture.client(
        primary,
        fixture.failing(SourceTool::Codex),
        RecordingSubmitter::default(),
    );

    let report = client
        .push(
            PushOptions {
                days: Some(2),
                dry_run: true,
                ..Default::default()
            },
            &mut Vec::new(),
        )
        .await
        .expect("push");
    let dates: Vec<&str> = report.entries.iter().map(|day| day.date.as_str()).collect();
    assert_eq!(dates, vec!["2025-06-09", "2025-06-10"]);
}

#[tokio::test]
async fn unwritable_state_path_still_reports_results() {
    let fixture = Fixture::new();
    let blocker = fixture.dir.path().join("blocker");
    std::fs::write(&blocker, "not a directory").expect("write blocker");
    let client = SyncClient::new(
        fixture.primary(),
        fixture.secondary(),
        RecordingSubmitter::default(),
        blocker.join("sync-state.json"),
        today(),
    );
    let mut out = Vec::new();

    let report = client
        .push(PushOptions::default(), &mut out)
        .await
        .expect("push succeeds despite the state failure");

    assert_eq!(report.results.expect("results").len(), 1);
    let printed = String::from_utf8(out).expect("utf8");
    assert!(printed.contains("created 2025-06-10 -> https://ledger.test/posts/1"));
    assert_eq!(client.submitter().calls(), 1);
}

#[tokio::test]
async fn reporters_run_concurrently() {
    let fixture = Fixture::new();
    let primary = script(fixture.dir.path(), "slow-primary.sh", "sleep 1\necho '[]'");
    let secondary = script(fixture.dir.path(), "slow-secondary.sh", "sleep 1\necho '[]'");
    let client = fixture.client(
        script_adapter(SourceTool::ClaudeCode, &primary),
        script_adapter(SourceTool::Codex, &secondary),
        RecordingSubmitter::default(),
    );

    let started = Instant::now();
    let collected = client
        .collect(&DateRange::single(today()))
        .await
        .expect("collect");
    let elapsed = started.elapsed();

    assert!(collected.entries.is_empty());
    assert!(collected.secondary_ok);
    assert!(
        elapsed < Duration::from_millis(1800),
        "reporters ran back to back: {elapsed:?}"
    );
}

#[tokio::test]
async fn primary_failure_does_not_wait_for_secondary() {
    let fixture = Fixture::new();
    let primary = script(
        fixture.dir.path(),
        "fast-fail.sh",
        "echo 'fatal' >&2\nexit 2",
    );
    let secondary = script(fixture.dir.path(), "very-slow.sh", "sleep 3\necho '[]'");
    let client = fixture.client(
        script_adapter(SourceTool::ClaudeCode, &primary),
        script_adapter(SourceTool::Codex, &secondary),
        RecordingSubmitter::default(),
    );

    let started = Instant::now();
    let err = client
        .collect(&DateRange::single(today()))
        .await
        .expect_err("primary failure");
    let elapsed = started.elapsed();

    match err {
        CollectError::Exit { stderr, .. } => assert_eq!(stderr, "fatal"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(
        elapsed < Duration::from_secs(2),
        "waited on the secondary: {elapsed:?}"
    );
}
