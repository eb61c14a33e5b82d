//! Integration tests for the crawl-run pipeline.
//!
//! Drives runs end to end through `start_run` with mock sources:
//! - per-source failures are isolated and logged
//! - duplicates across sources collapse
//! - progress accounting and terminal states
//! - late observers and ranking fallback

mod common;

use std::time::Duration;

use crate::common::*;
use radar_core::domains::jobs::RawJob;
use radar_core::domains::ranking::RankingError;
use radar_core::domains::runs::{
    start_run, LogLevel, RunEventKind, RunStatus, StartRunRequest, StreamMessage,
};
use radar_core::domains::sources::SourceError;
use radar_core::kernel::test_dependencies::ml_record;
use radar_core::kernel::{MockJobSource, MockRankingService, TestDependencies};

// =============================================================================
// Aggregation
// =============================================================================

#[tokio::test]
async fn same_title_and_company_across_sources_is_one_job() {
    init_tracing();
    let deps = TestDependencies::new()
        .source(MockJobSource::with_records(
            "board-a",
            vec![ml_record("a1", "Senior ML Engineer", "Acme")],
        ))
        .source(MockJobSource::with_records(
            "board-b",
            vec![ml_record("b1", "  senior ml   engineer ", "ACME")],
        ))
        .into_server_deps();

    let run = start_run(&deps, StartRunRequest::standard()).await.unwrap();
    let snapshot = wait_for_terminal(&run).await;

    assert_eq!(snapshot.status, RunStatus::Completed);
    assert_eq!(snapshot.jobs.len(), 1);
    assert_eq!(snapshot.jobs[0].source, "board-a");
}

#[tokio::test]
async fn failing_source_does_not_fail_the_run() {
    init_tracing();
    let deps = TestDependencies::new()
        .source(MockJobSource::with_records("good", ml_records("good", 3)))
        .source(MockJobSource::failing("flaky", SourceError::Status(503)))
        .into_server_deps();

    let run = start_run(&deps, StartRunRequest::standard()).await.unwrap();
    let snapshot = wait_for_terminal(&run).await;

    assert_eq!(snapshot.status, RunStatus::Completed);
    assert_eq!(snapshot.progress, 100);
    assert_eq!(snapshot.jobs.len(), 3);

    let warnings = log_messages(&snapshot, LogLevel::Warn);
    assert_eq!(warnings.len(), 1, "warnings: {:?}", warnings);
    assert!(warnings[0].contains("flaky"));
    assert!(warnings[0].contains("503"));

    let fetched: Vec<String> = log_messages(&snapshot, LogLevel::Info)
        .into_iter()
        .filter(|m| m.starts_with("Fetched"))
        .collect();
    assert_eq!(fetched, vec!["Fetched 3 jobs from good".to_string()]);
}

#[tokio::test]
async fn non_ml_postings_are_filtered_out() {
    let mut records = ml_records("mixed", 2);
    records.push(non_ml_record("office-1"));
    let deps = TestDependencies::new()
        .source(MockJobSource::with_records("mixed", records))
        .into_server_deps();

    let run = start_run(&deps, StartRunRequest::standard()).await.unwrap();
    let snapshot = wait_for_terminal(&run).await;

    assert_eq!(snapshot.jobs.len(), 2);
    assert!(snapshot.jobs.iter().all(|j| j.title != "Office Manager"));
}

#[tokio::test]
async fn results_fold_in_source_order_not_completion_order() {
    let deps = TestDependencies::new()
        .source(
            MockJobSource::with_records("slow", vec![ml_record("s1", "ML Researcher", "Slow Inc")])
                .delayed(Duration::from_millis(200)),
        )
        .source(MockJobSource::with_records(
            "fast",
            vec![ml_record("f1", "Data Scientist", "Fast Ltd")],
        ))
        .into_server_deps();

    let run = start_run(&deps, StartRunRequest::standard()).await.unwrap();
    let snapshot = wait_for_terminal(&run).await;

    let sources: Vec<&str> = snapshot.jobs.iter().map(|j| j.source.as_str()).collect();
    assert_eq!(sources, vec!["slow", "fast"]);

    let fetched: Vec<String> = log_messages(&snapshot, LogLevel::Info)
        .into_iter()
        .filter(|m| m.starts_with("Fetched"))
        .collect();
    assert_eq!(
        fetched,
        vec!["Fetched 1 jobs from slow", "Fetched 1 jobs from fast"]
    );
}

#[tokio::test]
async fn slow_source_times_out_and_is_skipped() {
    let deps = TestDependencies::new()
        .configure(|config| config.source_timeout = Duration::from_millis(50))
        .source(
            MockJobSource::with_records("sluggish", ml_records("sluggish", 2))
                .delayed(Duration::from_secs(5)),
        )
        .source(MockJobSource::with_records("quick", ml_records("quick", 1)))
        .into_server_deps();

    let run = start_run(&deps, StartRunRequest::standard()).await.unwrap();
    let snapshot = wait_for_terminal(&run).await;

    assert_eq!(snapshot.status, RunStatus::Completed);
    assert_eq!(snapshot.jobs.len(), 1);
    let warnings = log_messages(&snapshot, LogLevel::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("timed out"));
}

// =============================================================================
// Progress and terminal states
// =============================================================================

#[tokio::test]
async fn progress_is_monotonic_and_ends_at_100() {
    let deps = TestDependencies::new()
        .source(MockJobSource::with_records("a", ml_records("a", 2)))
        .source(MockJobSource::failing("b", SourceError::Network("refused".into())))
        .source(MockJobSource::with_records("c", ml_records("c", 1)))
        .into_server_deps();

    let run = start_run(&deps, StartRunRequest::standard()).await.unwrap();
    let snapshot = wait_for_terminal(&run).await;

    assert_progress_monotonic(&snapshot.logs);
    let last = snapshot.logs.last().unwrap();
    assert_eq!(last.progress, 100);
    assert_eq!(last.kind, RunEventKind::Done { job_count: 3 });

    let seqs: Vec<u64> = snapshot.logs.iter().map(|e| e.seq).collect();
    let expected: Vec<u64> = (1..=snapshot.last_seq).collect();
    assert_eq!(seqs, expected);
}

#[tokio::test]
async fn zero_sources_fails_the_run() {
    let deps = TestDependencies::new().into_server_deps();

    let run = start_run(&deps, StartRunRequest::standard()).await.unwrap();
    let snapshot = wait_for_terminal(&run).await;

    assert_eq!(snapshot.status, RunStatus::Failed);
    assert!(snapshot.progress < 100);
    match &snapshot.logs.last().unwrap().kind {
        RunEventKind::Error { message } => assert!(message.contains("No job sources")),
        other => panic!("expected error event, got {:?}", other),
    }
}

#[tokio::test]
async fn panicking_source_fails_the_run_without_losing_progress() {
    let deps = TestDependencies::new()
        .source(MockJobSource::with_records("ok", ml_records("ok", 1)))
        .source(MockJobSource::panicking("broken"))
        .configure(|config| config.max_concurrent_fetches = 1)
        .into_server_deps();

    let run = start_run(&deps, StartRunRequest::standard()).await.unwrap();
    let snapshot = wait_for_terminal(&run).await;

    assert_eq!(snapshot.status, RunStatus::Failed);
    assert_eq!(snapshot.progress, 40);
    assert!(matches!(
        snapshot.logs.last().map(|e| &e.kind),
        Some(RunEventKind::Error { .. })
    ));
}

// =============================================================================
// Observers
// =============================================================================

#[tokio::test]
async fn late_observer_first_sees_snapshot_at_current_progress() {
    init_tracing();
    let (gated, gate) = MockJobSource::with_records("c", ml_records("c", 1)).gated();
    let deps = TestDependencies::new()
        .source(MockJobSource::with_records("a", ml_records("a", 1)))
        .source(MockJobSource::with_records("b", ml_records("b", 1)))
        .source(gated)
        .into_server_deps();

    let run = start_run(&deps, StartRunRequest::standard()).await.unwrap();
    wait_until(&run, |s| s.progress == 50).await;

    let mut observer = run.subscribe().await;
    match observer.next().await {
        Some(StreamMessage::Snapshot(snapshot)) => {
            assert_eq!(snapshot.progress, 50);
            assert_eq!(snapshot.status, RunStatus::Running);
        }
        other => panic!("expected snapshot first, got {:?}", other),
    }

    gate.open();

    let mut events = Vec::new();
    while let Some(message) = observer.next().await {
        match message {
            StreamMessage::Event(event) => events.push(event),
            StreamMessage::Snapshot(_) => panic!("unexpected resync"),
        }
    }

    assert!(events.iter().all(|e| e.progress >= 50));
    assert_progress_monotonic(&events);
    assert_eq!(
        events.last().map(|e| &e.kind),
        Some(&RunEventKind::Done { job_count: 3 })
    );
}

#[tokio::test]
async fn detached_observers_do_not_stop_the_run() {
    let (gated, gate) = MockJobSource::with_records("only", ml_records("only", 2)).gated();
    let deps = TestDependencies::new().source(gated).into_server_deps();

    let run = start_run(&deps, StartRunRequest::standard()).await.unwrap();
    let first = run.subscribe().await;
    let second = run.subscribe().await;
    drop(first);
    drop(second);
    assert_eq!(run.observer_count(), 0);

    gate.open();
    let snapshot = wait_for_terminal(&run).await;
    assert_eq!(snapshot.status, RunStatus::Completed);
    assert_eq!(snapshot.jobs.len(), 2);
}

// =============================================================================
// Ranking
// =============================================================================

#[tokio::test]
async fn ranking_failure_falls_back_to_first_n() {
    let deps = TestDependencies::new()
        .configure(|config| config.max_ranked_jobs = 2)
        .source(MockJobSource::with_records("board", ml_records("board", 4)))
        .ranking(MockRankingService::failing(RankingError::Status {
            status: 500,
            message: "upstream exploded".into(),
        }))
        .into_server_deps();

    let run = start_run(&deps, StartRunRequest::advanced("sk-test"))
        .await
        .unwrap();
    let snapshot = wait_for_terminal(&run).await;

    assert_eq!(snapshot.status, RunStatus::Completed);
    let ids: Vec<String> = snapshot.jobs.iter().map(|j| j.id.clone()).collect();
    assert_eq!(ids, vec![job_id("board", "board-0"), job_id("board", "board-1")]);
    assert!(snapshot.jobs.iter().all(|j| j.fit_score.is_none()));

    let warnings = log_messages(&snapshot, LogLevel::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("fell back"));
}

#[tokio::test]
async fn model_ranking_reorders_and_annotates() {
    let top = job_id("board", "board-2");
    let reply = format!(
        r#"{{"ranked":[{{"id":"{}","score":93,"rationale":"Deep learning focus"}}],"summary":"Plenty of LLM roles"}}"#,
        top
    );
    let ranking = MockRankingService::replying(&reply);
    let calls = ranking.calls();
    let deps = TestDependencies::new()
        .source(MockJobSource::with_records("board", ml_records("board", 3)))
        .ranking(ranking)
        .into_server_deps();

    let run = start_run(&deps, StartRunRequest::advanced("sk-test"))
        .await
        .unwrap();
    let snapshot = wait_for_terminal(&run).await;

    assert_eq!(snapshot.jobs.len(), 3);
    assert_eq!(snapshot.jobs[0].id, top);
    assert_eq!(snapshot.jobs[0].fit_score, Some(93.0));
    assert_eq!(snapshot.jobs[1].id, job_id("board", "board-0"));
    assert!(log_messages(&snapshot, LogLevel::Info)
        .iter()
        .any(|m| m == "Plenty of LLM roles"));
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn standard_mode_never_calls_the_model() {
    let ranking = MockRankingService::replying(r#"{"ranked":[]}"#);
    let calls = ranking.calls();
    let deps = TestDependencies::new()
        .source(MockJobSource::with_records("board", ml_records("board", 2)))
        .ranking(ranking)
        .into_server_deps();

    let request = StartRunRequest {
        mode: Some("standard".into()),
        api_key: Some("sk-ignored".into()),
    };
    let run = start_run(&deps, request).await.unwrap();
    let snapshot = wait_for_terminal(&run).await;

    assert_eq!(snapshot.status, RunStatus::Completed);
    assert!(calls.lock().unwrap().is_empty());
    assert!(log_messages(&snapshot, LogLevel::Info)
        .iter()
        .any(|m| m.contains("No model-assisted ranking")));
}

#[tokio::test]
async fn advanced_mode_without_key_is_rejected_before_registration() {
    let deps = TestDependencies::new()
        .source(MockJobSource::with_records("board", Vec::<RawJob>::new()))
        .into_server_deps();

    let request = StartRunRequest {
        mode: Some("advanced".into()),
        api_key: Some("   ".into()),
    };
    assert!(start_run(&deps, request).await.is_err());
    assert_eq!(deps.runs.len().await, 0);
}
