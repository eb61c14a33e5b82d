//! Helpers for driving runs to a known state.

use std::sync::Arc;
use std::time::Duration;

use radar_core::domains::runs::{LogLevel, RunEvent, RunEventKind, RunHandle, RunSnapshot};

/// Route tracing to the test writer. Run with `RUST_LOG=debug` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Poll until the run satisfies `done`, failing the test after 10 seconds.
pub async fn wait_until<F>(run: &Arc<RunHandle>, done: F) -> RunSnapshot
where
    F: Fn(&RunSnapshot) -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let snapshot = run.snapshot().await;
        if done(&snapshot) {
            return snapshot;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "run {} did not reach expected state; last stage: {}",
            snapshot.id,
            snapshot.stage
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

pub async fn wait_for_terminal(run: &Arc<RunHandle>) -> RunSnapshot {
    wait_until(run, |s| s.status.is_terminal()).await
}

/// Log messages at `level`, in order.
pub fn log_messages(snapshot: &RunSnapshot, level: LogLevel) -> Vec<String> {
    snapshot
        .logs
        .iter()
        .filter_map(|event| match &event.kind {
            RunEventKind::Log { level: l, message } if *l == level => Some(message.clone()),
            _ => None,
        })
        .collect()
}

pub fn assert_progress_monotonic(events: &[RunEvent]) {
    for pair in events.windows(2) {
        assert!(
            pair[0].progress <= pair[1].progress,
            "progress went backwards: {} -> {} at seq {}",
            pair[0].progress,
            pair[1].progress,
            pair[1].seq
        );
    }
}
