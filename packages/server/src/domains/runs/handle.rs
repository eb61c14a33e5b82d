//! Per-run state machine and observer fan-out.
//!
//! A [`RunHandle`] owns one run's mutable state behind a single lock. Every
//! mutation goes through [`RunHandle::emit`], which updates the fields,
//! appends the event to the bounded log and publishes it to observers while
//! still holding the write lock. Observers attach with
//! [`RunHandle::subscribe`], which takes the snapshot and the broadcast
//! receiver under the read lock, so no event can fall between the two.
//!
//! Once a run is terminal (`completed` or `failed`) further emits are
//! ignored.

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::domains::jobs::Job;
use crate::domains::runs::models::{
    LogLevel, RunEvent, RunEventKind, RunId, RunMode, RunSnapshot, RunStatus, RunSummary,
    StreamMessage,
};
use crate::domains::runs::progress::COMPLETE;
use crate::kernel::broadcaster::Broadcaster;

/// Default number of events retained per run.
pub const DEFAULT_EVENT_LIMIT: usize = 500;

#[derive(Debug)]
struct RunState {
    status: RunStatus,
    progress: u8,
    stage: String,
    updated_at: DateTime<Utc>,
    events: VecDeque<RunEvent>,
    jobs: Vec<Job>,
    last_seq: u64,
}

/// Live handle to one run.
#[derive(Debug)]
pub struct RunHandle {
    id: RunId,
    mode: RunMode,
    created_at: DateTime<Utc>,
    event_limit: usize,
    state: RwLock<RunState>,
    broadcaster: Broadcaster<RunEvent>,
}

impl RunHandle {
    pub fn new(mode: RunMode, event_limit: usize, channel_capacity: usize) -> Self {
        let now = Utc::now();
        Self {
            id: RunId::new(),
            mode,
            created_at: now,
            event_limit: event_limit.max(1),
            state: RwLock::new(RunState {
                status: RunStatus::Running,
                progress: 0,
                stage: "Queued".to_string(),
                updated_at: now,
                events: VecDeque::new(),
                jobs: Vec::new(),
                last_seq: 0,
            }),
            broadcaster: Broadcaster::with_capacity(channel_capacity),
        }
    }

    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Apply one transition and publish it.
    ///
    /// `progress` is clamped so it never decreases and never exceeds 100.
    /// Returns the emitted event, or `None` if the run is already terminal.
    async fn emit(
        &self,
        progress: Option<u8>,
        stage: Option<String>,
        kind: RunEventKind,
        apply: impl FnOnce(&mut RunState),
    ) -> Option<RunEvent> {
        let mut state = self.state.write().await;
        if state.status.is_terminal() {
            debug!(run_id = %self.id, "Ignoring update on finished run");
            return None;
        }

        apply(&mut *state);
        if let Some(progress) = progress {
            state.progress = state.progress.max(progress).min(COMPLETE);
        }
        if let Some(stage) = stage {
            state.stage = stage;
        }
        state.last_seq += 1;
        state.updated_at = Utc::now();

        let event = RunEvent {
            seq: state.last_seq,
            at: state.updated_at,
            progress: state.progress,
            stage: state.stage.clone(),
            kind,
        };

        state.events.push_back(event.clone());
        while state.events.len() > self.event_limit {
            state.events.pop_front();
        }

        self.broadcaster.publish(event.clone());
        Some(event)
    }

    /// Move to a new stage.
    pub async fn progress(&self, progress: u8, stage: impl Into<String>) -> Option<RunEvent> {
        self.emit(Some(progress), Some(stage.into()), RunEventKind::Progress, |_| {})
            .await
    }

    /// Append a log entry without changing progress or stage.
    pub async fn log(&self, level: LogLevel, message: impl Into<String>) -> Option<RunEvent> {
        let message = message.into();
        match level {
            LogLevel::Info => info!(run_id = %self.id, "{}", message),
            LogLevel::Warn => warn!(run_id = %self.id, "{}", message),
            LogLevel::Error => error!(run_id = %self.id, "{}", message),
        }
        self.emit(None, None, RunEventKind::Log { level, message }, |_| {})
            .await
    }

    /// Swap in a new job list as part of a stage transition.
    pub async fn replace_jobs(
        &self,
        jobs: Vec<Job>,
        progress: u8,
        stage: impl Into<String>,
    ) -> Option<RunEvent> {
        self.emit(Some(progress), Some(stage.into()), RunEventKind::Progress, |state| {
            state.jobs = jobs
        })
        .await
    }

    /// Finish successfully with the final job list. Progress snaps to 100.
    pub async fn complete(&self, jobs: Vec<Job>) -> Option<RunEvent> {
        let job_count = jobs.len();
        let event = self
            .emit(
                Some(COMPLETE),
                Some("Completed".to_string()),
                RunEventKind::Done { job_count },
                |state| {
                    state.jobs = jobs;
                    state.status = RunStatus::Completed;
                },
            )
            .await;
        if event.is_some() {
            info!(run_id = %self.id, job_count, "Run completed");
        }
        event
    }

    /// Finish unsuccessfully. Progress stays where it was.
    pub async fn fail(&self, message: impl Into<String>) -> Option<RunEvent> {
        let message = message.into();
        error!(run_id = %self.id, error = %message, "Run failed");
        self.emit(None, Some("Failed".to_string()), RunEventKind::Error { message }, |state| {
            state.status = RunStatus::Failed
        })
        .await
    }

    pub async fn status(&self) -> RunStatus {
        self.state.read().await.status
    }

    pub async fn snapshot(&self) -> RunSnapshot {
        let state = self.state.read().await;
        self.snapshot_of(&state)
    }

    pub async fn summary(&self) -> RunSummary {
        let state = self.state.read().await;
        RunSummary {
            id: self.id,
            mode: self.mode,
            status: state.status,
            progress: state.progress,
            stage: state.stage.clone(),
            created_at: self.created_at,
            job_count: state.jobs.len(),
        }
    }

    /// Number of currently attached observers.
    pub fn observer_count(&self) -> usize {
        self.broadcaster.observer_count()
    }

    /// Attach an observer. The first message it yields is the current
    /// snapshot; after that it yields every later event in order.
    pub async fn subscribe(self: &Arc<Self>) -> RunSubscription {
        let state = self.state.read().await;
        let snapshot = self.snapshot_of(&state);
        let rx = self.broadcaster.subscribe();
        drop(state);

        debug!(run_id = %self.id, observers = self.observer_count(), "Observer attached");
        RunSubscription {
            run_id: self.id,
            cursor: snapshot.last_seq,
            pending: Some(snapshot),
            rx,
            handle: Arc::downgrade(self),
            finished: false,
        }
    }

    fn snapshot_of(&self, state: &RunState) -> RunSnapshot {
        RunSnapshot {
            id: self.id,
            mode: self.mode,
            status: state.status,
            progress: state.progress,
            stage: state.stage.clone(),
            created_at: self.created_at,
            updated_at: state.updated_at,
            logs: state.events.iter().cloned().collect(),
            jobs: state.jobs.clone(),
            last_seq: state.last_seq,
        }
    }
}

/// One observer's view of a run.
///
/// Holds only a weak reference to the run; dropping it detaches without
/// affecting the run or other observers.
pub struct RunSubscription {
    run_id: RunId,
    pending: Option<RunSnapshot>,
    rx: Receiver<RunEvent>,
    cursor: u64,
    handle: Weak<RunHandle>,
    finished: bool,
}

impl RunSubscription {
    /// Next message, or `None` once the run is terminal and its final
    /// message has been delivered.
    pub async fn next(&mut self) -> Option<StreamMessage> {
        if let Some(snapshot) = self.pending.take() {
            return Some(self.deliver_snapshot(snapshot));
        }
        if self.finished {
            return None;
        }

        loop {
            match self.rx.recv().await {
                Ok(event) => {
                    if event.seq <= self.cursor {
                        continue;
                    }
                    self.cursor = event.seq;
                    if event.is_terminal() {
                        self.finished = true;
                    }
                    return Some(StreamMessage::Event(event));
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(run_id = %self.run_id, missed, "Observer lagged, resending snapshot");
                    let handle = self.handle.upgrade()?;
                    self.rx = self.rx.resubscribe();
                    let snapshot = handle.snapshot().await;
                    return Some(self.deliver_snapshot(snapshot));
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Adapt into a `Stream` for transport layers.
    pub fn into_stream(self) -> impl Stream<Item = StreamMessage> + Send {
        futures::stream::unfold(self, |mut subscription| async move {
            let message = subscription.next().await?;
            Some((message, subscription))
        })
    }

    fn deliver_snapshot(&mut self, snapshot: RunSnapshot) -> StreamMessage {
        self.cursor = self.cursor.max(snapshot.last_seq);
        if snapshot.status.is_terminal() {
            self.finished = true;
        }
        StreamMessage::Snapshot(Box::new(snapshot))
    }
}

impl Drop for RunSubscription {
    fn drop(&mut self) {
        debug!(run_id = %self.run_id, "Observer detached");
    }
}
