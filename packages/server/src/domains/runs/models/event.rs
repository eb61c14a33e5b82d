use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domains::runs::models::RunSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One entry in a run's ordered event log.
///
/// `progress` and `stage` are the run's values right after this event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64,
    pub at: DateTime<Utc>,
    pub progress: u8,
    pub stage: String,
    #[serde(flatten)]
    pub kind: RunEventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEventKind {
    Progress,
    Log {
        level: LogLevel,
        message: String,
    },
    Done {
        #[serde(rename = "jobCount")]
        job_count: usize,
    },
    Error {
        message: String,
    },
}

impl RunEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, RunEventKind::Done { .. } | RunEventKind::Error { .. })
    }

    pub fn is_log(&self) -> bool {
        matches!(self.kind, RunEventKind::Log { .. })
    }

    /// SSE event name.
    pub fn event_name(&self) -> &'static str {
        match self.kind {
            RunEventKind::Progress => "progress",
            RunEventKind::Log { .. } => "log",
            RunEventKind::Done { .. } => "done",
            RunEventKind::Error { .. } => "error",
        }
    }
}

/// What an observer receives: one snapshot, then events.
#[derive(Debug, Clone)]
pub enum StreamMessage {
    Snapshot(Box<RunSnapshot>),
    Event(RunEvent),
}

impl StreamMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            StreamMessage::Snapshot(_) => "snapshot",
            StreamMessage::Event(event) => event.event_name(),
        }
    }

    /// A terminal snapshot or a `done`/`error` event. Nothing follows it.
    pub fn is_terminal(&self) -> bool {
        match self {
            StreamMessage::Snapshot(snapshot) => snapshot.status.is_terminal(),
            StreamMessage::Event(event) => event.is_terminal(),
        }
    }

    /// Reduced payload sent when a terminal message fails to encode in full.
    pub fn fallback_json(&self) -> Option<serde_json::Value> {
        if !self.is_terminal() {
            return None;
        }
        let value = match self {
            StreamMessage::Snapshot(snapshot) => serde_json::json!({
                "type": "snapshot",
                "id": snapshot.id.to_string(),
                "status": snapshot.status.as_str(),
                "progress": snapshot.progress,
                "stage": snapshot.stage,
                "lastSeq": snapshot.last_seq,
            }),
            StreamMessage::Event(event) => serde_json::json!({
                "type": event.event_name(),
                "seq": event.seq,
                "progress": event.progress,
                "stage": event.stage,
            }),
        };
        Some(value)
    }

    /// JSON payload. Every payload carries a `type` field.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            StreamMessage::Snapshot(snapshot) => {
                let mut value = serde_json::to_value(snapshot)?;
                if let Some(object) = value.as_object_mut() {
                    object.insert("type".to_string(), "snapshot".into());
                }
                Ok(value)
            }
            StreamMessage::Event(event) => serde_json::to_value(event),
        }
    }
}
