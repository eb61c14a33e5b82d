//! Process-wide store of runs.
//!
//! Runs are never evicted; they live for the process lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::domains::runs::handle::{RunHandle, DEFAULT_EVENT_LIMIT};
use crate::domains::runs::models::{RunId, RunMode, RunSummary};
use crate::domains::runs::RunError;
use crate::kernel::broadcaster::DEFAULT_CAPACITY;

#[derive(Debug, Clone)]
pub struct RunRegistry {
    runs: Arc<RwLock<HashMap<RunId, Arc<RunHandle>>>>,
    event_limit: usize,
    channel_capacity: usize,
}

impl RunRegistry {
    pub fn new(event_limit: usize, channel_capacity: usize) -> Self {
        Self {
            runs: Arc::new(RwLock::new(HashMap::new())),
            event_limit,
            channel_capacity,
        }
    }

    /// Register a fresh run in `running` state.
    pub async fn create(&self, mode: RunMode) -> Arc<RunHandle> {
        let handle = Arc::new(RunHandle::new(mode, self.event_limit, self.channel_capacity));
        self.runs.write().await.insert(handle.id(), handle.clone());
        info!(run_id = %handle.id(), ?mode, "Run created");
        handle
    }

    pub async fn get(&self, id: RunId) -> Option<Arc<RunHandle>> {
        self.runs.read().await.get(&id).cloned()
    }

    /// Look up by the textual id from a URL. Malformed ids are simply not found.
    pub async fn get_str(&self, id: &str) -> Result<Arc<RunHandle>, RunError> {
        let parsed: RunId = id
            .parse()
            .map_err(|_| RunError::NotFound(id.to_string()))?;
        self.get(parsed)
            .await
            .ok_or_else(|| RunError::NotFound(id.to_string()))
    }

    /// All runs, newest first.
    pub async fn list(&self) -> Vec<RunSummary> {
        let handles: Vec<Arc<RunHandle>> = self.runs.read().await.values().cloned().collect();
        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            summaries.push(handle.summary().await);
        }
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        summaries
    }

    pub async fn len(&self) -> usize {
        self.runs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.runs.read().await.is_empty()
    }
}

impl Default for RunRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_LIMIT, DEFAULT_CAPACITY)
    }
}
