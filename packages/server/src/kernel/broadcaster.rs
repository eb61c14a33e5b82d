//! Typed in-process broadcast for streaming run events to observers.
//!
//! One `Broadcaster` per run. Observers attach with [`Broadcaster::subscribe`]
//! and detach by dropping their receiver; neither side ever blocks the other.
//!
//! # Usage
//!
//! Producer (the run task):
//!   broadcaster.publish(event);
//!
//! Consumers (stream endpoints):
//!   let rx = broadcaster.subscribe();

use tokio::sync::broadcast;

/// Default number of buffered messages per run before slow observers lag.
pub const DEFAULT_CAPACITY: usize = 256;

/// Fan-out channel with a dynamic observer set.
///
/// Cloneable; clones share the same channel.
#[derive(Debug, Clone)]
pub struct Broadcaster<T: Clone> {
    tx: broadcast::Sender<T>,
}

impl<T: Clone> Broadcaster<T> {
    /// Create a broadcaster with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a broadcaster buffering up to `capacity` messages (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Push a value to every attached observer. No-op if nobody is attached.
    ///
    /// Returns the number of observers the value was delivered to.
    pub fn publish(&self, value: T) -> usize {
        // Ignore send errors (no active receivers)
        self.tx.send(value).unwrap_or(0)
    }

    /// Attach a new observer. It only sees values published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.tx.subscribe()
    }

    /// Number of currently attached observers.
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Clone> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}
