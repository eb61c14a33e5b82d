// TestDependencies - mock implementations for testing
//
// Provides mock sources and ranking services that can be injected into
// ServerDeps for unit and integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::watch;

use super::{BaseJobSource, BaseRankingService, ServerDeps};
use crate::config::Config;
use crate::domains::jobs::{FieldAliases, KeywordFilter, RawJob};
use crate::domains::ranking::RankingError;
use crate::domains::runs::RunRegistry;
use crate::domains::sources::SourceError;

// =============================================================================
// Mock Job Source
// =============================================================================

enum MockBehavior {
    Records(Vec<RawJob>),
    Fail(SourceError),
    Panic,
}

pub struct MockJobSource {
    name: String,
    behavior: MockBehavior,
    aliases: FieldAliases,
    delay: Option<Duration>,
    gate: Option<watch::Receiver<bool>>,
    calls: Arc<AtomicUsize>,
}

/// Holds a gated [`MockJobSource`] fetch open until [`SourceGate::open`].
pub struct SourceGate(watch::Sender<bool>);

impl SourceGate {
    pub fn open(&self) {
        self.0.send_replace(true);
    }
}

impl MockJobSource {
    fn with_behavior(name: &str, behavior: MockBehavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            aliases: FieldAliases::DEFAULT,
            delay: None,
            gate: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the given records on every fetch
    pub fn with_records(name: &str, records: Vec<RawJob>) -> Self {
        Self::with_behavior(name, MockBehavior::Records(records))
    }

    /// Fails every fetch with the given error
    pub fn failing(name: &str, error: SourceError) -> Self {
        Self::with_behavior(name, MockBehavior::Fail(error))
    }

    /// Panics inside fetch
    pub fn panicking(name: &str) -> Self {
        Self::with_behavior(name, MockBehavior::Panic)
    }

    /// Sleep before answering
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Block fetch until the returned gate is opened
    pub fn gated(mut self) -> (Self, SourceGate) {
        let (tx, rx) = watch::channel(false);
        self.gate = Some(rx);
        (self, SourceGate(tx))
    }

    pub fn with_aliases(mut self, aliases: FieldAliases) -> Self {
        self.aliases = aliases;
        self
    }

    /// Shared fetch counter, readable after the source is moved into deps
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl BaseJobSource for MockJobSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn field_aliases(&self) -> FieldAliases {
        self.aliases
    }

    async fn fetch(&self) -> Result<Vec<RawJob>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            let mut gate = gate.clone();
            let _ = gate.wait_for(|open| *open).await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.behavior {
            MockBehavior::Records(records) => Ok(records.clone()),
            MockBehavior::Fail(error) => Err(error.clone()),
            MockBehavior::Panic => panic!("mock source {} panicked", self.name),
        }
    }
}

/// A raw record that passes the default keyword filter.
pub fn ml_record(id: &str, title: &str, company: &str) -> RawJob {
    RawJob::new()
        .with("id", id)
        .with("title", title)
        .with("company", company)
        .with("location", "Remote")
        .with("url", format!("https://jobs.example.com/{}", id))
        .with("description", "Build machine learning systems with PyTorch.")
}

// =============================================================================
// Mock Ranking Service
// =============================================================================

pub struct MockRankingService {
    reply: Result<String, RankingError>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockRankingService {
    /// Answers every request with `reply`
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fails every request with `error`
    pub fn failing(error: RankingError) -> Self {
        Self {
            reply: Err(error),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// User prompts received so far
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl BaseRankingService for MockRankingService {
    async fn complete(
        &self,
        _credential: &SecretString,
        _system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, RankingError> {
        self.calls.lock().unwrap().push(user_prompt.to_string());
        self.reply.clone()
    }
}

// =============================================================================
// TestDependencies - Builder for test dependencies
// =============================================================================

pub struct TestDependencies {
    pub sources: Vec<Arc<dyn BaseJobSource>>,
    pub ranking: Arc<dyn BaseRankingService>,
    pub config: Config,
}

impl TestDependencies {
    pub fn new() -> Self {
        let config = Config {
            source_timeout: Duration::from_secs(5),
            ..Config::default()
        };
        Self {
            sources: Vec::new(),
            ranking: Arc::new(MockRankingService::replying(r#"{"ranked":[]}"#)),
            config,
        }
    }

    /// Append a source; sources are fetched in insertion order
    pub fn source(mut self, source: impl BaseJobSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Set the ranking service
    pub fn ranking(mut self, service: impl BaseRankingService + 'static) -> Self {
        self.ranking = Arc::new(service);
        self
    }

    /// Adjust configuration
    pub fn configure(mut self, f: impl FnOnce(&mut Config)) -> Self {
        f(&mut self.config);
        self
    }

    pub fn into_server_deps(self) -> Arc<ServerDeps> {
        let filter = KeywordFilter::new(self.config.keywords.iter(), self.config.keyword_match);
        Arc::new(ServerDeps::new(
            RunRegistry::new(self.config.run_event_limit, self.config.run_channel_capacity),
            self.sources,
            self.ranking,
            filter,
            &self.config,
        ))
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
