//! Kernel module - server infrastructure and dependencies.

pub mod broadcaster;
pub mod deps;
pub mod llm_request;
pub mod test_dependencies;
pub mod traits;

pub use broadcaster::Broadcaster;
pub use deps::{PipelineSettings, ServerDeps};
pub use llm_request::OpenAIRankingService;
pub use test_dependencies::{MockJobSource, MockRankingService, SourceGate, TestDependencies};
pub use traits::*;
