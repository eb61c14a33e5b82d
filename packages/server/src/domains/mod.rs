pub mod jobs;
pub mod ranking;
pub mod runs;
pub mod sources;
