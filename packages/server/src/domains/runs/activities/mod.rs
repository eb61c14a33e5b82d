pub mod execute_run;
pub mod start_run;

pub use execute_run::{execute_run, spawn_run};
pub use start_run::{start_run, StartRunRequest};
