pub mod event;
pub mod run;

pub use event::*;
pub use run::*;
