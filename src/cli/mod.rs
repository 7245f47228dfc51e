pub mod app;
pub mod commands;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod rank;
pub mod run;
pub mod runtime;

pub use app::run;
pub use rank::{cmd_rank, RankArgs};
pub use run::{cmd_run, RunArgs};
