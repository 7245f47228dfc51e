//! Navigation run orchestration
//!
//! [`NavigationRunner`] validates a run, enforces the mission budget, takes
//! the optional goal-guided step and then hands over to the
//! [`PaginationController`], a small state machine that extracts each page,
//! resolves the next control and confirms every click by comparing URL and
//! content fingerprint. One [`RunContext`] holds all state of a run.

pub mod click;
pub mod context;
pub mod controller;
pub mod errors;
pub mod runner;
pub mod types;

pub use click::{ClickOutcome, ClickResult, ClickRetryPolicy, DEFAULT_CLICK_ATTEMPTS};
pub use context::RunContext;
pub use controller::{PagePorts, PaginationController, PaginationJob, PaginationState};
pub use errors::FlowError;
pub use runner::NavigationRunner;
pub use types::*;
