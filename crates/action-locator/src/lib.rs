//! Next-control resolution for pagination
//!
//! This crate finds the control that advances a result listing:
//! - Ranked selectors from earlier runs, filtered to pager-looking ones
//! - `rel="next"` anchors
//! - Accessible labels mentioning "next"
//! - Exact "Next"-style texts, buttons before links
//! - The page number following the active one
//!
//! Every lookup is reported as a `selector_outcome` signal.

pub mod errors;
pub mod resolver;
pub mod strategies;
pub mod types;

pub use errors::*;
pub use resolver::*;
pub use strategies::*;
pub use types::*;
