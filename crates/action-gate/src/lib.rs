//! Intent action gate
//!
//! Turns the top-ranked navigation candidate into at most one navigation per
//! run. The candidate has to clear a fixed sequence of gates first; the first
//! gate that refuses names the block reason.

pub mod selector;
pub mod types;

pub use selector::*;
pub use types::*;
