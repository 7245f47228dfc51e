//! Mission budgets and stop decisions
//!
//! A [`MissionGate`] is consulted before the first page and after every page.
//! Budget rules that fire there override whatever made the pagination loop
//! stop; otherwise the loop's own reason becomes the run's decision.

pub mod gate;
pub mod model;

pub use gate::MissionGate;
pub use model::*;
