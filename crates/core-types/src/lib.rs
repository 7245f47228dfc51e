//! Shared primitives for the pagewalk navigation core.
//!
//! Everything the individual components agree on lives here: run and mission
//! identifiers, the read-only page model handed over by the inspector, the
//! historical control rankings, and the capability ports behind which the
//! browser driver, the inspector and the ranking store sit.

pub mod errors;
pub mod page;
pub mod ports;
pub mod ranking;
pub mod store;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use errors::*;
pub use page::*;
pub use ports::*;
pub use ranking::*;
pub use store::*;

/// Identifier of one invocation of the navigation core.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an externally issued, budget-bounded mission.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MissionId(pub String);

impl MissionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl fmt::Display for MissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
