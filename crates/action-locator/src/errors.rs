//! Error types for next-control resolution

use thiserror::Error;

/// Locator error enumeration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// No strategy located a visible, enabled control. This is the normal
    /// end of pagination, not a fault.
    #[error("no next control found after {attempts} attempts")]
    NotFound { attempts: u32 },
}
