//! Error types raised by the external collaborators behind the ports.

use thiserror::Error;

/// Errors surfaced by a browser driver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Navigation to a URL could not be completed
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// Control lookup failed on the live page
    #[error("control query failed: {0}")]
    Query(String),

    /// Interaction with a control failed
    #[error("click on control {handle} failed: {reason}")]
    Click { handle: String, reason: String },

    /// The driver did not answer in time
    #[error("driver timeout: {0}")]
    Timeout(String),

    /// The underlying browser session is gone
    #[error("driver session closed")]
    Closed,
}

impl DriverError {
    /// Transient failures are worth another attempt within the same step.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DriverError::Click { .. } | DriverError::Timeout(_) | DriverError::Query(_)
        )
    }
}

/// Errors surfaced by the page inspector.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InspectError {
    #[error("snapshot of {url} failed: {reason}")]
    Snapshot { url: String, reason: String },

    #[error("item extraction failed: {0}")]
    Extraction(String),
}

/// Errors raised while loading prior-run control rankings.
#[derive(Debug, Error)]
pub enum RankingStoreError {
    #[error("failed to read ranking store: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse ranking store: {0}")]
    Parse(#[from] serde_json::Error),
}
