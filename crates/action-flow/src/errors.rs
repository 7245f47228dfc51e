//! Run error types

use pagewalk_core_types::{DriverError, InspectError};
use thiserror::Error;

/// Failures that end a run or reject it up front.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The run input cannot be acted on
    #[error("invalid run input: {0}")]
    InvalidInput(String),

    /// Browser driver failure
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// Page inspector failure
    #[error(transparent)]
    Inspect(#[from] InspectError),
}

impl FlowError {
    /// Short machine-readable category used in failure responses.
    pub fn kind(&self) -> &'static str {
        match self {
            FlowError::InvalidInput(_) => "invalid_input",
            FlowError::Driver(_) => "driver",
            FlowError::Inspect(_) => "inspect",
        }
    }
}
