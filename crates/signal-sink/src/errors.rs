use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open signal log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("signal append failed: {0}")]
    Append(#[from] std::io::Error),
    #[error("signal encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
