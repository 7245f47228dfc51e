//! Ranking store implementations.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::errors::RankingStoreError;
use crate::ports::RankingStore;
use crate::ranking::ControlRanking;

/// Fixed, in-memory rankings.
#[derive(Debug, Clone, Default)]
pub struct StaticRankingStore {
    rankings: Vec<ControlRanking>,
}

impl StaticRankingStore {
    pub fn new(rankings: Vec<ControlRanking>) -> Self {
        Self { rankings }
    }
}

#[async_trait]
impl RankingStore for StaticRankingStore {
    async fn load(&self) -> Result<Vec<ControlRanking>, RankingStoreError> {
        let mut rankings = self.rankings.clone();
        rankings.sort_by_key(|ranking| ranking.historical_rank);
        Ok(rankings)
    }
}

/// Rankings exported by an earlier run as a JSON array.
#[derive(Debug, Clone)]
pub struct JsonRankingStore {
    path: PathBuf,
}

impl JsonRankingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RankingStore for JsonRankingStore {
    async fn load(&self) -> Result<Vec<ControlRanking>, RankingStoreError> {
        if !tokio::fs::try_exists(&self.path).await? {
            debug!(path = %self.path.display(), "ranking store absent; using empty rankings");
            return Ok(Vec::new());
        }
        let raw = tokio::fs::read_to_string(&self.path).await?;
        let mut rankings: Vec<ControlRanking> = serde_json::from_str(&raw)?;
        rankings.sort_by_key(|ranking| ranking.historical_rank);
        debug!(path = %self.path.display(), count = rankings.len(), "loaded control rankings");
        Ok(rankings)
    }
}
