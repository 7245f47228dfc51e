//! Configuration management module
//!
//! YAML configuration for the CLI with environment overrides on top.

use std::path::PathBuf;

use action_gate::IntentSelectorConfig;
use action_flow::DEFAULT_CLICK_ATTEMPTS;
use intent_ranker::RankerWeights;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

pub const ENV_SIGNAL_PATH: &str = "PAGEWALK_SIGNAL_PATH";
pub const ENV_RANKINGS_PATH: &str = "PAGEWALK_RANKINGS_PATH";
pub const ENV_CONFIDENCE_THRESHOLD: &str = "PAGEWALK_CONFIDENCE_THRESHOLD";

/// Top-level CLI configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub signals: SignalsConfig,
    pub rankings: RankingsConfig,
    pub intent: IntentSelectorConfig,
    pub ranker: RankerWeights,
    pub pagination: PaginationConfig,
}

/// Where the signal log goes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SignalsConfig {
    pub enabled: bool,
    pub path: PathBuf,
}

impl Default for SignalsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("./signals/pagewalk-signals.jsonl"),
        }
    }
}

/// Prior-run control rankings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RankingsConfig {
    /// JSON file; none means fallbacks only
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginationConfig {
    pub click_attempts: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            click_attempts: DEFAULT_CLICK_ATTEMPTS,
        }
    }
}

impl Config {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Apply `PAGEWALK_*` variables from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_SIGNAL_PATH).filter(|value| !value.trim().is_empty()) {
            self.signals.path = PathBuf::from(path.trim());
        }
        if let Some(path) = lookup(ENV_RANKINGS_PATH).filter(|value| !value.trim().is_empty()) {
            self.rankings.path = Some(PathBuf::from(path.trim()));
        }
        if let Some(raw) = lookup(ENV_CONFIDENCE_THRESHOLD) {
            let threshold: f64 = raw.trim().parse().map_err(|_| ConfigError::InvalidOverride {
                key: ENV_CONFIDENCE_THRESHOLD.to_string(),
                value: raw.clone(),
            })?;
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::InvalidOverride {
                    key: ENV_CONFIDENCE_THRESHOLD.to_string(),
                    value: raw,
                });
            }
            self.intent.confidence_threshold = threshold;
        }
        Ok(())
    }
}
