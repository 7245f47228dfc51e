use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::env::LogFormat;
use crate::config::Config;

pub fn init_logging(level: &str, debug: bool, format: LogFormat) -> Result<()> {
    let filter = if debug {
        EnvFilter::new(tracing::Level::DEBUG.to_string())
    } else {
        let level: tracing::Level = level.parse().context("Invalid log level")?;
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
    };

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Human => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
    }
    .context("Failed to initialise logging")?;

    Ok(())
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: Option<PathBuf>,
}

/// Candidate files when no `--config` is given, in priority order.
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("config/pagewalk.yaml")];
    if let Some(mut path) = dirs::config_dir() {
        path.push("pagewalk");
        path.push("config.yaml");
        paths.push(path);
    }
    paths
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let selected = match config_path {
        Some(path) => {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            Some(path.clone())
        }
        None => default_config_paths().into_iter().find(|path| path.exists()),
    };

    let mut config = match &selected {
        Some(path) => {
            let content = fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config = Config::from_yaml_str(&content).context("Failed to parse config file")?;
            info!("Loaded configuration from: {}", path.display());
            config
        }
        None => {
            warn!("No config file found, using defaults");
            Config::default()
        }
    };

    config
        .apply_env_overrides()
        .context("Invalid environment override")?;

    Ok(LoadedConfig {
        config,
        path: selected,
    })
}
