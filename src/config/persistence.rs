//! Config file load and save.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::types::Config;

fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
    if let Some(p) = path {
        return Ok(PathBuf::from(p));
    }

    // Default config location: config.json beside the executable
    let exe_dir = std::env::current_exe()?
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Cannot determine executable directory"))?
        .to_path_buf();
    Ok(exe_dir.join("config.json"))
}

pub async fn load_config(path: Option<&str>) -> Result<Config> {
    let config_path = resolve_path(path)?;

    if config_path.exists() {
        let content = tokio::fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read config file {config_path:?}"))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {config_path:?}"))?;

        if config.bmc.host.is_empty() {
            warn!("No BMC host configured; hardware commands will use the local interface");
        }

        info!("Loaded configuration from: {:?}", config_path);
        Ok(config)
    } else {
        warn!("Config file {:?} not found, using defaults ('init-config' writes one)", config_path);
        Ok(Config::default())
    }
}

pub async fn save_config(config: &Config, path: Option<&str>) -> Result<()> {
    let config_path = resolve_path(path)?;
    let content = serde_json::to_string_pretty(config)?;
    tokio::fs::write(&config_path, content)
        .await
        .with_context(|| format!("Failed to write config file {config_path:?}"))?;
    info!("Configuration saved to: {:?}", config_path);
    Ok(())
}
