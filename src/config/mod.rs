use crate::utils::DEFAULT_STORAGE_PATH;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A migration unit made of shell commands
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommandMigrationDefinition {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub up: String,
    pub down: String,
    /// Transaction hooks. Setting any of them makes the unit transactional.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abort: Option<String>,
}

fn default_storage_path() -> String {
    DEFAULT_STORAGE_PATH.to_string()
}

fn default_shell() -> String {
    "sh".to_string()
}

/// Tidemark configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TidemarkConfig {
    /// Where applied versions are recorded, relative to the config file.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Shell used to run command migrations (`<shell> -c <command>`).
    #[serde(default = "default_shell")]
    pub shell: String,
    #[serde(default)]
    pub migrations: Vec<CommandMigrationDefinition>,
}

impl Default for TidemarkConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            shell: default_shell(),
            migrations: Vec::new(),
        }
    }
}

/// Read the configuration file
pub async fn read_config(config_path: &Path) -> Result<Option<TidemarkConfig>, ConfigError> {
    let content = match fs::read_to_string(config_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let config: TidemarkConfig = serde_json::from_str(&content)?;
    Ok(Some(config))
}

/// Write the configuration file
pub async fn write_config(config_path: &Path, config: &TidemarkConfig) -> Result<(), ConfigError> {
    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_path, content).await?;
    Ok(())
}
