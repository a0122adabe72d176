//! Loads `config.toml`.

use std::path::Path;

use photoboard_core::config::BoardConfig;
use photoboard_core::error::Result;

use crate::paths::BoardPaths;

/// Reads the config file at `path`. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<BoardConfig> {
    if !path.exists() {
        tracing::debug!("[Config] {} not found, using defaults", path.display());
        return Ok(BoardConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    let config: BoardConfig = toml::from_str(&content)?;
    tracing::debug!("[Config] Loaded {}", path.display());
    Ok(config)
}

/// Reads the config file from the platform config directory.
pub fn load_config() -> Result<BoardConfig> {
    load_config_from(&BoardPaths::config_file()?)
}
