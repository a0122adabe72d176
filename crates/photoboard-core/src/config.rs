use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Whether the board is shared through a remote channel.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Persistence only. Media is stored inline.
    #[default]
    Local,
    /// Persistence plus a remote subscription. Media is stored on a host.
    Synced,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_structured_store() -> bool {
    true
}

/// Root of `config.toml`. Every field has a default so an empty file is valid.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    /// Overrides the platform data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub mode: SyncMode,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Disables the preferred storage tier when false (flat store only).
    #[serde(default = "default_structured_store")]
    pub structured_store: bool,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            mode: SyncMode::default(),
            log_level: default_log_level(),
            structured_store: default_structured_store(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: BoardConfig = toml::from_str("").unwrap();
        assert_eq!(config, BoardConfig::default());
        assert!(config.structured_store);
        assert_eq!(config.mode, SyncMode::Local);
    }

    #[test]
    fn test_parse_synced_mode() {
        let config: BoardConfig = toml::from_str(
            r#"
mode = "synced"
log_level = "debug"
structured_store = false
"#,
        )
        .unwrap();
        assert_eq!(config.mode, SyncMode::Synced);
        assert_eq!(config.log_level, "debug");
        assert!(!config.structured_store);
    }
}
