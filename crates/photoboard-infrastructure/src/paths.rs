//! Filesystem locations for PhotoBoard.
//!
//! ```text
//! ~/.config/photoboard/        # Config directory
//! └── config.toml
//!
//! ~/.local/share/photoboard/   # Data directory (or `data_dir` from config)
//! ├── board.json               # Preferred tier (structured document)
//! ├── kv/                      # Fallback tier (flat key-value)
//! │   └── photoboard-state
//! └── exports/                 # Export archives
//! ```

use std::path::PathBuf;

use photoboard_core::config::BoardConfig;
use photoboard_core::error::{BoardError, Result};

const APP_DIR: &str = "photoboard";

/// Resolved directories for one board instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardPaths {
    data_dir: PathBuf,
}

impl BoardPaths {
    /// Uses `config.data_dir` when set, otherwise the platform data directory.
    pub fn from_config(config: &BoardConfig) -> Result<Self> {
        let data_dir = match &config.data_dir {
            Some(dir) => dir.clone(),
            None => Self::default_data_dir()?,
        };
        Ok(Self { data_dir })
    }

    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// `~/.config/photoboard` (platform equivalent).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| BoardError::config("Cannot find config directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    fn default_data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| BoardError::config("Cannot find data directory"))
    }

    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }

    pub fn document_file(&self) -> PathBuf {
        self.data_dir.join("board.json")
    }

    pub fn key_value_dir(&self) -> PathBuf {
        self.data_dir.join("kv")
    }

    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join("exports")
    }
}
