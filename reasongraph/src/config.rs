//! Desktop application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use reasongraph_common::{AiConfig, Format, LoggingConfig, NodeType, Result};

/// Name of the store file inside the data directory.
const STORE_FILE: &str = "projects";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where projects are stored (default: the platform data directory).
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Encoding of the project file.
    #[serde(default)]
    pub storage_format: Format,

    /// Type of nodes created by double-clicking the canvas.
    #[serde(default)]
    pub default_node_type: NodeType,

    /// Model expansion credentials and defaults.
    #[serde(default)]
    pub ai: AiConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Default config file location: `<config dir>/reasongraph/config.json5`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("reasongraph").join("config.json5"))
    }

    /// Load from `path`, or from the default location when it exists.
    ///
    /// With no file at all the defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => reasongraph_common::load_config(path),
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => reasongraph_common::load_config(path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Resolved data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("reasongraph")))
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Path of the project store file.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir()
            .join(STORE_FILE)
            .with_extension(self.storage_format.extension())
    }
}
