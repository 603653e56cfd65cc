use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::params::{DisplayParams, GenerationParams};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Application configuration loaded from config.yaml
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Address the HTTP server listens on
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Directory for persisted sessions; sessions stay in memory when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Largest accepted upload body in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Generation parameters for new sessions
    #[serde(default)]
    pub generation: GenerationParams,

    /// Display parameters for new sessions
    #[serde(default)]
    pub display: DisplayParams,
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_max_upload_bytes() -> usize {
    32 * 1024 * 1024
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            data_dir: None,
            max_upload_bytes: default_max_upload_bytes(),
            generation: GenerationParams::default(),
            display: DisplayParams::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `CONFIG_FILE` (if set), then apply the
    /// `BIND_ADDR` and `DATA_DIR` environment overrides.
    pub fn load() -> Self {
        let mut config = match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::load_from_file(Path::new(&path)),
            Err(_) => Self::default(),
        };
        config.apply_env(
            std::env::var("BIND_ADDR").ok(),
            std::env::var("DATA_DIR").ok(),
        );
        config
    }

    /// Read a YAML config file, falling back to defaults on any error
    pub fn load_from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        data_dir = ?config.data_dir,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    fn apply_env(&mut self, bind_addr: Option<String>, data_dir: Option<String>) {
        if let Some(addr) = bind_addr.filter(|a| !a.trim().is_empty()) {
            self.bind_addr = addr;
        }
        if let Some(dir) = data_dir.filter(|d| !d.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }
}
