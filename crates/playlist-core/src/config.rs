use serde::Deserialize;
use std::path::PathBuf;

use super::platform;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlayerConfig {
    /// Explicit mpv binary.  Empty means: look beside the executable, then PATH.
    #[serde(default)]
    pub mpv_binary: PathBuf,
    /// Appended to the mpv command line (e.g. `--audio-device=...`).
    #[serde(default)]
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, used when RUST_LOG is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl PlayerConfig {
    /// Resolve the mpv binary: the configured path if set, else discovery.
    pub fn resolve_mpv_binary(&self) -> Option<PathBuf> {
        if !self.mpv_binary.as_os_str().is_empty() {
            return Some(self.mpv_binary.clone());
        }
        platform::find_mpv_binary()
    }
}

impl Config {
    /// Read the config file if present.  A missing file yields defaults; the
    /// file is never written back.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&config_path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
