//! CLI configuration
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `cadence.toml` in the working directory, or the file given with `--config`
//! 3. `CADENCE_*` environment variables, sections separated by `__`
//!    (`CADENCE_CACHE__DIR=/var/cache/cadence`)

use crate::error::{CliError, Result};
use cadence_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "cadence.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CadenceConfig {
    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub playback: PlaybackSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlaybackSettings {
    #[serde(default = "default_source")]
    pub source: String,

    #[serde(default = "default_cover_size")]
    pub cover_size: String,

    #[serde(default = "default_status_poll_interval_ms")]
    pub status_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl CadenceConfig {
    /// Load configuration from file and environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, config::Environment::with_prefix("CADENCE"))
    }

    fn load_with_env(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            // An explicit path must exist
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        settings = settings.add_source(
            env.prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CliError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.playback.source.is_empty() || self.playback.source.contains('/') {
            return Err(CliError::Config(format!(
                "playback.source must be a non-empty path segment, got {:?}",
                self.playback.source
            )));
        }

        if self.playback.status_poll_interval_ms == 0 {
            return Err(CliError::Config(
                "playback.status_poll_interval_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Settings handed to the playback library
    pub fn playback_config(&self) -> PlaybackConfig {
        PlaybackConfig {
            source: self.playback.source.clone(),
            cover_size: self.playback.cover_size.clone(),
            status_poll_interval: Duration::from_millis(self.playback.status_poll_interval_ms),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            source: default_source(),
            cover_size: default_cover_size(),
            status_poll_interval_ms: default_status_poll_interval_ms(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("./cache")
}

fn default_source() -> String {
    "remote".to_string()
}

fn default_cover_size() -> String {
    "100x100".to_string()
}

fn default_status_poll_interval_ms() -> u64 {
    100
}

fn default_filter() -> String {
    "cadence=info".to_string()
}
