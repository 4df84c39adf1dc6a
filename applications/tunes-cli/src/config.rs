/// CLI configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tunes_playback::PlaybackConfig;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "tunes.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineSettings {
    /// How long the simulated engine "plays" each track
    #[serde(default = "default_track_length_ms")]
    pub track_length_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            track_length_ms: default_track_length_ms(),
        }
    }
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default `tunes.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
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

        // Override with environment variables (TUNES_PLAYBACK__REPEAT=all)
        settings = settings.add_source(
            config::Environment::with_prefix("TUNES")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("playback.extensions"),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.playback.command_capacity == 0 {
            return Err(CliError::Config(
                "playback.command_capacity must be at least 1".to_string(),
            ));
        }

        if self.engine.track_length_ms == 0 {
            return Err(CliError::Config(
                "engine.track_length_ms must be greater than zero".to_string(),
            ));
        }

        if self.playback.extensions.iter().any(|ext| ext.starts_with('.')) {
            return Err(CliError::Config(
                "playback.extensions are given without the leading dot".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_track_length_ms() -> u64 {
    3_000
}
