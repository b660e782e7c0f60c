use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sidekick_core::OmniboxSettings;
use sidekick_engine::{ChatSettings, ConverterSettings};
use sidekick_logging::sidekick_info;
use thiserror::Error;

const DEFAULT_CONFIG_FILENAME: &str = "sidekick.ron";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidekickConfig {
    pub omnibox: OmniboxSettings,
    pub chat: ChatSettings,
    pub converter: ConverterSettings,
    pub stats_interval_ms: u64,
}

impl Default for SidekickConfig {
    fn default() -> Self {
        Self {
            omnibox: OmniboxSettings::default(),
            chat: ChatSettings::default(),
            converter: ConverterSettings::default(),
            stats_interval_ms: 1000,
        }
    }
}

impl SidekickConfig {
    pub fn stats_interval(&self) -> Duration {
        Duration::from_millis(self.stats_interval_ms.max(100))
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path:?}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// An explicit path must exist. Without one, `./sidekick.ron` is used when
/// present and built-in defaults otherwise.
pub fn load_config(explicit: Option<&Path>) -> Result<SidekickConfig, ConfigError> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let path = Path::new(".").join(DEFAULT_CONFIG_FILENAME);
            if path.is_file() {
                read_config(&path)
            } else {
                sidekick_info!("No {} found; using defaults", DEFAULT_CONFIG_FILENAME);
                Ok(SidekickConfig::default())
            }
        }
    }
}

fn read_config(path: &Path) -> Result<SidekickConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    sidekick_info!("Loaded settings from {:?}", path);
    Ok(config)
}
