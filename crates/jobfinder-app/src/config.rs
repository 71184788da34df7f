//! Application configuration, read from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration.

use std::path::{Path, PathBuf};

use jobfinder_navigation::TransitionSpec;
use serde::{Deserialize, Serialize};
use web_time::Duration;

pub const CONFIG_ENV: &str = "JOBFINDER_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    pub leave_ms: u64,
    pub enter_ms: u64,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            leave_ms: 300,
            enter_ms: 300,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Selector of the element pages are swapped into.
    pub container: String,
    pub transition: TransitionConfig,
    /// Delay before wellness data shows up during an interview.
    pub wellness_reveal_ms: u64,
    /// Delay before the first-visit welcome modal.
    pub tour_delay_ms: u64,
    /// JSON file for persisted preferences; in-memory when unset.
    pub preferences_path: Option<PathBuf>,
    pub api_base_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            container: "#page-content".into(),
            transition: TransitionConfig::default(),
            wellness_reveal_ms: 2000,
            tour_delay_ms: 1500,
            preferences_path: None,
            api_base_url: "http://localhost:5000/api".into(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Loads from an explicit path, else from `$JOBFINDER_CONFIG`, else
    /// defaults.
    pub fn discover(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        match explicit.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from)) {
            Some(path) => Self::load(path),
            None => {
                log::debug!("no config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn transition_spec(&self) -> TransitionSpec {
        TransitionSpec {
            leave: Duration::from_millis(self.transition.leave_ms),
            enter: Duration::from_millis(self.transition.enter_ms),
            ..TransitionSpec::default()
        }
    }

    pub fn wellness_reveal(&self) -> Duration {
        Duration::from_millis(self.wellness_reveal_ms)
    }

    pub fn tour_delay(&self) -> Duration {
        Duration::from_millis(self.tour_delay_ms)
    }
}
