//! Configuration file support for Setclock.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/setclock/config.toml`.

use crate::{Error, Result, Timing};
use crate::types::{
    COUNTDOWN_SECS, DEFAULT_EXERCISE_SECS, REST_BETWEEN_EXERCISES_SECS, REST_BETWEEN_SETS_SECS,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub sound: SoundConfig,

    #[serde(default)]
    pub timing: TimingConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Audio cue configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SoundConfig {
    #[serde(default = "default_sound_enabled")]
    pub enabled: bool,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            enabled: default_sound_enabled(),
        }
    }
}

/// Phase duration configuration, in seconds
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_rest_between_sets")]
    pub rest_between_sets_secs: u32,

    #[serde(default = "default_rest_between_exercises")]
    pub rest_between_exercises_secs: u32,

    #[serde(default = "default_exercise_secs")]
    pub default_exercise_secs: u32,

    #[serde(default = "default_countdown_secs")]
    pub countdown_secs: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            rest_between_sets_secs: default_rest_between_sets(),
            rest_between_exercises_secs: default_rest_between_exercises(),
            default_exercise_secs: default_exercise_secs(),
            countdown_secs: default_countdown_secs(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        PathBuf::from(home).join(".local/share")
    });
    base.join("setclock")
}

fn default_sound_enabled() -> bool {
    true
}

fn default_rest_between_sets() -> u32 {
    REST_BETWEEN_SETS_SECS
}

fn default_rest_between_exercises() -> u32 {
    REST_BETWEEN_EXERCISES_SECS
}

fn default_exercise_secs() -> u32 {
    DEFAULT_EXERCISE_SECS
}

fn default_countdown_secs() -> u32 {
    COUNTDOWN_SECS
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
        base.join("setclock").join("config.toml")
    }

    /// Rests must last at least one tick
    pub fn validate(&self) -> Result<()> {
        if self.timing.rest_between_sets_secs == 0 || self.timing.rest_between_exercises_secs == 0
        {
            return Err(Error::Config("rest durations must be at least 1 second".into()));
        }
        Ok(())
    }

    /// Phase durations for a session
    pub fn timing(&self) -> Timing {
        Timing {
            rest_between_sets: self.timing.rest_between_sets_secs,
            rest_between_exercises: self.timing.rest_between_exercises_secs,
            default_exercise: self.timing.default_exercise_secs,
            countdown: self.timing.countdown_secs,
        }
    }

    /// Path of the completed-workout history log
    pub fn history_path(data_dir: &Path) -> PathBuf {
        data_dir.join("history.jsonl")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
