use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::{Modes, SpeedTier};

pub const CONFIG_FILE: &str = "snake.yaml";

/// Contents of the optional `snake.yaml`. Every key may be left out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub score_file: String,
    pub save_file: String,
    pub log_file: String,
    pub log_level: String,
    pub easy_mode: bool,
    pub wrap_mode: bool,
    pub speed: SpeedTier,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            score_file: "scores.txt".to_string(),
            save_file: "snake_save.txt".to_string(),
            log_file: "snake.log".to_string(),
            log_level: "info".to_string(),
            easy_mode: false,
            wrap_mode: false,
            speed: SpeedTier::Normal,
        }
    }
}

impl Settings {
    /// Reads and validates the file at `path`; a missing file means defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Settings::default());
        }

        let settings = Settings::from_yaml(&fs::read_to_string(path)?)?;
        Ok(settings)
    }

    pub fn from_yaml(content: &str) -> Result<Settings, ConfigError> {
        let settings: Settings = serde_yaml_ng::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("score_file", &self.score_file), ("save_file", &self.save_file), ("log_file", &self.log_file)] {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{key} must not be empty")));
            }
        }

        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Invalid(format!("unknown log level {:?}", self.log_level)));
        }

        Ok(())
    }

    pub fn modes(&self) -> Modes {
        Modes { easy: self.easy_mode, wrap: self.wrap_mode, speed: self.speed }
    }
}
