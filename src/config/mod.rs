use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::ScmdError;

fn default_prompt() -> String {
    "> ".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Refuse to run hidden commands typed at the prompt.
    #[serde(default)]
    pub execute_only_visible: bool,
    /// Treat hidden commands as visible everywhere.
    #[serde(default)]
    pub show_hidden: bool,
    #[serde(default = "default_prompt")]
    pub prompt: String,
    pub history_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            execute_only_visible: false,
            show_hidden: false,
            prompt: default_prompt(),
            history_file: None,
        }
    }
}

impl Config {
    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scmd")
    }

    fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Load the default configuration file, writing a starter file on
    /// first run.
    pub fn load() -> Result<Config, ScmdError> {
        let path = Self::config_path();
        if path.exists() {
            return Self::load_from(&path);
        }

        let config = Config::default();
        let _ = config.save();
        Ok(config)
    }

    /// Read configuration from an explicit YAML file. A missing file
    /// falls back to defaults without touching the filesystem.
    pub fn load_from(path: &Path) -> Result<Config, ScmdError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path)?;
        serde_yml::from_str::<Config>(&contents)
            .map_err(|e| ScmdError::Config(format!("Parse {}: {}", path.display(), e)))
    }

    pub fn save(&self) -> Result<(), ScmdError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let yaml_content = serde_yml::to_string(self)?;
        fs::write(&path, yaml_content)?;
        Ok(())
    }

    /// Where the interactive shell keeps its history.
    pub fn history_path(&self) -> PathBuf {
        self.history_file
            .clone()
            .unwrap_or_else(|| Self::config_dir().join("history.txt"))
    }
}
