use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TallyError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_dir_string")]
    pub data_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_string(),
        }
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn config_dir() -> PathBuf {
    home_dir().join(".config").join("tally")
}

fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir_string() -> String {
    home_dir()
        .join("Documents")
        .join("tally")
        .to_string_lossy()
        .to_string()
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    let Ok(content) = std::fs::read_to_string(&path) else {
        return Settings::default();
    };
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            tracing::warn!("ignoring unreadable settings at {}: {e}", path.display());
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    std::fs::create_dir_all(config_dir())?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| TallyError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}

/// Expand a leading `~` and make the path absolute where possible.
pub fn expand_path(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        return format!("{}{rest}", home_dir().to_string_lossy());
    }
    std::path::absolute(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
