use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

/// Environment variables checked for the Gemini key, in order
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Settings {
    pub gemini_api_key: Option<String>,
    pub export_dir: Option<String>,
}

/// Where the resolved API key came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Env,
    Config,
}

impl KeySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySource::Env => "env",
            KeySource::Config => "config",
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(config_path)?;
        let settings: Settings = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config file {:?}: {}", config_path, e))?;
        Ok(settings)
    }

    /// Resolve the API key: environment first, then the config file
    pub fn resolve_api_key(&self) -> Option<(String, KeySource)> {
        Self::resolve_api_key_with(self, |name| std::env::var(name).ok())
    }

    fn resolve_api_key_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Option<(String, KeySource)> {
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|k| !k.trim().is_empty())
            .map(|k| (k, KeySource::Env))
            .or_else(|| {
                self.gemini_api_key
                    .clone()
                    .filter(|k| !k.trim().is_empty())
                    .map(|k| (k, KeySource::Config))
            })
    }

    /// Directory downloads are written to: configured, then the user's
    /// download folder, then the working directory
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| dirs::download_dir().map(|d| d.join("neurodeploy")))
            .unwrap_or_else(|| PathBuf::from("neurodeploy-bundle"))
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("neurodeploy").join("config.json"))
    }
}
