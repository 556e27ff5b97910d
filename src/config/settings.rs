use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::Coordinate;

fn default_latitude() -> f64 {
    51.5074
}
fn default_longitude() -> f64 {
    -0.1278
}
fn default_location_name() -> Option<String> {
    Some("London".to_string())
}
fn default_auto_detect() -> bool {
    true
}
fn default_timing_url() -> String {
    "https://api.aladhan.com/v1".to_string()
}
fn default_timing_timeout() -> u64 {
    15
}
fn default_guidance_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_guidance_timeout() -> u64 {
    60
}
fn default_geolocation_url() -> String {
    "http://ip-api.com/json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    #[serde(default = "default_location_name")]
    pub name: Option<String>,
    /// Look the position up from the network at startup; the coordinates
    /// above are used when the lookup fails.
    #[serde(default = "default_auto_detect")]
    pub auto_detect: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            name: default_location_name(),
            auto_detect: default_auto_detect(),
        }
    }
}

impl LocationConfig {
    pub fn coordinate(&self) -> Coordinate {
        match &self.name {
            Some(name) => Coordinate::named(self.latitude, self.longitude, name.as_str()),
            None => Coordinate::new(self.latitude, self.longitude),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_timing_url")]
    pub base_url: String,
    #[serde(default = "default_timing_timeout")]
    pub timeout_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            base_url: default_timing_url(),
            timeout_secs: default_timing_timeout(),
        }
    }
}

impl TimingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuidanceConfig {
    #[serde(default = "default_guidance_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Inline key; takes precedence over `api_key_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_guidance_timeout")]
    pub timeout_secs: u64,
}

impl Default for GuidanceConfig {
    fn default() -> Self {
        Self {
            base_url: default_guidance_url(),
            model: default_model(),
            api_key: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_guidance_timeout(),
        }
    }
}

impl GuidanceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn resolve_api_key(&self) -> Option<String> {
        let usable = |k: String| Some(k.trim().to_string()).filter(|k| !k.is_empty());
        self.api_key
            .clone()
            .and_then(usable)
            .or_else(|| std::env::var(&self.api_key_env).ok().and_then(usable))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    #[serde(default = "default_geolocation_url")]
    pub base_url: String,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            base_url: default_geolocation_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub guidance: GuidanceConfig,
    #[serde(default)]
    pub geolocation: GeolocationConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "miqat")
            .context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("miqat.db"))
    }

    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("miqat.log"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(&path).with_context(|| format!("Reading {:?}", path))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Parsing config.toml")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Serializing config")
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = self.to_toml()?;
        std::fs::write(&path, content).with_context(|| format!("Writing {:?}", path))?;
        Ok(())
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
