use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

/// Default OpenWeather API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Default quiet window for debounced location lookups.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// debounce_ms = 300
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// OpenWeather credential token.
    pub api_key: Option<String>,

    /// Override for the API root, mostly useful for testing against a mock.
    pub base_url: Option<String>,

    /// Quiet window in milliseconds before a location lookup is issued.
    pub debounce_ms: Option<u64>,

    /// Directory holding persisted search history.
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// API key, preferring the environment over the stored value.
    pub fn api_key(&self) -> Result<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_with_env(&self, env_value: Option<String>) -> Result<String> {
        env_value
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()))
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `weather configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS))
    }

    /// Directory for persisted history; the platform data dir unless overridden.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().to_path_buf()),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-task", "weather-cli")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key_with_env(None).unwrap_err();

        assert!(err.to_string().contains("No OpenWeather API key configured"));
        assert!(err.to_string().contains("Hint: run `weather configure`"));
    }

    #[test]
    fn stored_api_key_is_used() {
        let mut cfg = Config::default();
        cfg.set_api_key("STORED".into());

        assert_eq!(cfg.api_key_with_env(None).unwrap(), "STORED");
    }

    #[test]
    fn env_api_key_overrides_stored_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("STORED".into());

        let key = cfg.api_key_with_env(Some("FROM_ENV".into())).unwrap();
        assert_eq!(key, "FROM_ENV");
    }

    #[test]
    fn blank_env_key_falls_back_to_stored() {
        let mut cfg = Config::default();
        cfg.set_api_key("STORED".into());

        let key = cfg.api_key_with_env(Some("  ".into())).unwrap();
        assert_eq!(key, "STORED");
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = Config::default();

        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
        assert_eq!(cfg.debounce(), Duration::from_millis(DEFAULT_DEBOUNCE_MS));
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let cfg = Config {
            base_url: Some("http://127.0.0.1:9000/".into()),
            ..Config::default()
        };

        assert_eq!(cfg.base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn parses_from_toml() {
        let cfg: Config = toml::from_str(
            r#"
            api_key = "KEY"
            debounce_ms = 250
            data_dir = "/tmp/weather"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api_key.as_deref(), Some("KEY"));
        assert_eq!(cfg.debounce(), Duration::from_millis(250));
        assert_eq!(cfg.data_dir().unwrap(), PathBuf::from("/tmp/weather"));
    }
}
