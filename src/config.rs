//! Top-level application configuration.
//!
//! Configuration is stored in `.psa/config.yaml` and includes:
//! - Base URLs of the support and project services
//! - The HTTP timeout applied to both

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PsaError, Result};
use crate::types::PSA_DIR;

pub const SUPPORT_URL_ENV: &str = "PSA_SUPPORT_URL";
pub const PROJECT_URL_ENV: &str = "PSA_PROJECT_URL";

pub const DEFAULT_SUPPORT_URL: &str = "http://localhost:8080";
pub const DEFAULT_PROJECT_URL: &str = "https://moduloproyecto.onrender.com";

/// Keys accepted by `psa config get/set`.
pub const CONFIG_KEYS: &[&str] = &["support.url", "project.url", "remote.timeout"];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Support (tickets) service base URL
    #[serde(default = "default_support_url")]
    pub support_url: String,

    /// Project (projects and tasks) service base URL
    #[serde(default = "default_project_url")]
    pub project_url: String,

    /// Remote operation timeout in seconds (default: 30)
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout: u64,
}

fn default_support_url() -> String {
    DEFAULT_SUPPORT_URL.to_string()
}

fn default_project_url() -> String {
    DEFAULT_PROJECT_URL.to_string()
}

fn default_remote_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            support_url: default_support_url(),
            project_url: default_project_url(),
            remote_timeout: default_remote_timeout(),
        }
    }
}

fn env_override(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        PathBuf::from(PSA_DIR).join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            PsaError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content).map_err(|e| {
            PsaError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;
        Ok(())
    }

    /// Support URL from the environment, falling back to the file.
    pub fn support_url(&self) -> String {
        env_override(SUPPORT_URL_ENV).unwrap_or_else(|| self.support_url.clone())
    }

    /// Project URL from the environment, falling back to the file.
    pub fn project_url(&self) -> String {
        env_override(PROJECT_URL_ENV).unwrap_or_else(|| self.project_url.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout)
    }

    /// Current value of a config key, as shown by `config get`.
    pub fn get(&self, key: &str) -> Result<String> {
        match validate_key(key)? {
            "support.url" => Ok(self.support_url()),
            "project.url" => Ok(self.project_url()),
            "remote.timeout" => Ok(self.remote_timeout.to_string()),
            _ => Err(unknown_key(key)),
        }
    }

    /// Update a config key in memory; call [`Config::save`] to persist.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match validate_key(key)? {
            "support.url" => self.support_url = parse_service_url(key, value)?,
            "project.url" => self.project_url = parse_service_url(key, value)?,
            "remote.timeout" => {
                let seconds = value.parse::<u64>().ok().filter(|s| *s > 0).ok_or_else(|| {
                    PsaError::Config(format!(
                        "invalid value '{value}' for remote.timeout. Expected a positive number of seconds"
                    ))
                })?;
                self.remote_timeout = seconds;
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

/// Reject keys written with underscores, suggesting dot notation.
fn validate_key(key: &str) -> Result<&str> {
    if let Some(pos) = key.find('_') {
        let dotted = format!("{}.{}", &key[..pos], &key[pos + 1..]);
        return Err(PsaError::Config(format!(
            "invalid config key '{key}'. Use dot notation: '{dotted}'"
        )));
    }
    Ok(key)
}

fn unknown_key(key: &str) -> PsaError {
    PsaError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        CONFIG_KEYS.join(", ")
    ))
}

fn parse_service_url(key: &str, value: &str) -> Result<String> {
    let url = Url::parse(value.trim())
        .map_err(|e| PsaError::Config(format!("invalid value '{value}' for {key}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(PsaError::Config(format!(
            "invalid value '{value}' for {key}: expected an http or https URL"
        )));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.support_url, "http://localhost:8080");
        assert_eq!(config.project_url, "https://moduloproyecto.onrender.com");
        assert_eq!(config.remote_timeout, 30);
    }

    #[test]
    fn test_config_partial_yaml_uses_defaults() {
        let config: Config = serde_yaml_ng::from_str("remote_timeout: 5\n").unwrap();
        assert_eq!(config.remote_timeout, 5);
        assert_eq!(config.support_url, DEFAULT_SUPPORT_URL);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            support_url: "http://support.test".to_string(),
            ..Default::default()
        };
        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        assert!(yaml.contains("support_url: http://support.test"));
        let back: Config = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_set_validates_values() {
        let mut config = Config::default();
        config.set("support.url", "http://10.0.0.2:9000/").unwrap();
        assert_eq!(config.support_url, "http://10.0.0.2:9000");

        assert!(config.set("project.url", "ftp://example.com").is_err());
        assert!(config.set("remote.timeout", "0").is_err());
        config.set("remote.timeout", "12").unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(12));
    }

    #[test]
    fn test_unknown_and_underscore_keys() {
        let mut config = Config::default();
        let err = config.set("support_url", "http://x").unwrap_err();
        assert!(err.to_string().contains("support.url"));
        assert!(matches!(config.get("colour"), Err(PsaError::Config(_))));
    }

    #[test]
    #[serial]
    fn test_env_override_wins() {
        let config = Config::default();
        // SAFETY: serialized with every other test touching the environment.
        unsafe { env::set_var(SUPPORT_URL_ENV, "http://override:1") };
        assert_eq!(config.support_url(), "http://override:1");
        assert_eq!(config.get("support.url").unwrap(), "http://override:1");
        unsafe { env::remove_var(SUPPORT_URL_ENV) };
        assert_eq!(config.support_url(), DEFAULT_SUPPORT_URL);
    }
}
