use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DeepMemConfig {
    pub api: ApiConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the memory store API. Trailing slashes are tolerated.
    pub base_url: String,
    /// Bearer token sent with every request. Required — see [`DeepMemConfig::validate`].
    pub auth_token: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub log_level: String,
    /// Content preview length for non-verbose search output, in characters.
    pub content_preview_chars: usize,
}

impl Default for DeepMemConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:14243".into(),
            auth_token: String::new(),
            timeout_secs: 30,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".into(),
            content_preview_chars: 150,
        }
    }
}

/// Returns `~/.deep-mem/`
pub fn default_deep_mem_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".deep-mem")
}

/// Returns the default config file path: `~/.deep-mem/config.toml`
pub fn default_config_path() -> PathBuf {
    default_deep_mem_dir().join("config.toml")
}

impl DeepMemConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("failed to read config file: {e}")))?;
            toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("failed to parse config TOML: {e}")))?
        } else {
            info!("no config file at {}, using defaults", path.display());
            DeepMemConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (MEM_API_URL, MEM_AUTH_TOKEN,
    /// MEM_TIMEOUT, MEM_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MEM_API_URL") {
            self.api.base_url = val;
        }
        if let Ok(val) = std::env::var("MEM_AUTH_TOKEN") {
            self.api.auth_token = val;
        }
        if let Ok(val) = std::env::var("MEM_TIMEOUT") {
            match val.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => tracing::warn!("ignoring non-numeric MEM_TIMEOUT: {val}"),
            }
        }
        if let Ok(val) = std::env::var("MEM_LOG_LEVEL") {
            self.output.log_level = val;
        }
    }

    /// Reject a missing or blank auth token before any request is made.
    pub fn validate(&self) -> Result<()> {
        if self.api.auth_token.trim().is_empty() {
            return Err(Error::Config(
                "MEM_AUTH_TOKEN is required. Set it via environment variable \
                 or the [api] section of ~/.deep-mem/config.toml."
                    .into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DeepMemConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:14243");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.output.log_level, "warn");
        assert_eq!(config.output.content_preview_chars, 150);
        assert!(config.api.auth_token.is_empty());
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[api]
base_url = "https://mem.example.com/"
auth_token = "tok-123"

[output]
log_level = "debug"
"#;
        let config: DeepMemConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://mem.example.com/");
        assert_eq!(config.api.auth_token, "tok-123");
        assert_eq!(config.output.log_level, "debug");
        // defaults still apply for unset fields
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.output.content_preview_chars, 150);
    }

    #[test]
    fn load_from_missing_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = DeepMemConfig::load_from(tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config.output.content_preview_chars, 150);
    }

    #[test]
    fn load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[output]\ncontent_preview_chars = 99\n").unwrap();

        let config = DeepMemConfig::load_from(&path).unwrap();
        assert_eq!(config.output.content_preview_chars, 99);
    }

    #[test]
    fn load_from_rejects_bad_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[api\nbroken").unwrap();

        let err = DeepMemConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = DeepMemConfig::default();
        std::env::set_var("MEM_API_URL", "http://override:9999");
        std::env::set_var("MEM_AUTH_TOKEN", "env-token");
        std::env::set_var("MEM_TIMEOUT", "5");
        std::env::set_var("MEM_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.api.base_url, "http://override:9999");
        assert_eq!(config.api.auth_token, "env-token");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.output.log_level, "trace");

        // Clean up
        std::env::remove_var("MEM_API_URL");
        std::env::remove_var("MEM_AUTH_TOKEN");
        std::env::remove_var("MEM_TIMEOUT");
        std::env::remove_var("MEM_LOG_LEVEL");
    }

    #[test]
    fn validate_rejects_blank_token() {
        let mut config = DeepMemConfig::default();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.api.auth_token = "   ".into();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.api.auth_token = "tok".into();
        assert!(config.validate().is_ok());
    }
}
