use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};
use tracing::debug;

/// Environment variable holding the upstream API credential. It is never
/// read from the config file and never serialized.
pub const API_KEY_ENV: &str = "EXCHANGE_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UpstreamConfig {
    pub base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            base_url: "https://v6.exchangerate-api.com/v6".to_string(),
        }
    }
}

fn default_proxy_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

#[derive(Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Where the CLI's conversion client points.
    #[serde(default = "default_proxy_url")]
    pub proxy_url: String,
    #[serde(skip)]
    pub api_key: Option<String>,
}

// The credential must never end up in logs, so Debug only reports whether
// it is present.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("server", &self.server)
            .field("upstream", &self.upstream)
            .field("proxy_url", &self.proxy_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            proxy_url: default_proxy_url(),
            api_key: None,
        }
    }
}

impl AppConfig {
    /// Loads the default config file, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            debug!("No config file found, using defaults");
            Ok(AppConfig::default())
        }
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "easyexchange", "ezx")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Reads the upstream credential from the environment.
    pub fn with_env(mut self) -> Self {
        self.api_key = env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
server:
  bind: "0.0.0.0:9000"
upstream:
  base_url: "http://example.com/v6"
proxy_url: "http://converter.example.com"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.upstream.base_url, "http://example.com/v6");
        assert_eq!(config.proxy_url, "http://converter.example.com");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config: AppConfig = serde_yaml::from_str("proxy_url: \"http://localhost:3000\"")
            .expect("Failed to deserialize");
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.upstream.base_url, "https://v6.exchangerate-api.com/v6");
        assert_eq!(config.proxy_url, "http://localhost:3000");
    }

    #[test]
    fn test_load_from_file() {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        fs::write(
            config_file.path(),
            r#"
server:
  bind: "127.0.0.1:8181"
"#,
        )
        .expect("Failed to write config file");

        let config = AppConfig::load_from_path(config_file.path()).unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8181");
        assert_eq!(config.proxy_url, "http://127.0.0.1:8080");
    }
}
