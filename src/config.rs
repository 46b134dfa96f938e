use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Extra attempts before the reply starts streaming. 0 disables retries.
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.1:latest".to_string(),
            timeout_secs: 300,
            connect_timeout_secs: 10,
            max_retries: 0,
            retry_base_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5100,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::from_file(Path::new(CONFIG_FILE))?;

        if let Ok(endpoint) = std::env::var("OLLAMA_ENDPOINT") {
            config.ollama.endpoint = endpoint;
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            config.ollama.model = model;
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let config_text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&config_text).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config.ollama.endpoint, "http://localhost:11434");
        assert_eq!(config.ollama.model, "llama3.1:latest");
        assert_eq!(config.ollama.max_retries, 0);
        assert_eq!(config.web.port, 5100);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = AppConfig::parse(
            r#"
            [ollama]
            model = "qwen2.5:7b"
            max_retries = 2

            [web]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.ollama.model, "qwen2.5:7b");
        assert_eq!(config.ollama.max_retries, 2);
        assert_eq!(config.ollama.endpoint, "http://localhost:11434");
        assert_eq!(config.web.port, 8080);
        assert_eq!(config.web.host, "0.0.0.0");
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(AppConfig::parse("[ollama\nmodel = ").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::from_file(Path::new("does-not-exist/config.toml")).unwrap();
        assert_eq!(config.web.host, "0.0.0.0");
    }
}
