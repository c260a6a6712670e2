//! Configuration management for the prediction service

use crate::error::Result;
use crate::types::prediction::RiskThresholds;
use config::{Config, File};
use serde::Deserialize;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Deployment environment (development|production)
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Origins allowed by the CORS policy in production
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Model artifact locations
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Serialized classifier produced by the training pipeline
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Serialized feature scaler fitted alongside the classifier
    #[serde(default = "default_scaler_path")]
    pub scaler_path: String,
}

/// Risk assessment configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DetectionConfig {
    /// Probability thresholds for the Low/Medium/High tiers
    #[serde(default)]
    pub risk_levels: RiskThresholds,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "https://heartscan.vercel.app".to_string(),
    ]
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_model_path() -> String {
    "model/heart_forest.json".to_string()
}

fn default_scaler_path() -> String {
    "model/scaler.json".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl AppConfig {
    /// Load configuration from the default file, then apply env overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from_path("config/config.toml")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific path (missing file falls back to defaults)
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Apply `ENVIRONMENT`, `ALLOWED_ORIGINS` and `PORT` from the process env
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_env_overrides_from(|name| std::env::var(name).ok())
    }

    /// Env override logic with an injectable lookup, so tests can run without
    /// touching process-global state
    pub fn apply_env_overrides_from<F>(&mut self, get: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(environment) = get("ENVIRONMENT") {
            self.environment = environment;
        }

        if let Some(origins) = get("ALLOWED_ORIGINS") {
            self.allowed_origins = origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
        }

        if let Some(port) = get("PORT") {
            self.server.port = port.parse().map_err(|_| {
                config::ConfigError::Message(format!("invalid PORT value: {}", port))
            })?;
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            artifacts: ArtifactsConfig::default(),
            detection: DetectionConfig::default(),
            logging: LoggingConfig::default(),
            environment: default_environment(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            scaler_path: default_scaler_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.environment, "development");
        assert!(!config.is_production());
        assert_eq!(config.detection.risk_levels.medium, 0.3);
        assert_eq!(config.detection.risk_levels.high, 0.7);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_path("does/not/exist.toml").unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.artifacts.model_path, "model/heart_forest.json");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            environment = "production"
            allowed_origins = ["https://app.example.com"]

            [server]
            port = 9000

            [detection.risk_levels]
            medium = 0.25
            high = 0.75
            "#
        )
        .unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert!(config.is_production());
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.allowed_origins, vec!["https://app.example.com"]);
        assert_eq!(config.detection.risk_levels.medium, 0.25);
        // Sections absent from the file keep their defaults
        assert_eq!(config.artifacts.scaler_path, "model/scaler.json");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides_from(|name| match name {
                "ENVIRONMENT" => Some("production".to_string()),
                "ALLOWED_ORIGINS" => Some("https://a.example, https://b.example".to_string()),
                "PORT" => Some("8080".to_string()),
                _ => None,
            })
            .unwrap();

        assert!(config.is_production());
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides_from(|name| match name {
            "PORT" => Some("not-a-port".to_string()),
            _ => None,
        });
        assert!(result.is_err());
    }
}
