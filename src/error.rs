//! Error types for the prediction service.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Artifact error: {message}")]
    Artifact { message: String },

    #[error("{field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Inference error: {message}")]
    Inference { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl ServiceError {
    /// Artifact load/validation failure. Fatal at startup.
    pub fn artifact(message: impl Into<String>) -> Self {
        Self::Artifact {
            message: message.into(),
        }
    }

    /// Caller data rejected before inference; names the violated constraint.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Opaque runtime inference failure.
    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
