//! HeartScan Prediction Service Library
//!
//! Loads a pre-trained heart disease classifier and feature scaler from disk
//! and serves predictions over HTTP and a one-shot CLI invocation path.

pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{Result, ServiceError};
pub use metrics::PredictionMetrics;
pub use models::inference::InferenceEngine;
pub use types::{
    patient::PatientFeatures,
    prediction::{Prediction, PredictionReport, RiskLevel},
};
