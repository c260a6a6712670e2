//! Type definitions for the prediction service

pub mod patient;
pub mod prediction;

pub use patient::PatientFeatures;
pub use prediction::{Prediction, PredictionReport, RiskLevel};
