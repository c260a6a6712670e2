//! Prediction result data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classification outcome derived from the model's hard prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    Positive,
    Negative,
}

impl Prediction {
    /// Map the model's hard class label to an outcome
    pub fn from_class(class: usize) -> Self {
        if class == 1 {
            Prediction::Positive
        } else {
            Prediction::Negative
        }
    }
}

/// Risk tier derived from the disease probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Determine the tier from a probability and the configured thresholds.
    ///
    /// Lower bounds are closed: exactly `medium` is Medium, exactly `high`
    /// is High.
    pub fn from_probability(probability: f64, thresholds: &RiskThresholds) -> Self {
        if probability >= thresholds.high {
            RiskLevel::High
        } else if probability >= thresholds.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

/// Configurable risk tier thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Probabilities at or above this are at least Medium
    pub medium: f64,
    /// Probabilities at or above this are High
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: 0.3,
            high: 0.7,
        }
    }
}

/// Structured risk assessment returned to every caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionReport {
    /// Outcome from the model's hard classification
    pub prediction: Prediction,
    /// Probability of disease (class 1), rounded to 4 decimals
    pub probability: f64,
    /// Probability mass of the favored class, rounded to 4 decimals
    pub confidence: f64,
    /// Tier derived from the disease probability
    pub risk_level: RiskLevel,
    /// Prediction timestamp (UTC, ISO-8601)
    pub timestamp: DateTime<Utc>,
}
