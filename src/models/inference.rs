//! Inference engine: the frozen scale-then-predict pipeline

use crate::config::AppConfig;
use crate::error::{Result, ServiceError};
use crate::models::forest::ForestModel;
use crate::models::loader::ArtifactLoader;
use crate::models::scaler::StandardScaler;
use crate::types::patient::{PatientFeatures, FEATURE_COUNT};
use crate::types::prediction::{Prediction, PredictionReport, RiskLevel, RiskThresholds};
use chrono::Utc;
use tracing::{debug, info};

/// The loaded model/scaler pair and the risk tier thresholds.
///
/// Constructed once at startup and shared read-only (behind `Arc`) across
/// all callers for the process lifetime. Never reloaded.
#[derive(Debug)]
pub struct InferenceEngine {
    model: ForestModel,
    scaler: StandardScaler,
    thresholds: RiskThresholds,
}

impl InferenceEngine {
    /// Load both artifacts from the configured paths. Any failure is fatal.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let model = ArtifactLoader::load_model(&config.artifacts.model_path)?;
        let scaler = ArtifactLoader::load_scaler(&config.artifacts.scaler_path, model.n_features)?;
        Self::new(model, scaler, config.detection.risk_levels.clone())
    }

    /// Assemble an engine from already-loaded artifacts
    pub fn new(
        model: ForestModel,
        scaler: StandardScaler,
        thresholds: RiskThresholds,
    ) -> Result<Self> {
        model.validate()?;
        scaler.validate(model.n_features)?;
        if model.n_features != FEATURE_COUNT {
            return Err(ServiceError::artifact(format!(
                "model was fitted on {} features, this service provides {}",
                model.n_features, FEATURE_COUNT
            )));
        }

        info!(
            trees = model.tree_count(),
            features = model.n_features,
            "Inference engine initialized"
        );

        Ok(Self {
            model,
            scaler,
            thresholds,
        })
    }

    /// Run the frozen pipeline for one patient.
    ///
    /// `prediction` comes from the model's hard classification while
    /// `risk_level` is derived independently from the probability
    /// thresholds; the two can disagree for borderline inputs.
    pub fn predict(&self, patient: &PatientFeatures) -> Result<PredictionReport> {
        let row = patient.to_row();
        let scaled = self.scaler.transform(&row)?;

        let class = self.model.predict(&scaled)?;
        let probabilities = self.model.predict_proba(&scaled)?;

        let disease_probability = probabilities[1];
        let confidence = probabilities[0].max(probabilities[1]);

        let risk_level = RiskLevel::from_probability(disease_probability, &self.thresholds);
        let prediction = Prediction::from_class(class);

        debug!(
            class = class,
            p0 = probabilities[0],
            p1 = probabilities[1],
            "Classifier evaluated"
        );
        info!(
            prediction = ?prediction,
            probability = round4(disease_probability),
            risk_level = risk_level.as_str(),
            "Prediction complete"
        );

        Ok(PredictionReport {
            prediction,
            probability: round4(disease_probability),
            confidence: round4(confidence),
            risk_level,
            timestamp: Utc::now(),
        })
    }

    pub fn tree_count(&self) -> usize {
        self.model.tree_count()
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }
}

/// Round to 4 decimal places for the wire format
fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::forest::DecisionTree;

    /// Engine over an identity-ish scaler and two stumps on age/thalach
    fn engine() -> InferenceEngine {
        let tree_on_age = DecisionTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -1, -1],
            threshold: vec![0.0, 0.0, 0.0],
            value: vec![[0.0, 0.0], [8.0, 2.0], [3.0, 7.0]],
        };
        let tree_on_thalach = DecisionTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![7, -1, -1],
            threshold: vec![0.0, 0.0, 0.0],
            value: vec![[0.0, 0.0], [2.0, 8.0], [9.0, 1.0]],
        };
        let model = ForestModel {
            n_features: FEATURE_COUNT,
            trees: vec![tree_on_age, tree_on_thalach],
        };
        let scaler = StandardScaler {
            mean: vec![50.0, 0.5, 1.0, 130.0, 240.0, 0.1, 0.5, 150.0, 0.3, 1.0, 1.4, 0.7, 2.3],
            scale: vec![9.0, 0.5, 1.0, 17.0, 52.0, 0.36, 0.53, 23.0, 0.47, 1.2, 0.6, 1.0, 0.6],
        };
        InferenceEngine::new(model, scaler, RiskThresholds::default()).unwrap()
    }

    fn patient() -> PatientFeatures {
        PatientFeatures {
            age: 58.0,
            sex: 0.0,
            cp: 0.0,
            trestbps: 100.0,
            chol: 248.0,
            fbs: 0.0,
            restecg: 0.0,
            thalach: 122.0,
            exang: 0.0,
            oldpeak: 1.0,
            slope: 1.0,
            ca: 0.0,
            thal: 2.0,
        }
    }

    #[test]
    fn test_predict_returns_well_formed_report() {
        let report = engine().predict(&patient()).unwrap();

        assert!((0.0..=1.0).contains(&report.probability));
        assert!((0.0..=1.0).contains(&report.confidence));
        assert!(report.confidence >= 0.5);
        // 4-decimal rounding leaves no residue beyond the scale
        assert_eq!(report.probability, round4(report.probability));
        assert_eq!(report.confidence, round4(report.confidence));
    }

    #[test]
    fn test_risk_level_consistent_with_probability() {
        let report = engine().predict(&patient()).unwrap();
        let expected = RiskLevel::from_probability(report.probability, &RiskThresholds::default());
        assert_eq!(report.risk_level, expected);
    }

    #[test]
    fn test_expected_scores_for_known_input() {
        // age 58 scales to +0.89 (right leaf, p1 0.7); thalach 122 scales to
        // -1.22 (left leaf, p1 0.8) -> mean p1 = 0.75
        let report = engine().predict(&patient()).unwrap();
        assert_eq!(report.probability, 0.75);
        assert_eq!(report.confidence, 0.75);
        assert_eq!(report.prediction, Prediction::Positive);
        assert_eq!(report.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_predict_is_idempotent() {
        let engine = engine();
        let first = engine.predict(&patient()).unwrap();
        let second = engine.predict(&patient()).unwrap();

        assert_eq!(first.prediction, second.prediction);
        assert_eq!(first.probability, second.probability);
        assert_eq!(first.confidence, second.confidence);
        assert_eq!(first.risk_level, second.risk_level);
    }

    #[test]
    fn test_engine_rejects_feature_count_mismatch() {
        let tree = DecisionTree {
            children_left: vec![-1],
            children_right: vec![-1],
            feature: vec![-1],
            threshold: vec![0.0],
            value: vec![[1.0, 1.0]],
        };
        let model = ForestModel {
            n_features: 2,
            trees: vec![tree],
        };
        let scaler = StandardScaler {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
        };
        let err = InferenceEngine::new(model, scaler, RiskThresholds::default()).unwrap_err();
        assert!(matches!(err, ServiceError::Artifact { .. }));
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123456), 0.1235);
        assert_eq!(round4(0.75), 0.75);
        assert_eq!(round4(1.0), 1.0);
    }
}
