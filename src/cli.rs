//! One-shot prediction path for subprocess callers

use crate::error::Result;
use crate::models::inference::InferenceEngine;
use crate::types::patient::PatientFeatures;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Run one prediction from a CLI argument and return the JSON report line.
///
/// The argument is either a path to a JSON file or an inline JSON string.
/// Intake is lenient: missing fields default to 0 and no range validation
/// is applied, unlike the HTTP path. Any failure maps to the caller-facing
/// `{"error": ...}` line in `main`.
pub fn run_once(engine: &InferenceEngine, input: &str) -> Result<String> {
    let raw = if Path::new(input).is_file() {
        debug!(path = %input, "Reading feature mapping from file");
        fs::read_to_string(input)?
    } else {
        input.to_string()
    };

    let value: Value = serde_json::from_str(&raw)?;
    let patient = PatientFeatures::from_json_lenient(&value)?;
    let report = engine.predict(&patient)?;

    Ok(serde_json::to_string(&report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::forest::{DecisionTree, ForestModel};
    use crate::models::scaler::StandardScaler;
    use crate::types::patient::FEATURE_COUNT;
    use crate::types::prediction::{PredictionReport, RiskThresholds};
    use std::io::Write;

    fn engine() -> InferenceEngine {
        let tree = DecisionTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -1, -1],
            threshold: vec![0.0, 0.0, 0.0],
            value: vec![[0.0, 0.0], [6.0, 4.0], [2.0, 8.0]],
        };
        let model = ForestModel {
            n_features: FEATURE_COUNT,
            trees: vec![tree],
        };
        let scaler = StandardScaler {
            mean: vec![0.0; FEATURE_COUNT],
            scale: vec![1.0; FEATURE_COUNT],
        };
        InferenceEngine::new(model, scaler, RiskThresholds::default()).unwrap()
    }

    #[test]
    fn test_inline_json_produces_one_report_line() {
        let line = run_once(&engine(), r#"{"age": 58, "thalach": 122}"#).unwrap();
        assert!(!line.contains('\n'));

        let report: PredictionReport = serde_json::from_str(&line).unwrap();
        assert!((0.0..=1.0).contains(&report.probability));
    }

    #[test]
    fn test_file_input() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"age": 58, "sex": 1, "cp": 2}}"#).unwrap();

        let line = run_once(&engine(), file.path().to_str().unwrap()).unwrap();
        let report: PredictionReport = serde_json::from_str(&line).unwrap();
        assert!((0.0..=1.0).contains(&report.confidence));
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        // All features absent: the row is all zeros, which lands in the
        // left leaf of the fixture tree
        let line = run_once(&engine(), "{}").unwrap();
        let report: PredictionReport = serde_json::from_str(&line).unwrap();
        assert_eq!(report.probability, 0.4);
    }

    #[test]
    fn test_unparsable_input_is_an_error() {
        assert!(run_once(&engine(), "not json at all").is_err());
    }

    #[test]
    fn test_non_object_input_is_an_error() {
        assert!(run_once(&engine(), "[1, 2, 3]").is_err());
    }
}
