//! Model artifact loading

use crate::error::{Result, ServiceError};
use crate::models::forest::ForestModel;
use crate::models::scaler::StandardScaler;
use std::fs;
use std::path::Path;
use tracing::info;

/// Loads the frozen artifacts the training pipeline produced.
///
/// Both artifacts are read once at startup; any failure here is fatal to
/// the process.
pub struct ArtifactLoader;

impl ArtifactLoader {
    /// Load and validate the serialized classifier
    pub fn load_model<P: AsRef<Path>>(path: P) -> Result<ForestModel> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading classifier artifact");

        let raw = fs::read_to_string(path).map_err(|e| {
            ServiceError::artifact(format!("failed to read model from {}: {}", path.display(), e))
        })?;
        let model: ForestModel = serde_json::from_str(&raw).map_err(|e| {
            ServiceError::artifact(format!("failed to parse model from {}: {}", path.display(), e))
        })?;
        model.validate()?;

        info!(
            trees = model.tree_count(),
            features = model.n_features,
            "Classifier loaded successfully"
        );
        Ok(model)
    }

    /// Load and validate the serialized scaler against the model's feature count
    pub fn load_scaler<P: AsRef<Path>>(path: P, n_features: usize) -> Result<StandardScaler> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading scaler artifact");

        let raw = fs::read_to_string(path).map_err(|e| {
            ServiceError::artifact(format!(
                "failed to read scaler from {}: {}",
                path.display(),
                e
            ))
        })?;
        let scaler: StandardScaler = serde_json::from_str(&raw).map_err(|e| {
            ServiceError::artifact(format!(
                "failed to parse scaler from {}: {}",
                path.display(),
                e
            ))
        })?;
        scaler.validate(n_features)?;

        info!(features = n_features, "Scaler loaded successfully");
        Ok(scaler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_valid_artifacts() {
        let model_file = write_temp(
            r#"{
                "n_features": 1,
                "trees": [{
                    "children_left": [1, -1, -1],
                    "children_right": [2, -1, -1],
                    "feature": [0, -1, -1],
                    "threshold": [0.0, 0.0, 0.0],
                    "value": [[0.0, 0.0], [3.0, 1.0], [1.0, 4.0]]
                }]
            }"#,
        );
        let scaler_file = write_temp(r#"{"mean": [1.0], "scale": [2.0]}"#);

        let model = ArtifactLoader::load_model(model_file.path()).unwrap();
        assert_eq!(model.tree_count(), 1);

        let scaler = ArtifactLoader::load_scaler(scaler_file.path(), model.n_features).unwrap();
        assert_eq!(scaler.mean, vec![1.0]);
    }

    #[test]
    fn test_missing_file_is_an_artifact_error() {
        let err = ArtifactLoader::load_model("no/such/model.json").unwrap_err();
        assert!(matches!(err, ServiceError::Artifact { .. }));
    }

    #[test]
    fn test_malformed_json_is_an_artifact_error() {
        let file = write_temp("{ not json");
        let err = ArtifactLoader::load_model(file.path()).unwrap_err();
        assert!(matches!(err, ServiceError::Artifact { .. }));
    }

    #[test]
    fn test_scaler_dimension_mismatch_is_rejected() {
        let file = write_temp(r#"{"mean": [1.0, 2.0], "scale": [1.0, 1.0]}"#);
        let err = ArtifactLoader::load_scaler(file.path(), 13).unwrap_err();
        assert!(matches!(err, ServiceError::Artifact { .. }));
    }
}
