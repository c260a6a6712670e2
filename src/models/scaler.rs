//! Fitted feature standardization

use crate::error::{Result, ServiceError};
use serde::{Deserialize, Serialize};

/// Standardization parameters fitted by the training pipeline.
///
/// Transforms a raw feature row into the space the classifier was trained
/// on: `(x - mean) / scale` per feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Check internal consistency against the expected feature count
    pub fn validate(&self, n_features: usize) -> Result<()> {
        if self.mean.len() != n_features {
            return Err(ServiceError::artifact(format!(
                "scaler mean has {} entries, expected {}",
                self.mean.len(),
                n_features
            )));
        }
        if self.scale.len() != n_features {
            return Err(ServiceError::artifact(format!(
                "scaler scale has {} entries, expected {}",
                self.scale.len(),
                n_features
            )));
        }
        if let Some(index) = self.scale.iter().position(|&s| s == 0.0 || !s.is_finite()) {
            return Err(ServiceError::artifact(format!(
                "scaler scale entry {} is not a usable divisor",
                index
            )));
        }
        Ok(())
    }

    /// Standardize one row. Fails only on a shape mismatch.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.mean.len() {
            return Err(ServiceError::inference(format!(
                "input row has {} features, scaler was fitted on {}",
                row.len(),
                self.mean.len()
            )));
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| (x - mean) / scale)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaler() -> StandardScaler {
        StandardScaler {
            mean: vec![10.0, 0.5],
            scale: vec![2.0, 0.5],
        }
    }

    #[test]
    fn test_transform_standardizes() {
        let scaled = scaler().transform(&[14.0, 0.5]).unwrap();
        assert_eq!(scaled, vec![2.0, 0.0]);
    }

    #[test]
    fn test_transform_rejects_shape_mismatch() {
        let err = scaler().transform(&[1.0]).unwrap_err();
        assert!(matches!(err, ServiceError::Inference { .. }));
    }

    #[test]
    fn test_validate_dimensions() {
        assert!(scaler().validate(2).is_ok());
        assert!(scaler().validate(13).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_scale() {
        let scaler = StandardScaler {
            mean: vec![0.0],
            scale: vec![0.0],
        };
        assert!(scaler.validate(1).is_err());
    }
}
