//! Patient input schema for heart disease prediction

use crate::error::{Result, ServiceError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of input features the scaler and classifier were fitted on
pub const FEATURE_COUNT: usize = 13;

/// Feature names in the exact order the artifacts were fitted on
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// Valid (min, max) range per feature, in fitted order
const FEATURE_RANGES: [(f64, f64); FEATURE_COUNT] = [
    (1.0, 120.0),   // age
    (0.0, 1.0),     // sex
    (0.0, 3.0),     // cp
    (80.0, 200.0),  // trestbps
    (100.0, 600.0), // chol
    (0.0, 1.0),     // fbs
    (0.0, 2.0),     // restecg
    (60.0, 220.0),  // thalach
    (0.0, 1.0),     // exang
    (0.0, 10.0),    // oldpeak
    (0.0, 2.0),     // slope
    (0.0, 3.0),     // ca
    (0.0, 3.0),     // thal
];

/// One patient's clinical measurements.
///
/// Deserialization requires all 13 fields; the lenient CLI intake goes
/// through [`PatientFeatures::from_json_lenient`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientFeatures {
    /// Age in years
    pub age: f64,
    /// Sex (0 = female, 1 = male)
    pub sex: f64,
    /// Chest pain type (0-3)
    pub cp: f64,
    /// Resting blood pressure (mm Hg)
    pub trestbps: f64,
    /// Serum cholesterol (mg/dl)
    pub chol: f64,
    /// Fasting blood sugar > 120 mg/dl (0/1)
    pub fbs: f64,
    /// Resting ECG results (0-2)
    pub restecg: f64,
    /// Maximum heart rate achieved
    pub thalach: f64,
    /// Exercise induced angina (0/1)
    pub exang: f64,
    /// ST depression induced by exercise
    pub oldpeak: f64,
    /// Slope of peak exercise ST segment (0-2)
    pub slope: f64,
    /// Number of major vessels (0-3)
    pub ca: f64,
    /// Thalassemia (0 = normal, 1 = fixed, 2 = reversible, 3 = unknown)
    pub thal: f64,
}

impl PatientFeatures {
    /// Build from a JSON object, defaulting any absent field to 0.
    ///
    /// This is the subprocess intake path: fields are not range-checked and
    /// missing entries are tolerated. A non-object input or a present but
    /// non-numeric field is an error.
    pub fn from_json_lenient(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| ServiceError::validation("input", "must be a JSON object"))?;

        let field = |name: &str| -> Result<f64> {
            match object.get(name) {
                None => Ok(0.0),
                Some(v) => v.as_f64().ok_or_else(|| {
                    ServiceError::validation(name, format!("value {} is not a number", v))
                }),
            }
        };

        Ok(Self {
            age: field("age")?,
            sex: field("sex")?,
            cp: field("cp")?,
            trestbps: field("trestbps")?,
            chol: field("chol")?,
            fbs: field("fbs")?,
            restecg: field("restecg")?,
            thalach: field("thalach")?,
            exang: field("exang")?,
            oldpeak: field("oldpeak")?,
            slope: field("slope")?,
            ca: field("ca")?,
            thal: field("thal")?,
        })
    }

    /// The features as a single row in the order the artifacts were fitted on
    pub fn to_row(&self) -> [f64; FEATURE_COUNT] {
        [
            self.age,
            self.sex,
            self.cp,
            self.trestbps,
            self.chol,
            self.fbs,
            self.restecg,
            self.thalach,
            self.exang,
            self.oldpeak,
            self.slope,
            self.ca,
            self.thal,
        ]
    }

    /// Check every field against its documented range.
    ///
    /// The error names the first violated constraint. Used by the HTTP path
    /// before any value reaches the inference engine.
    pub fn validate(&self) -> Result<()> {
        for ((name, value), (min, max)) in FEATURE_NAMES.iter().zip(self.to_row()).zip(FEATURE_RANGES)
        {
            if !value.is_finite() {
                return Err(ServiceError::validation(
                    *name,
                    format!("value {} is not a finite number", value),
                ));
            }
            if value < min || value > max {
                return Err(ServiceError::validation(
                    *name,
                    format!("value {} is outside the valid range [{}, {}]", value, min, max),
                ));
            }
        }
        Ok(())
    }
}
