//! Linear classifiers stored as a JSON document of fitted parameters.
//!
//! ```json
//! {
//!   "estimator": "logistic_regression",
//!   "features": ["male", "age", ...],
//!   "coefficients": [0.55, 0.065, ...],
//!   "intercept": -8.6,
//!   "scaler": { "mean": [...], "scale": [...] }
//! }
//! ```

use serde::Deserialize;

use crate::error::{InferenceError, LoadError};
use crate::features::{feature_names, FeatureVector, FEATURES, FEATURE_COUNT};
use crate::model::RiskModel;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Estimator {
    LogisticRegression,
    /// Margin only, no probability output.
    LinearSvc,
}

#[derive(Deserialize, Debug, Clone)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LinearModelDocument {
    pub estimator: Estimator,
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

#[derive(Debug, Clone)]
pub struct LinearModel {
    estimator: Estimator,
    coefficients: [f64; FEATURE_COUNT],
    intercept: f64,
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

impl LinearModel {
    pub fn from_json(content: &str) -> Result<Self, LoadError> {
        let document: LinearModelDocument = serde_json::from_str(content)?;
        Self::from_document(document)
    }

    pub fn from_document(document: LinearModelDocument) -> Result<Self, LoadError> {
        let expected: Vec<&str> = feature_names().collect();
        if document.features != expected {
            return Err(LoadError::InvalidArtifact(format!(
                "feature order {:?} does not match {:?}",
                document.features, expected
            )));
        }

        let coefficients = fixed_width("coefficients", &document.coefficients)?;
        let (mean, scale) = match &document.scaler {
            Some(scaler) => (
                fixed_width("scaler.mean", &scaler.mean)?,
                fixed_width("scaler.scale", &scaler.scale)?,
            ),
            None => ([0.0; FEATURE_COUNT], [1.0; FEATURE_COUNT]),
        };

        if let Some(i) = scale.iter().position(|&s| s == 0.0) {
            return Err(LoadError::InvalidArtifact(format!(
                "scaler.scale is zero for '{}'",
                FEATURES[i].name
            )));
        }
        let all_finite = coefficients
            .iter()
            .chain(mean.iter())
            .chain(scale.iter())
            .all(|v| v.is_finite());
        if !all_finite || !document.intercept.is_finite() {
            return Err(LoadError::InvalidArtifact(
                "parameters must be finite numbers".to_string(),
            ));
        }

        Ok(Self {
            estimator: document.estimator,
            coefficients,
            intercept: document.intercept,
            mean,
            scale,
        })
    }

    /// Signed distance from the separating hyperplane.
    pub fn decision_function(&self, features: &FeatureVector) -> f64 {
        features
            .values()
            .iter()
            .zip(self.coefficients.iter())
            .zip(self.mean.iter().zip(self.scale.iter()))
            .fold(self.intercept, |z, ((&x, &w), (&m, &s))| {
                z + w * (x - m) / s
            })
    }
}

fn fixed_width(what: &str, values: &[f64]) -> Result<[f64; FEATURE_COUNT], LoadError> {
    values.try_into().map_err(|_| {
        LoadError::InvalidArtifact(format!(
            "{} has {} values, expected {}",
            what,
            values.len(),
            FEATURE_COUNT
        ))
    })
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl RiskModel for LinearModel {
    fn classify(&self, features: &FeatureVector) -> Result<i64, InferenceError> {
        features.ensure_finite()?;
        let z = self.decision_function(features);
        if z.is_nan() {
            return Err(InferenceError::UnexpectedOutput(
                "decision function is NaN".to_string(),
            ));
        }
        Ok(i64::from(z > 0.0))
    }

    fn supports_probability(&self) -> bool {
        self.estimator == Estimator::LogisticRegression
    }

    fn positive_probability(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        match self.estimator {
            Estimator::LogisticRegression => {
                features.ensure_finite()?;
                Ok(sigmoid(self.decision_function(features)))
            }
            Estimator::LinearSvc => Err(InferenceError::ProbabilityUnsupported),
        }
    }

    fn kind(&self) -> &'static str {
        match self.estimator {
            Estimator::LogisticRegression => "logistic_regression",
            Estimator::LinearSvc => "linear_svc",
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    const NAMES: [&str; FEATURE_COUNT] = [
        "male",
        "age",
        "currentSmoker",
        "cigsPerDay",
        "BPMeds",
        "prevalentStroke",
        "prevalentHyp",
        "diabetes",
        "totChol",
        "sysBP",
        "diaBP",
        "BMI",
        "heartRate",
        "glucose",
    ];

    /// Only `age` matters: positive above 50 years.
    pub(crate) fn age_only_document(estimator: &str) -> serde_json::Value {
        let mut coefficients = vec![0.0; FEATURE_COUNT];
        coefficients[1] = 1.0;
        json!({
            "estimator": estimator,
            "features": NAMES,
            "coefficients": coefficients,
            "intercept": -50.0,
        })
    }

    fn with_age(age: f64) -> FeatureVector {
        let mut values = [0.0; FEATURE_COUNT];
        values[1] = age;
        FeatureVector::new(values)
    }

    #[test]
    fn test_logistic_classify_and_probability() {
        let model = LinearModel::from_json(&age_only_document("logistic_regression").to_string())
            .unwrap();
        assert!(model.supports_probability());

        assert_eq!(model.classify(&with_age(55.0)).unwrap(), 1);
        let p = model.positive_probability(&with_age(55.0)).unwrap();
        assert!((p - 0.993_307_149).abs() < 1e-6);

        assert_eq!(model.classify(&with_age(40.0)).unwrap(), 0);
        assert!(model.positive_probability(&with_age(40.0)).unwrap() < 0.001);
    }

    #[test]
    fn test_boundary_is_negative_class() {
        let model = LinearModel::from_json(&age_only_document("logistic_regression").to_string())
            .unwrap();
        assert_eq!(model.classify(&with_age(50.0)).unwrap(), 0);
        assert_eq!(model.positive_probability(&with_age(50.0)).unwrap(), 0.5);
    }

    #[test]
    fn test_linear_svc_has_no_probability() {
        let model = LinearModel::from_json(&age_only_document("linear_svc").to_string()).unwrap();
        assert!(!model.supports_probability());
        assert_eq!(model.classify(&with_age(60.0)).unwrap(), 1);
        assert!(matches!(
            model.positive_probability(&with_age(60.0)),
            Err(InferenceError::ProbabilityUnsupported)
        ));
    }

    #[test]
    fn test_scaler_is_applied() {
        let mut document = age_only_document("logistic_regression");
        document["intercept"] = json!(0.0);
        document["scaler"] = json!({
            "mean": vec![50.0; FEATURE_COUNT],
            "scale": vec![10.0; FEATURE_COUNT],
        });
        let model = LinearModel::from_json(&document.to_string()).unwrap();
        assert!((model.decision_function(&with_age(70.0)) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_nan_input_is_inference_error() {
        let model = LinearModel::from_json(&age_only_document("logistic_regression").to_string())
            .unwrap();
        assert!(matches!(
            model.classify(&with_age(f64::NAN)),
            Err(InferenceError::NonFiniteInput { field: "age" })
        ));
    }

    #[test]
    fn test_infinite_input_is_inference_error() {
        let model = LinearModel::from_json(&age_only_document("logistic_regression").to_string())
            .unwrap();
        let mut values = [0.0; FEATURE_COUNT];
        values[1] = 55.0;
        values[13] = f64::INFINITY;
        let vector = FeatureVector::new(values);

        assert!(matches!(
            model.classify(&vector),
            Err(InferenceError::NonFiniteInput { field: "glucose" })
        ));
        assert!(matches!(
            model.positive_probability(&vector),
            Err(InferenceError::NonFiniteInput { field: "glucose" })
        ));
    }

    #[test]
    fn test_rejects_wrong_feature_order() {
        let mut document = age_only_document("logistic_regression");
        document["features"][0] = json!("age");
        document["features"][1] = json!("male");
        assert!(matches!(
            LinearModel::from_json(&document.to_string()),
            Err(LoadError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_coefficient_count() {
        let mut document = age_only_document("logistic_regression");
        document["coefficients"] = json!([1.0, 2.0]);
        let err = LinearModel::from_json(&document.to_string()).unwrap_err();
        assert!(err.to_string().contains("coefficients has 2 values"));
    }

    #[test]
    fn test_rejects_zero_scale() {
        let mut document = age_only_document("logistic_regression");
        let mut scale = vec![1.0; FEATURE_COUNT];
        scale[11] = 0.0;
        document["scaler"] = json!({ "mean": vec![0.0; FEATURE_COUNT], "scale": scale });
        let err = LinearModel::from_json(&document.to_string()).unwrap_err();
        assert!(err.to_string().contains("BMI"));
    }

    #[test]
    fn test_rejects_unknown_estimator() {
        let document = age_only_document("random_forest");
        assert!(matches!(
            LinearModel::from_json(&document.to_string()),
            Err(LoadError::Json(_))
        ));
    }
}
