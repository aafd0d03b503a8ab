pub mod linear;
pub mod loader;
pub mod onnx;

use std::fmt;
use std::sync::Arc;

use crate::error::InferenceError;
use crate::features::FeatureVector;

/// A binary classifier over the clinical feature vector.
///
/// `classify` is always available. Probability output is optional: backends
/// that provide it override both `supports_probability` and
/// `positive_probability`.
pub trait RiskModel: Send + Sync {
    /// Class label for the vector; `1` is the positive (high risk) class.
    fn classify(&self, features: &FeatureVector) -> Result<i64, InferenceError>;

    fn supports_probability(&self) -> bool {
        false
    }

    /// Probability of the positive class, in `[0, 1]`.
    fn positive_probability(&self, _features: &FeatureVector) -> Result<f64, InferenceError> {
        Err(InferenceError::ProbabilityUnsupported)
    }

    /// Short backend name for log lines.
    fn kind(&self) -> &'static str;
}

/// The process-wide model handle. Cheap to clone, never mutated after load.
#[derive(Clone)]
pub struct LoadedModel {
    model: Arc<dyn RiskModel>,
    has_probability: bool,
}

impl LoadedModel {
    pub fn new(model: Arc<dyn RiskModel>) -> Self {
        let has_probability = model.supports_probability();
        Self {
            model,
            has_probability,
        }
    }

    pub fn has_probability(&self) -> bool {
        self.has_probability
    }

    pub fn kind(&self) -> &'static str {
        self.model.kind()
    }

    pub fn classify(&self, features: &FeatureVector) -> Result<i64, InferenceError> {
        self.model.classify(features)
    }

    /// `None` when the model has no probability output.
    pub fn positive_probability(
        &self,
        features: &FeatureVector,
    ) -> Option<Result<f64, InferenceError>> {
        self.has_probability
            .then(|| self.model.positive_probability(features))
    }
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("kind", &self.kind())
            .field("has_probability", &self.has_probability)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::features::FEATURE_COUNT;

    /// Fixed answers, optionally with a probability.
    pub(crate) struct StubModel {
        pub label: i64,
        pub probability: Option<f64>,
    }

    impl RiskModel for StubModel {
        fn classify(&self, _features: &FeatureVector) -> Result<i64, InferenceError> {
            Ok(self.label)
        }

        fn supports_probability(&self) -> bool {
            self.probability.is_some()
        }

        fn positive_probability(&self, _features: &FeatureVector) -> Result<f64, InferenceError> {
            self.probability.ok_or(InferenceError::ProbabilityUnsupported)
        }

        fn kind(&self) -> &'static str {
            "stub"
        }
    }

    /// Always fails, like a model whose runtime call raises.
    pub(crate) struct FailingModel;

    impl RiskModel for FailingModel {
        fn classify(&self, _features: &FeatureVector) -> Result<i64, InferenceError> {
            Err(InferenceError::UnexpectedOutput(
                "X has 13 features, but model is expecting 14".to_string(),
            ))
        }

        fn kind(&self) -> &'static str {
            "failing"
        }
    }

    pub(crate) fn stub(label: i64, probability: Option<f64>) -> LoadedModel {
        LoadedModel::new(Arc::new(StubModel { label, probability }))
    }

    #[test]
    fn test_capability_flag_cached_at_load() {
        assert!(stub(1, Some(0.8)).has_probability());
        assert!(!stub(1, None).has_probability());
    }

    #[test]
    fn test_probability_absent_without_capability() {
        let model = stub(0, None);
        let vector = FeatureVector::new([0.0; FEATURE_COUNT]);
        assert!(model.positive_probability(&vector).is_none());
        assert_eq!(model.classify(&vector).unwrap(), 0);
    }

    #[test]
    fn test_default_probability_is_unsupported() {
        let vector = FeatureVector::new([0.0; FEATURE_COUNT]);
        assert!(matches!(
            FailingModel.positive_probability(&vector),
            Err(InferenceError::ProbabilityUnsupported)
        ));
    }
}
