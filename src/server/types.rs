use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::error::PredictionError;
use crate::inference::Assessment;
use crate::model::LoadedModel;

/// Shared Application State
#[derive(Clone)]
pub struct AppState {
    /// `None` when startup ran in degraded mode.
    pub model: Option<LoadedModel>,
    /// Where the artifact was expected, for the "not loaded" message.
    pub model_path: String,
    pub metrics: PrometheusHandle,
}

/// What the result page (or its JSON form) shows: either the three
/// prediction fields or a single error.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ResultView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResultView {
    pub fn from_assessment(assessment: &Assessment) -> Self {
        Self {
            prediction: Some(assessment.prediction),
            label: Some(assessment.label.to_string()),
            probability: Some(assessment.probability.clone()),
            error: None,
        }
    }

    pub fn from_error(error: &PredictionError) -> Self {
        Self {
            prediction: None,
            label: None,
            probability: None,
            error: Some(error.to_string()),
        }
    }
}

impl From<&Result<Assessment, PredictionError>> for ResultView {
    fn from(outcome: &Result<Assessment, PredictionError>) -> Self {
        match outcome {
            Ok(assessment) => Self::from_assessment(assessment),
            Err(error) => Self::from_error(error),
        }
    }
}
