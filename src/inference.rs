use serde::Serialize;
use std::time::Instant;

use crate::error::InferenceError;
use crate::features::FeatureVector;
use crate::model::LoadedModel;

pub const HIGH_RISK: &str = "High Risk";
pub const LOW_RISK: &str = "Low Risk";
pub const PROBABILITY_UNAVAILABLE: &str = "N/A";

/// Outcome of one prediction, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub prediction: i64,
    pub label: &'static str,
    pub probability: String,
}

pub fn risk_label(prediction: i64) -> &'static str {
    if prediction == 1 {
        HIGH_RISK
    } else {
        LOW_RISK
    }
}

pub fn format_probability(probability: Option<f64>) -> String {
    match probability {
        Some(p) => format!("{:.2}%", p * 100.0),
        None => PROBABILITY_UNAVAILABLE.to_string(),
    }
}

/// Runs the model on one vector. Blocking; call from a blocking context.
pub fn assess(model: &LoadedModel, features: &FeatureVector) -> Result<Assessment, InferenceError> {
    let start = Instant::now();

    let prediction = model.classify(features)?;
    let probability = model.positive_probability(features).transpose()?;

    metrics::histogram!("inference_duration_seconds").record(start.elapsed().as_secs_f64());
    tracing::debug!(prediction, ?probability, "inference complete");

    Ok(Assessment {
        prediction,
        label: risk_label(prediction),
        probability: format_probability(probability),
    })
}
