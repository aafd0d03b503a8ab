use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use ndarray::ShapeError;
use thiserror::Error;

use crate::server::{pages, types::ResultView};

/// Failure to bring the model artifact into memory.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Model not found at path: {0}")]
    ModelNotFound(String),

    #[error("Unsupported model format: {0} (expected .onnx or .json)")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ONNX Runtime error: {0}")]
    OrtError(#[from] ort::Error),

    #[error("Malformed model document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),
}

/// A submitted form field that can't be turned into a feature value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing field '{field}'")]
    MissingField { field: &'static str },

    #[error("could not convert '{value}' to a number for field '{field}'")]
    NotNumeric { field: &'static str, value: String },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field } | ValidationError::NotNumeric { field, .. } => {
                *field
            }
        }
    }
}

/// The underlying model call failed.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("ONNX Runtime error: {0}")]
    OrtError(#[from] ort::Error),

    #[error("Shape error: {0}")]
    ShapeError(#[from] ShapeError),

    #[error("Input X contains NaN, infinity or a value too large for the model at '{field}'")]
    NonFiniteInput { field: &'static str },

    #[error("Unexpected model output: {0}")]
    UnexpectedOutput(String),

    #[error("Model does not provide class probabilities")]
    ProbabilityUnsupported,

    #[error("Model session lock poisoned")]
    Poisoned,

    #[error("Inference task failed: {0}")]
    TaskFailed(String),
}

/// Everything that can stop `/result` from producing an assessment.
#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Model not loaded. Please upload the model artifact ({0})")]
    ModelUnavailable(String),

    #[error("Error during prediction: {0}")]
    Validation(#[from] ValidationError),

    #[error("Error during prediction: {0}")]
    Inference(#[from] InferenceError),
}

impl PredictionError {
    /// Short tag used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::ModelUnavailable(_) => "model_unavailable",
            PredictionError::Validation(_) => "validation",
            PredictionError::Inference(_) => "inference",
        }
    }

    /// The form field at fault, when there is one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            PredictionError::Validation(e) => Some(e.field()),
            PredictionError::Inference(InferenceError::NonFiniteInput { field }) => Some(*field),
            _ => None,
        }
    }
}

impl IntoResponse for PredictionError {
    // Errors are shown on the result page; the status stays 200.
    fn into_response(self) -> Response {
        let view = ResultView::from_error(&self);
        (StatusCode::OK, Html(pages::result_page(&view))).into_response()
    }
}
