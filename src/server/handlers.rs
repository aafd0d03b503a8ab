use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use std::sync::Arc;

use crate::error::{InferenceError, PredictionError};
use crate::features::{FeatureVector, FormFields};
use crate::inference::{self, Assessment};
use crate::server::{pages, types::*};

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn index() -> Html<String> {
    Html(pages::index_page())
}

pub async fn predict_form() -> Html<String> {
    Html(pages::predict_page())
}

pub async fn metrics_export(State(state): State<Arc<AppState>>) -> String {
    state.metrics.render()
}

/// Parses the form and runs the model off the async runtime.
pub async fn predict(
    state: &AppState,
    form: FormFields,
) -> Result<Assessment, PredictionError> {
    let model = state
        .model
        .clone()
        .ok_or_else(|| PredictionError::ModelUnavailable(state.model_path.clone()))?;
    let features = FeatureVector::from_form(&form)?;

    let assessment = tokio::task::spawn_blocking(move || inference::assess(&model, &features))
        .await
        .map_err(|e| InferenceError::TaskFailed(e.to_string()))??;
    Ok(assessment)
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json"))
}

pub async fn result(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    form: Result<Form<FormFields>, FormRejection>,
) -> Response {
    // A body that isn't urlencoded counts as a form with no fields, so the
    // user still gets a result page naming the first missing input.
    let form = match form {
        Ok(Form(fields)) => fields,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "form body rejected, treating as empty");
            FormFields::new()
        }
    };
    let outcome = predict(&state, form).await;

    match &outcome {
        Ok(assessment) => {
            metrics::counter!("predictions_total", "label" => assessment.label).increment(1);
            tracing::info!(
                prediction = assessment.prediction,
                probability = %assessment.probability,
                "prediction served"
            );
        }
        Err(error) => {
            metrics::counter!("prediction_errors_total", "kind" => error.kind()).increment(1);
            tracing::warn!(error = %error, field = error.field(), "prediction failed");
        }
    }

    if wants_json(&headers) {
        return Json(ResultView::from(&outcome)).into_response();
    }
    match outcome {
        Ok(assessment) => {
            Html(pages::result_page(&ResultView::from_assessment(&assessment))).into_response()
        }
        Err(error) => error.into_response(),
    }
}
