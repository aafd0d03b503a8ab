use crate::model::LoadedModel;
use crate::server::{handlers, types::AppState};
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

pub fn create_router(
    model: Option<LoadedModel>,
    model_path: impl Into<String>,
    metrics: PrometheusHandle,
) -> Router {
    let state = Arc::new(AppState {
        model,
        model_path: model_path.into(),
        metrics,
    });

    Router::new()
        .route("/", get(handlers::index))
        .route("/predict", get(handlers::predict_form))
        .route("/result", post(handlers::result))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_export))
        .with_state(state)
}
