use std::path::Path;
use std::sync::Arc;

use crate::config::ModelConfig;
use crate::error::LoadError;
use crate::model::{linear::LinearModel, onnx::OnnxClassifier, LoadedModel, RiskModel};

/// Names the ONNX Runtime environment. Sessions fall back to the default
/// environment when this fails, so the outcome is only logged.
pub fn init_ort() {
    if let Err(e) = ort::init().with_name("heartrisk").commit() {
        tracing::warn!(error = %e, "could not configure ONNX Runtime environment");
    }
}

/// Loads the artifact at `config.path`, picking the backend from the file
/// extension (`.onnx` or `.json`).
pub fn load_model(config: &ModelConfig) -> Result<LoadedModel, LoadError> {
    let path = Path::new(&config.path);
    if !path.exists() {
        return Err(LoadError::ModelNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let model: Arc<dyn RiskModel> = match extension.as_deref() {
        Some("onnx") => {
            init_ort();
            Arc::new(OnnxClassifier::load(path, config.intra_threads)?)
        }
        Some("json") => {
            let content = std::fs::read_to_string(path)?;
            Arc::new(LinearModel::from_json(&content)?)
        }
        _ => return Err(LoadError::UnsupportedFormat(path.display().to_string())),
    };

    let loaded = LoadedModel::new(model);
    tracing::info!(
        path = %path.display(),
        kind = loaded.kind(),
        probability = loaded.has_probability(),
        "model loaded"
    );
    Ok(loaded)
}
