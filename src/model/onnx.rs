use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::tensor::TensorElementType;
use ort::value::Tensor;
use std::path::Path;
use std::sync::Mutex;

use crate::error::{InferenceError, LoadError};
use crate::features::FeatureVector;
use crate::model::RiskModel;

fn ort_error(e: impl Into<ort::Error>) -> LoadError {
    LoadError::OrtError(e.into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelType {
    Int64,
    Float32,
}

/// A classifier exported to ONNX with its label on output 0 and, optionally,
/// a `[batch, n_classes]` float probability tensor on output 1.
///
/// Exporters that wrap probabilities in a sequence of maps (skl2onnx's
/// default ZipMap) are loaded without the probability capability.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    label_type: LabelType,
    has_probability: bool,
}

impl OnnxClassifier {
    pub fn load(path: impl AsRef<Path>, intra_threads: usize) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let session = Session::builder()
            .map_err(ort_error)?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort_error)?
            .with_intra_threads(intra_threads.max(1))
            .map_err(ort_error)?
            .commit_from_file(path)
            .map_err(ort_error)?;

        for (i, input) in session.inputs.iter().enumerate() {
            tracing::debug!(index = i, name = %input.name, kind = ?input.input_type, "model input");
        }

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| LoadError::InvalidArtifact("model declares no inputs".to_string()))?;

        let label_type = match session.outputs.first().map(|o| o.output_type.tensor_type()) {
            Some(Some(TensorElementType::Int64)) => LabelType::Int64,
            Some(Some(TensorElementType::Float32)) => LabelType::Float32,
            Some(other) => {
                return Err(LoadError::InvalidArtifact(format!(
                    "label output must be an int64 or float32 tensor, got {:?}",
                    other
                )))
            }
            None => {
                return Err(LoadError::InvalidArtifact(
                    "model declares no outputs".to_string(),
                ))
            }
        };

        let has_probability = match session.outputs.get(1) {
            Some(output) if output.output_type.tensor_type() == Some(TensorElementType::Float32) => {
                true
            }
            Some(output) => {
                tracing::warn!(
                    name = %output.name,
                    "second output is not a float tensor, probabilities disabled"
                );
                false
            }
            None => false,
        };

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            label_type,
            has_probability,
        })
    }

    fn input_tensor(features: &FeatureVector) -> Result<Tensor<f32>, InferenceError> {
        Ok(Tensor::from_array(features.to_array()?)?)
    }
}

impl RiskModel for OnnxClassifier {
    fn classify(&self, features: &FeatureVector) -> Result<i64, InferenceError> {
        let input = Self::input_tensor(features)?;
        let mut session = self.session.lock().map_err(|_| InferenceError::Poisoned)?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => input])?;

        let label = match self.label_type {
            LabelType::Int64 => {
                let (_, data) = outputs[0].try_extract_tensor::<i64>()?;
                data.first().copied()
            }
            LabelType::Float32 => {
                let (_, data) = outputs[0].try_extract_tensor::<f32>()?;
                data.first().map(|&v| v.round() as i64)
            }
        };
        label.ok_or_else(|| InferenceError::UnexpectedOutput("label tensor is empty".to_string()))
    }

    fn supports_probability(&self) -> bool {
        self.has_probability
    }

    fn positive_probability(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        if !self.has_probability {
            return Err(InferenceError::ProbabilityUnsupported);
        }
        let input = Self::input_tensor(features)?;
        let mut session = self.session.lock().map_err(|_| InferenceError::Poisoned)?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => input])?;

        let (shape, data) = outputs[1].try_extract_tensor::<f32>()?;
        let dims: Vec<usize> = shape.iter().map(|&x| x as usize).collect();
        let probabilities = ndarray::ArrayViewD::from_shape(dims.as_slice(), data)?;
        // Column 1 of the first row is the positive class.
        let positive = match probabilities.ndim() {
            2 => probabilities.get(&[0, 1][..]).copied(),
            1 => probabilities.get(&[1][..]).copied(),
            _ => None,
        };
        positive.map(f64::from).ok_or_else(|| {
            InferenceError::UnexpectedOutput(format!(
                "probability tensor has shape {:?}, expected [1, 2]",
                dims
            ))
        })
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}
