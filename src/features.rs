//! The fixed clinical feature set and its parsing from form input.
//!
//! Order matters: it must be the column order the model was trained on.

use ndarray::Array2;

use crate::error::{InferenceError, ValidationError};

pub const FEATURE_COUNT: usize = 14;

/// Static metadata for one model input.
///
/// `min`, `max` and `step` are rendered as HTML input hints only; the
/// server never checks submitted values against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub label: &'static str,
    pub min: Option<&'static str>,
    pub max: Option<&'static str>,
    pub step: Option<&'static str>,
}

const fn flag(name: &'static str, description: &'static str, label: &'static str) -> FeatureSpec {
    FeatureSpec {
        name,
        description,
        label,
        min: Some("0"),
        max: Some("1"),
        step: None,
    }
}

const fn count(name: &'static str, description: &'static str, label: &'static str) -> FeatureSpec {
    FeatureSpec {
        name,
        description,
        label,
        min: Some("0"),
        max: None,
        step: None,
    }
}

pub const FEATURES: [FeatureSpec; FEATURE_COUNT] = [
    flag("male", "Sex: 1 = male, 0 = female", "Sex (1=male,0=female)"),
    count("age", "Age in years", "Age"),
    flag(
        "currentSmoker",
        "Currently smoking? 1 = yes, 0 = no",
        "Current Smoker (1=yes,0=no)",
    ),
    count("cigsPerDay", "Average cigarettes per day", "Cigarettes per Day"),
    flag("BPMeds", "On BP meds? 1 = yes, 0 = no", "BP Meds (1=yes,0=no)"),
    flag(
        "prevalentStroke",
        "History of stroke? 1 = yes, 0 = no",
        "Stroke History (1=yes,0=no)",
    ),
    flag(
        "prevalentHyp",
        "History of hypertension? 1 = yes, 0 = no",
        "Hypertension (1=yes,0=no)",
    ),
    flag("diabetes", "Diabetes? 1 = yes, 0 = no", "Diabetes (1=yes,0=no)"),
    count("totChol", "Total cholesterol (mg/dL)", "Total Cholesterol (mg/dL)"),
    count("sysBP", "Systolic BP (mm Hg)", "Systolic BP (mm Hg)"),
    count("diaBP", "Diastolic BP (mm Hg)", "Diastolic BP (mm Hg)"),
    FeatureSpec {
        name: "BMI",
        description: "Body Mass Index (kg/m²)",
        label: "Body Mass Index (kg/m²)",
        min: None,
        max: None,
        step: Some("0.1"),
    },
    count("heartRate", "Heart rate (bpm)", "Heart Rate (bpm)"),
    count("glucose", "Glucose (mg/dL)", "Glucose (mg/dL)"),
];

pub const EDUCATION_NOTE: &str =
    "The 'education' column was dropped as it added little predictive power.";

pub fn feature_names() -> impl Iterator<Item = &'static str> {
    FEATURES.iter().map(|f| f.name)
}

/// One request's inputs, in `FEATURES` order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

/// Form fields in submission order. Repeated keys keep every value.
pub type FormFields = Vec<(String, String)>;

/// Index of the first value that isn't finite.
fn first_non_finite<T: Copy + Into<f64>>(values: &[T]) -> Option<usize> {
    values.iter().position(|&v| !v.into().is_finite())
}

fn non_finite(index: usize) -> InferenceError {
    InferenceError::NonFiniteInput {
        field: FEATURES[index].name,
    }
}

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// Parses every feature from form fields, stopping at the first one that
    /// is missing or not a number. A repeated key uses its first value;
    /// unknown keys are ignored.
    pub fn from_form(form: &[(String, String)]) -> Result<Self, ValidationError> {
        let mut values = [0.0; FEATURE_COUNT];
        for (slot, name) in values.iter_mut().zip(feature_names()) {
            let raw = form
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value)
                .ok_or(ValidationError::MissingField { field: name })?;
            *slot = raw
                .trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::NotNumeric {
                    field: name,
                    value: raw.clone(),
                })?;
        }
        Ok(Self { values })
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURES
            .iter()
            .position(|f| f.name == name)
            .map(|i| self.values[i])
    }

    /// Models reject NaN and infinite inputs the way scikit-learn's input
    /// checks do; parsing accepts them.
    pub fn ensure_finite(&self) -> Result<(), InferenceError> {
        match first_non_finite(&self.values) {
            Some(i) => Err(non_finite(i)),
            None => Ok(()),
        }
    }

    /// Single-row `[1, FEATURE_COUNT]` float32 batch, the layout ONNX
    /// classifiers are exported with. Values that overflow `f32` are
    /// rejected rather than passed on as infinity.
    pub fn to_array(&self) -> Result<Array2<f32>, InferenceError> {
        let row: Vec<f32> = self.values.iter().map(|&v| v as f32).collect();
        if let Some(i) = first_non_finite(&row) {
            return Err(non_finite(i));
        }
        Ok(Array2::from_shape_vec((1, FEATURE_COUNT), row)?)
    }
}
