pub mod config;
pub mod error;
pub mod features;
pub mod inference;
pub mod model;
pub mod server;
pub mod telemetry;


// Re-export common types
pub use error::{InferenceError, LoadError, PredictionError, ValidationError};
pub use features::{FeatureVector, FEATURES};
pub use model::{LoadedModel, RiskModel};
