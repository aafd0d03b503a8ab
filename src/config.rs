use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const DEFAULT_MODEL_PATH: &str = "models/heart_disease.onnx";

#[derive(Deserialize, Clone, Debug, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub path: String,
    /// Abort startup when the artifact can't be loaded instead of serving
    /// an error page on every prediction.
    #[serde(default)]
    pub required: bool,
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            required: false,
            intra_threads: default_intra_threads(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    7860
}

fn default_model_path() -> String {
    DEFAULT_MODEL_PATH.to_string()
}

fn default_intra_threads() -> usize {
    1
}

impl AppConfig {
    /// Reads the YAML config at `path`, falling back to the built-in
    /// defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
