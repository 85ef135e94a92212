use compass_core::{CompassError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub mod env_substitution;

pub use env_substitution::substitute_env_vars;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompassConfig {
    #[serde(default)]
    pub assistant: AssistantSettings,
    #[serde(default)]
    pub answer_service: AnswerServiceSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub paths: PathSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantSettings {
    #[serde(default = "default_name")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerServiceSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Route the query is posted to, relative to `base_url`.
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Storage prefix hidden when citations are shown to the user.
    #[serde(default = "default_source_prefix")]
    pub source_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

impl CompassConfig {
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| CompassError::ConfigError(format!("Failed to read config file: {}", e)))?;

        debug!("Loaded configuration from {:?}", path.as_ref());
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let expanded = substitute_env_vars(yaml)?;

        let mut config: CompassConfig = serde_yaml::from_str(&expanded)
            .map_err(|e| CompassError::ConfigError(format!("Failed to parse YAML: {}", e)))?;

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("COMPASS_ANSWER_URL") {
            self.answer_service.base_url = url;
        }
        if let Ok(dir) = env::var("COMPASS_EXPORT_DIR") {
            self.paths.export_dir = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.assistant.name.trim().is_empty() {
            return Err(CompassError::ConfigError("Assistant name cannot be empty".into()));
        }
        let url = &self.answer_service.base_url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(CompassError::ConfigError(format!(
                "Answer service URL must start with http:// or https://, got '{}'",
                url
            )));
        }
        if self.answer_service.timeout_secs == 0 {
            return Err(CompassError::ConfigError("Timeout must be greater than zero".into()));
        }
        Ok(())
    }

    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".compass")
            .join("compass.yaml")
    }
}

impl AnswerServiceSettings {
    /// Full URL the query is posted to.
    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self { name: default_name() }
    }
}

impl Default for AnswerServiceSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            path: default_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            source_prefix: default_source_prefix(),
        }
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            export_dir: default_export_dir(),
        }
    }
}

fn default_name() -> String { "compass".to_string() }
fn default_base_url() -> String { "http://127.0.0.1:5000".to_string() }
fn default_path() -> String { "/".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_source_prefix() -> String { "data/".to_string() }
fn default_export_dir() -> PathBuf { PathBuf::from("./transcripts") }
