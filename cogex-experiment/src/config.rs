use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::trial::TrialDurations;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentConfig {
    /// Display time for animation frames that do not set their own
    pub default_duration_ms: u64,
    pub durations: TrialDurations,
    pub response_prompt: String,
    pub marker_labels: [String; 2],
    /// Content shown during synthetic wait stages
    pub blank_content: String,
    pub continue_label: String,
    /// Seed for randomized trial order; drawn from the OS when absent
    pub seed: Option<u64>,
    /// Directory that asset content references resolve against
    pub content_root: Option<PathBuf>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: 1000,
            durations: TrialDurations::default(),
            response_prompt: "Oikeampi sana oli?".to_string(),
            marker_labels: ["1".to_string(), "2".to_string()],
            blank_content: "empty".to_string(),
            continue_label: "next".to_string(),
            seed: None,
            content_root: None,
        }
    }
}

impl ExperimentConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}
