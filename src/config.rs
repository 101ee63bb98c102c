use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Settings for one pipeline; owned by whoever constructs the `Pipeline`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
    pub web_search: bool,
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            web_search: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AnalysisConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, AnalysisError> {
        serde_yaml::from_str(yaml)
            .map_err(|e| AnalysisError::Configuration(format!("Failed to parse config: {}", e)))
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, AnalysisError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::Configuration(format!("Failed to read config {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Overlay environment variables: `API_KEY` (or `GEMINI_API_KEY`),
    /// `FLASHPOINT_MODEL`, `FLASHPOINT_API_BASE`.
    pub fn with_env(self) -> Self {
        self.with_vars(|name| std::env::var(name).ok())
    }

    fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let present = |name: &str| var(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = present("API_KEY").or_else(|| present("GEMINI_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(model) = present("FLASHPOINT_MODEL") {
            self.model = model;
        }
        if let Some(base) = present("FLASHPOINT_API_BASE") {
            self.api_base = base;
        }
        self
    }

    /// The configured key, or a configuration error if absent or blank.
    pub fn credential(&self) -> Result<&str, AnalysisError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                AnalysisError::Configuration(
                    "API Key not found. Please set the API_KEY environment variable.".to_string(),
                )
            })
    }
}
