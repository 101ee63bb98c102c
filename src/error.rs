//! Error types for the analysis pipeline
//!
//! Only two kinds cross the pipeline boundary:
//! - Configuration: missing or invalid credential, never retried
//! - Generation: the generator call or the decode of its output failed
//!
//! Field-level malformation is never an error; the normalizer defaults it.

use thiserror::Error;

/// No JSON-like span could be located in the generator text.
///
/// Internal and recoverable: the extractor substitutes `"{}"` and carries on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no JSON object found in generator response ({0} chars)")]
    NoJsonObject(usize),
}

/// Terminal failure to obtain a usable payload from the generator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisGenerationError {
    #[error("Failed to generate valid analysis data structure: response carried no report fields")]
    EmptyPayload,

    #[error("Failed to generate valid analysis data structure: {0}")]
    Malformed(String),

    #[error("Generator request failed: {0}")]
    Transport(String),

    #[error("Generator request timed out after {0} seconds")]
    TimedOut(u64),
}

/// Errors returned by `Pipeline::request_analysis`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Generation(#[from] AnalysisGenerationError),
}

impl AnalysisError {
    /// Returns true if retrying the same request can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, AnalysisError::Generation(_))
    }

    /// User-facing hint shown next to the retry affordance
    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AnalysisError::Configuration(_) => {
                "Set the API_KEY environment variable or add api_key to the config file."
            }
            AnalysisError::Generation(AnalysisGenerationError::TimedOut(_)) => {
                "The generator took too long. Retry, or raise timeout_secs."
            }
            AnalysisError::Generation(AnalysisGenerationError::Transport(_)) => {
                "The generator could not be reached. Check connectivity and retry."
            }
            AnalysisError::Generation(_) => {
                "The generator returned unusable output. Retry the analysis."
            }
        }
    }
}
