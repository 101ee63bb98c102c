//! Ingestion pipeline for generator-written conflict-risk reports.
//!
//! `Pipeline::request_analysis` builds the prompt, calls the `Generator`,
//! extracts the JSON object from its free-form reply, normalizes it against
//! the report schema, recomputes the composite risk score and merges
//! grounding citations.

pub mod api_types;
pub mod config;
pub mod error;
pub mod extract;
pub mod generator;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod prompts;
pub mod render;
pub mod risk;
pub mod sources;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, AnalysisGenerationError, ExtractionError};
pub use generator::{GeminiClient, GenerateRequest, GeneratedResponse, Generator, ToolFlags};
pub use models::{AnalysisReport, EventCategory, RiskIndexData, RiskMultiplier, Source, TimelineEvent};
pub use orchestrator::Pipeline;
pub use prompts::Lang;
pub use risk::{RiskIndices, RiskLevel, RiskScore};
