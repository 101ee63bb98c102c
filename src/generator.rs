use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use crate::api_types::{
    ApiContent, ApiGenerateRequest, ApiGenerateResponse, ApiGoogleSearch, ApiPart, ApiTool,
    GroundingChunk,
};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisGenerationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToolFlags {
    pub web_search: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub tools: ToolFlags,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeneratedResponse {
    pub text: String,
    pub grounding_chunks: Vec<GroundingChunk>,
}

/// The external text-generation service. Implementations do not retry.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GeneratedResponse, AnalysisGenerationError>;
}

pub struct GeminiClient {
    http: Client,
    api_base: String,
    api_key: String,
}

impl GeminiClient {
    pub fn from_config(cfg: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let api_key = cfg.credential()?.to_string();
        let http = Client::builder()
            .build()
            .map_err(|e| AnalysisError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self {
            http,
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.api_base, model)
    }
}

pub fn build_api_request(request: &GenerateRequest) -> ApiGenerateRequest {
    let tools = if request.tools.web_search {
        vec![ApiTool {
            google_search: ApiGoogleSearch::default(),
        }]
    } else {
        Vec::new()
    };
    ApiGenerateRequest {
        contents: vec![ApiContent {
            role: Some("user".to_string()),
            parts: vec![ApiPart {
                text: Some(request.prompt.clone()),
            }],
        }],
        tools,
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GeneratedResponse, AnalysisGenerationError> {
        let start = std::time::Instant::now();
        let url = self.endpoint(&request.model);

        debug!(
            "Generator call starting - model={}, prompt_length={} chars, web_search={}",
            request.model,
            request.prompt.len(),
            request.tools.web_search
        );

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_api_request(request))
            .send()
            .await
            .map_err(|e| AnalysisGenerationError::Transport(format!("Request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AnalysisGenerationError::Transport(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(300).collect::<String>()
            )));
        }

        let api: ApiGenerateResponse = resp.json().await.map_err(|e| {
            AnalysisGenerationError::Transport(format!("Decoding generator envelope: {}", e))
        })?;

        let out = GeneratedResponse {
            text: api.text(),
            grounding_chunks: api.grounding_chunks(),
        };

        info!(
            "Generator call completed - duration={:.2}s, response_length={} chars, grounding_chunks={}",
            start.elapsed().as_secs_f32(),
            out.text.len(),
            out.grounding_chunks.len()
        );

        Ok(out)
    }
}
