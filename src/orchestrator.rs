use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, AnalysisGenerationError};
use crate::extract::extract_or_empty;
use crate::generator::{GenerateRequest, Generator, ToolFlags};
use crate::models::AnalysisReport;
use crate::normalize::normalize;
use crate::prompts::{build_prompt, Lang};
use crate::sources::{dedupe, dedupe_sources};

/// Prompt → generator → extract → normalize → merge sources.
///
/// Holds no mutable state; concurrent `request_analysis` calls are
/// independent. Dropping the returned future cancels the generator call.
pub struct Pipeline<G: Generator> {
    config: AnalysisConfig,
    generator: G,
}

impl<G: Generator> Pipeline<G> {
    pub fn new(config: AnalysisConfig, generator: G) -> Self {
        Self { config, generator }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub async fn request_analysis(
        &self,
        user_context: &str,
        lang: Lang,
    ) -> Result<AnalysisReport, AnalysisError> {
        let pipeline_start = std::time::Instant::now();
        self.config.credential()?;

        info!(
            "Analysis started - lang={}, model={}, context_length={} chars",
            lang,
            self.config.model,
            user_context.len()
        );

        // 1) prompt
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: build_prompt(user_context, lang),
            tools: ToolFlags {
                web_search: self.config.web_search,
            },
        };
        debug!("Prompt built - length={} chars", request.prompt.len());

        // 2) generator (only suspension point)
        let timeout_secs = self.config.timeout_secs;
        let generated = tokio::time::timeout(
            Duration::from_secs(timeout_secs),
            self.generator.generate(&request),
        )
        .await
        .map_err(|_| {
            warn!("Generator timed out - after={}s", timeout_secs);
            AnalysisGenerationError::TimedOut(timeout_secs)
        })??;

        // 3) extract
        let candidate = extract_or_empty(&generated.text);
        debug!(
            "Candidate extracted - candidate_length={}, response_length={}",
            candidate.len(),
            generated.text.len()
        );

        // 4) normalize
        let report = normalize(candidate).map_err(|e| {
            warn!(
                "Analysis generation failed - error={}, response_preview={:?}",
                e,
                generated.text.chars().take(200).collect::<String>()
            );
            e
        })?;

        // 5) grounded citations first, then any the payload carried
        let grounded = dedupe(&generated.grounding_chunks);
        let report = AnalysisReport {
            sources: dedupe_sources(grounded.into_iter().chain(report.sources)),
            ..report
        };

        info!(
            "Analysis completed - duration={:.2}s, total_score={:.2}, risk_level={}, timeline={}, sources={}",
            pipeline_start.elapsed().as_secs_f32(),
            report.conflict_index.total_score,
            report.conflict_index.risk_level.as_str(),
            report.timeline.len(),
            report.sources.len()
        );
        if report.is_no_data() {
            warn!("Analysis produced no data beyond defaults");
        }

        Ok(report)
    }
}
