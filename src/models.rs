use serde::{Deserialize, Serialize};

use crate::risk::{RiskIndices, RiskLevel};

/// The normalized intelligence report handed to presentation layers.
///
/// Produced once per `request_analysis` call and returned by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub timeline: Vec<TimelineEvent>, // as received, not sorted
    pub conflict_index: RiskIndexData,
    pub impulse_analysis: String, // HTML fragment
    pub impulse_probability: u8,  // 0..=100
    pub strategic_analysis: String,
    pub future_prediction: String,
    pub surprise_attack_analysis: String,
    pub potential_targets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

impl AnalysisReport {
    /// True when nothing beyond defaults survived normalization.
    pub fn is_no_data(&self) -> bool {
        self.timeline.is_empty()
            && self.impulse_analysis.is_empty()
            && self.strategic_analysis.is_empty()
            && self.future_prediction.is_empty()
            && self.surprise_attack_analysis.is_empty()
            && self.potential_targets.is_empty()
            && self.conflict_index.total_score == 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: String, // "YYYY-MM-DD"
    pub title: String,
    pub summary: String,
    pub category: EventCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCategory {
    Diplomatic,
    Military,
    PublicOpinion,
    #[default]
    Other,
}

impl EventCategory {
    /// `None` for labels outside the known set.
    pub fn parse(raw: &str) -> Option<EventCategory> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "DIPLOMATIC" => Some(EventCategory::Diplomatic),
            "MILITARY" => Some(EventCategory::Military),
            "PUBLIC_OPINION" => Some(EventCategory::PublicOpinion),
            "OTHER" => Some(EventCategory::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskIndexData {
    pub total_score: f64,
    pub risk_level: RiskLevel,
    pub risk_multiplier: RiskMultiplier,
    pub indices: RiskIndices,
    pub drivers: Vec<String>,    // HTML fragments
    pub mitigators: Vec<String>, // HTML fragments
}

impl Default for RiskIndexData {
    fn default() -> Self {
        Self {
            total_score: 0.0,
            risk_level: RiskLevel::Low,
            risk_multiplier: RiskMultiplier::default(),
            indices: RiskIndices::default(),
            drivers: Vec::new(),
            mitigators: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMultiplier {
    pub value: f64, // >= 1.0
    pub reason: String,
}

impl Default for RiskMultiplier {
    fn default() -> Self {
        Self {
            value: crate::risk::BASE_MULTIPLIER,
            reason: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}
