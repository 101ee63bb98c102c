//! Composite conflict-risk scoring.
//!
//! The weights and the level thresholds live here and nowhere else; the
//! renderer asks `RiskLevel` for its tier instead of comparing scores itself.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RiskIndices {
    pub taiwan_strait: f64,     // I_TS
    pub east_china_sea: f64,    // I_ECS
    pub sino_us_relation: f64,  // I_SUR
    pub internal_politics: f64, // I_IPS
    pub third_party: f64,       // I_TPI
}

#[derive(Debug, Clone, Copy)]
pub struct RiskWeights {
    pub taiwan_strait: f64,     // 0.35
    pub east_china_sea: f64,    // 0.20
    pub sino_us_relation: f64,  // 0.15
    pub internal_politics: f64, // 0.15
    pub third_party: f64,       // 0.15
}

pub const WEIGHTS: RiskWeights = RiskWeights {
    taiwan_strait: 0.35,
    east_china_sea: 0.20,
    sino_us_relation: 0.15,
    internal_politics: 0.15,
    third_party: 0.15,
};

pub const INDEX_MIN: f64 = 0.0;
pub const INDEX_MAX: f64 = 10.0;
pub const BASE_MULTIPLIER: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Inclusive lower bounds, highest first.
    pub const THRESHOLDS: [(f64, RiskLevel); 3] = [
        (8.0, RiskLevel::Critical),
        (6.0, RiskLevel::High),
        (4.0, RiskLevel::Medium),
    ];

    pub fn classify(total: f64) -> RiskLevel {
        Self::THRESHOLDS
            .iter()
            .find(|(floor, _)| total >= *floor)
            .map(|(_, level)| *level)
            .unwrap_or(RiskLevel::Low)
    }

    /// Parse a generator-supplied label; anything unrecognised is `Low`.
    pub fn parse_lenient(raw: &str) -> RiskLevel {
        match raw.trim().to_ascii_uppercase().as_str() {
            "CRITICAL" => RiskLevel::Critical,
            "HIGH" => RiskLevel::High,
            "MEDIUM" => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }

    /// Display tier for presentation layers (red / orange / yellow / green).
    pub fn tier_marker(&self) -> &'static str {
        match self {
            RiskLevel::Critical => "🔴",
            RiskLevel::High => "🟠",
            RiskLevel::Medium => "🟡",
            RiskLevel::Low => "🟢",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskScore {
    pub total_score: f64,
    pub risk_level: RiskLevel,
}

pub fn clamp_index(v: f64) -> f64 {
    if v.is_nan() {
        return INDEX_MIN;
    }
    v.clamp(INDEX_MIN, INDEX_MAX)
}

pub fn clamp_multiplier(v: f64) -> f64 {
    if v.is_finite() && v >= BASE_MULTIPLIER {
        v
    } else {
        BASE_MULTIPLIER
    }
}

pub fn base_score(idx: &RiskIndices, w: RiskWeights) -> f64 {
    w.taiwan_strait * clamp_index(idx.taiwan_strait)
        + w.east_china_sea * clamp_index(idx.east_china_sea)
        + w.sino_us_relation * clamp_index(idx.sino_us_relation)
        + w.internal_politics * clamp_index(idx.internal_politics)
        + w.third_party * clamp_index(idx.third_party)
}

/// `total = (0.35*TS + 0.20*ECS + 0.15*SUR + 0.15*IPS + 0.15*TPI) * M`
///
/// The total is recorded and classified unrounded; presenters format it.
pub fn score(indices: &RiskIndices, multiplier: f64) -> RiskScore {
    let total_score = base_score(indices, WEIGHTS) * clamp_multiplier(multiplier);
    RiskScore {
        total_score,
        risk_level: RiskLevel::classify(total_score),
    }
}
