use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Zh,
    #[default]
    En,
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "cn" => Ok(Lang::Zh),
            "en" | "en-us" => Ok(Lang::En),
            other => Err(format!("unsupported language '{}', expected zh or en", other)),
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lang::Zh => "zh",
            Lang::En => "en",
        })
    }
}

pub fn language_instruction(lang: Lang) -> &'static str {
    match lang {
        Lang::Zh => "OUTPUT LANGUAGE: Simplified Chinese (简体中文). All analysis content, titles, summaries, and predictions MUST be written in Simplified Chinese.",
        Lang::En => "OUTPUT LANGUAGE: English. All analysis content, titles, summaries, and predictions MUST be written in English.",
    }
}

/// Full analyst instruction for one request. Pure: the same context and
/// language always give the same string.
pub fn build_prompt(user_context: &str, lang: Lang) -> String {
    format!(r#"# Role: Geopolitical Risk Analyst (SJM-CRI 2.0 Specialist)

## Core Objective
You are an expert analyst monitoring the risk of military conflict between China and Japan. Execute the SJM-CRI 2.0 (Sino-Japanese Military Conflict Risk Index) protocol.

## Context & Hypothesis
User Context: "{context}"

## Workflow
1. Data Acquisition. Search for:
   - Official travel advisories (US/CN/JP) in the last 30 days.
   - PLA and JSDF military movements (Taiwan Strait, East China Sea).
   - Political rhetoric from Tokyo and Beijing.
   - Third-party stances (EU/NATO/ASEAN).
2. Information Refinement. Cross-reference sources. Prefer official government statements and military logs over opinion pieces.
3. Dynamic Scoring (SJM-CRI 2.0). Use these STRICT weights.

   Formula:
   Base_Score = (0.35 * I_TS) + (0.20 * I_ECS) + (0.15 * I_SUR) + (0.15 * I_IPS) + (0.15 * I_TPI)
   Total_Risk = Base_Score * M

   Indices (each scored 0-10):
   - I_TS (Taiwan Strait Stability) [Weight 0.35]: military sorties, median line crossings, political confrontation over Taiwan.
   - I_ECS (East China Sea) [Weight 0.20]: coast guard incursions (Senkaku/Diaoyu), radar lock-ons, grey zone operations.
   - I_SUR (Sino-US Relations) [Weight 0.15]: high-level hotlines, sanctions, carrier strike group deployments.
   - I_IPS (Internal Politics) [Weight 0.15]: domestic economic pressure, nationalism, leadership survival needs.
   - I_TPI (Third Party Influence) [Weight 0.15]: statements and actions from the EU, NATO, G7 and ASEAN.

   M (Risk Multiplier):
   - Base: 1.0
   - +0.2: active "Reconsider Travel" or higher warning from CN or JP.
   - +0.5: US issues "Do Not Travel" or evacuates non-essential personnel.
   - +0.3: any direct physical casualty or warning shots fired.

## Output Requirements
{language}

Formatting:
- Use only the HTML tags <p>, <ul>, <li>, <strong> and <h3> in every narrative string field.
- Do NOT use Markdown or any other markup.
- Keep the tone objective, professional and intelligence-focused.

JSON Structure:
Return exactly ONE valid JSON object and nothing else, matching this structure:
{{
  "timeline": [
    {{ "date": "YYYY-MM-DD", "title": "Short Headline", "summary": "Concise event summary", "category": "DIPLOMATIC" | "MILITARY" | "PUBLIC_OPINION" }}
  ],
  "conflictIndex": {{
    "totalScore": 0.0,
    "riskLevel": "LOW" | "MEDIUM" | "HIGH" | "CRITICAL",
    "riskMultiplier": {{ "value": 1.0, "reason": "Explanation of multiplier" }},
    "indices": {{
      "taiwanStrait": 0.0,
      "eastChinaSea": 0.0,
      "sinoUsRelation": 0.0,
      "internalPolitics": 0.0,
      "thirdParty": 0.0
    }},
    "drivers": ["<p>Key driver 1...</p>", "<p>Key driver 2...</p>"],
    "mitigators": ["<p>Key mitigator 1...</p>", "<p>Key mitigator 2...</p>"]
  }},
  "impulseAnalysis": "<p>Analysis of leadership impulse vs rationality...</p>",
  "impulseProbability": 0,
  "strategicAnalysis": "<p>Confirmation of militarization intent...</p>",
  "futurePrediction": "<p>Prediction of conflict trajectory...</p>",
  "surpriseAttackAnalysis": "<h3>Feasibility Analysis</h3><p>...</p>",
  "potentialTargets": ["Target 1", "Target 2"]
}}

Constraints:
- totalScore is Total_Risk; every index is a number from 0 to 10.
- impulseProbability is an integer from 0 to 100."#,
        context = user_context,
        language = language_instruction(lang),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(
            build_prompt("Carrier group enters strait", Lang::En),
            build_prompt("Carrier group enters strait", Lang::En)
        );
    }

    #[test]
    fn test_context_embedded_verbatim() {
        let ctx = r#"What if "Takaichi" visits Yasukuni? {braces} <tags>"#;
        let prompt = build_prompt(ctx, Lang::En);
        assert!(prompt.contains(&format!("User Context: \"{}\"", ctx)));
    }

    #[test]
    fn test_language_directive_selected() {
        let zh = build_prompt("x", Lang::Zh);
        let en = build_prompt("x", Lang::En);
        assert!(zh.contains("Simplified Chinese"));
        assert!(!zh.contains("OUTPUT LANGUAGE: English"));
        assert!(en.contains("OUTPUT LANGUAGE: English"));
        assert_ne!(zh, en);
    }

    #[test]
    fn test_formula_and_schema_present() {
        let prompt = build_prompt("x", Lang::En);
        assert!(prompt.contains(
            "Base_Score = (0.35 * I_TS) + (0.20 * I_ECS) + (0.15 * I_SUR) + (0.15 * I_IPS) + (0.15 * I_TPI)"
        ));
        assert!(prompt.contains("Total_Risk = Base_Score * M"));
        assert!(prompt.contains("exactly ONE valid JSON object"));
        assert!(prompt.contains("\"conflictIndex\": {"));
        assert!(prompt.contains("<h3>"));
    }

    #[test]
    fn test_lang_from_str() {
        assert_eq!("ZH".parse::<Lang>(), Ok(Lang::Zh));
        assert_eq!("en".parse::<Lang>(), Ok(Lang::En));
        assert!("fr".parse::<Lang>().is_err());
        assert_eq!(Lang::Zh.to_string(), "zh");
    }
}
