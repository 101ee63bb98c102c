//! Maps a loosely-typed generator payload onto `AnalysisReport`.
//!
//! Every field has a safe default: missing or mistyped strings become `""`,
//! arrays become empty, numbers become 0 and are clamped into range, enums fall
//! back to a known bucket. The only hard failures are a candidate that is not
//! JSON at all and one that is empty or decodes to `{}`.

use scraper::{ElementRef, Html, Node};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::AnalysisGenerationError;
use crate::models::{
    AnalysisReport, EventCategory, RiskIndexData, RiskMultiplier, Source, TimelineEvent,
};
use crate::risk::{self, RiskIndices, RiskLevel};
use crate::sources::{dedupe_sources, title_or_placeholder};

/// Top-level keys of the report object.
pub const REPORT_KEYS: [&str; 9] = [
    "timeline",
    "conflictIndex",
    "impulseAnalysis",
    "impulseProbability",
    "strategicAnalysis",
    "futurePrediction",
    "surpriseAttackAnalysis",
    "potentialTargets",
    "sources",
];

/// Tags narrative fields may carry; everything else is stripped.
pub const ALLOWED_TAGS: [&str; 5] = ["p", "ul", "li", "strong", "h3"];

/// Elements dropped together with their content.
const DROPPED_TAGS: [&str; 6] = ["script", "style", "template", "noscript", "iframe", "textarea"];

const PROBABILITY_MAX: f64 = 100.0;

pub fn normalize(candidate: &str) -> Result<AnalysisReport, AnalysisGenerationError> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        warn!("Normalization failed - empty candidate");
        return Err(AnalysisGenerationError::EmptyPayload);
    }

    let value: Value = serde_json::from_str(trimmed).map_err(|e| {
        warn!("Normalization failed - decode error: {}", e);
        AnalysisGenerationError::Malformed(e.to_string())
    })?;

    let empty = Map::new();
    let obj = match &value {
        Value::Object(map) if map.is_empty() => {
            warn!("Normalization failed - candidate decoded to an empty object");
            return Err(AnalysisGenerationError::EmptyPayload);
        }
        Value::Object(map) => map,
        other => {
            warn!("Top-level value is not an object - kind={}, defaulting all fields", json_kind(other));
            &empty
        }
    };

    let present = REPORT_KEYS.iter().filter(|k| obj.contains_key(**k)).count();
    if present == 0 {
        warn!("No report fields in payload - keys={}, defaulting all fields", obj.len());
    } else {
        debug!("Normalizing payload - report_fields={}/{}", present, REPORT_KEYS.len());
    }

    Ok(normalize_object(obj))
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Infallible field-by-field normalization.
pub fn normalize_object(obj: &Map<String, Value>) -> AnalysisReport {
    AnalysisReport {
        timeline: timeline(obj.get("timeline")),
        conflict_index: conflict_index(obj.get("conflictIndex")),
        impulse_analysis: markup(obj.get("impulseAnalysis")),
        impulse_probability: probability(obj.get("impulseProbability")),
        strategic_analysis: markup(obj.get("strategicAnalysis")),
        future_prediction: markup(obj.get("futurePrediction")),
        surprise_attack_analysis: markup(obj.get("surpriseAttackAnalysis")),
        potential_targets: strings(obj.get("potentialTargets")),
        sources: sources(obj.get("sources")),
    }
}

fn text(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn markup(v: Option<&Value>) -> String {
    restrict_markup(&text(v))
}

/// Accepts JSON numbers and numeric strings.
fn number(v: Option<&Value>) -> Option<f64> {
    let n = match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn array(v: Option<&Value>) -> &[Value] {
    match v {
        Some(Value::Array(items)) => items,
        _ => &[],
    }
}

fn strings(v: Option<&Value>) -> Vec<String> {
    array(v)
        .iter()
        .filter_map(|x| x.as_str().map(str::to_string))
        .collect()
}

fn markup_strings(v: Option<&Value>) -> Vec<String> {
    array(v)
        .iter()
        .filter_map(Value::as_str)
        .map(restrict_markup)
        .collect()
}

fn probability(v: Option<&Value>) -> u8 {
    number(v)
        .map(|p| p.round().clamp(0.0, PROBABILITY_MAX) as u8)
        .unwrap_or(0)
}

fn timeline(v: Option<&Value>) -> Vec<TimelineEvent> {
    let items = array(v);
    let events: Vec<TimelineEvent> = items
        .iter()
        .filter_map(Value::as_object)
        .map(|e| {
            let raw_category = text(e.get("category"));
            let category = EventCategory::parse(&raw_category).unwrap_or_else(|| {
                debug!("Timeline category coerced - raw={:?}, to=OTHER", raw_category);
                EventCategory::Other
            });
            TimelineEvent {
                date: text(e.get("date")),
                title: text(e.get("title")),
                summary: text(e.get("summary")),
                category,
            }
        })
        .collect();
    if events.len() != items.len() {
        debug!(
            "Timeline entries dropped - received={}, kept={}",
            items.len(),
            events.len()
        );
    }
    events
}

fn indices(v: Option<&Value>) -> RiskIndices {
    let get = |key: &str| {
        let idx = v.and_then(Value::as_object).and_then(|o| o.get(key));
        risk::clamp_index(number(idx).unwrap_or(0.0))
    };
    RiskIndices {
        taiwan_strait: get("taiwanStrait"),
        east_china_sea: get("eastChinaSea"),
        sino_us_relation: get("sinoUsRelation"),
        internal_politics: get("internalPolitics"),
        third_party: get("thirdParty"),
    }
}

fn conflict_index(v: Option<&Value>) -> RiskIndexData {
    let Some(ci) = v.and_then(Value::as_object) else {
        debug!("conflictIndex absent - synthesizing zeroed index");
        return RiskIndexData::default();
    };

    let indices = indices(ci.get("indices"));
    let mult = ci.get("riskMultiplier").and_then(Value::as_object);
    let value = risk::clamp_multiplier(
        number(mult.and_then(|m| m.get("value"))).unwrap_or(risk::BASE_MULTIPLIER),
    );
    let mut reason = text(mult.and_then(|m| m.get("reason")));

    let scored = risk::score(&indices, value);

    // The generator's own aggregate is advisory only.
    let advisory = number(ci.get("totalScore"));
    if let Some(reported) = advisory {
        if (reported - scored.total_score).abs() > 0.01 {
            debug!(
                "Generator total overridden - reported={:.2}, computed={:.2}",
                reported, scored.total_score
            );
            if reason.is_empty() {
                reason = format!("Generator-reported total: {}", reported);
            }
        }
    }
    if let Some(level) = ci.get("riskLevel").and_then(Value::as_str) {
        if RiskLevel::parse_lenient(level) != scored.risk_level {
            debug!(
                "Generator risk level overridden - reported={}, computed={}",
                level,
                scored.risk_level.as_str()
            );
        }
    }

    RiskIndexData {
        total_score: scored.total_score,
        risk_level: scored.risk_level,
        risk_multiplier: RiskMultiplier { value, reason },
        indices,
        drivers: markup_strings(ci.get("drivers")),
        mitigators: markup_strings(ci.get("mitigators")),
    }
}

fn sources(v: Option<&Value>) -> Vec<Source> {
    dedupe_sources(array(v).iter().filter_map(Value::as_object).map(|s| Source {
        title: title_or_placeholder(s.get("title").and_then(Value::as_str)),
        uri: text(s.get("uri")).trim().to_string(),
    }))
}

/// Keep `<p> <ul> <li> <strong> <h3>` without attributes, unwrap every other
/// element to its text, and drop script-like elements with their content.
///
/// Works on the parsed fragment rather than the raw string, so tag-looking
/// text left behind by a removed element is escaped and never re-forms a tag.
/// The output reparses to the same tree, which keeps the pass idempotent.
pub fn restrict_markup(html: &str) -> String {
    if !html.contains(&['<', '>', '&'][..]) {
        return html.to_string();
    }
    let fragment = Html::parse_fragment(html);
    let mut out = String::with_capacity(html.len());
    write_allowed(fragment.root_element(), &mut out);
    out
}

fn write_allowed(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => push_escaped(out, text),
            Node::Element(e) => {
                let name = e.name();
                if DROPPED_TAGS.contains(&name) {
                    continue;
                }
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                if ALLOWED_TAGS.contains(&name) {
                    out.push_str(&format!("<{}>", name));
                    write_allowed(child_el, out);
                    out.push_str(&format!("</{}>", name));
                } else {
                    write_allowed(child_el, out);
                }
            }
            _ => {}
        }
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn well_formed() -> Value {
        json!({
            "timeline": [
                {"date": "2025-11-02", "title": "Radar lock-on", "summary": "JMSDF reports lock-on", "category": "MILITARY"},
                {"date": "2025-11-05", "title": "Envoy recalled", "summary": "Beijing recalls envoy", "category": "DIPLOMATIC"}
            ],
            "conflictIndex": {
                "totalScore": 6.65,
                "riskLevel": "HIGH",
                "riskMultiplier": {"value": 1.4, "reason": "<p>Reconsider-travel advisory active</p>"},
                "indices": {
                    "taiwanStrait": 5.0,
                    "eastChinaSea": 5.0,
                    "sinoUsRelation": 4.0,
                    "internalPolitics": 4.0,
                    "thirdParty": 3.0
                },
                "drivers": ["<p>Coast guard incursions</p>"],
                "mitigators": ["<p>Hotline restored</p>"]
            },
            "impulseAnalysis": "<p>Leadership is <strong>rational</strong>.</p>",
            "impulseProbability": 15,
            "strategicAnalysis": "<ul><li>Build-up continues</li></ul>",
            "futurePrediction": "<p>Stable</p>",
            "surpriseAttackAnalysis": "<h3>Feasibility Analysis</h3><p>Low</p>",
            "potentialTargets": ["Yonaguni", "Senkaku"]
        })
    }

    fn run(v: &Value) -> AnalysisReport {
        normalize(&v.to_string()).unwrap()
    }

    #[test]
    fn test_well_formed_round_trip() {
        let input = well_formed();
        let report = run(&input);
        // base = 1.75 + 1.0 + 0.6 + 0.6 + 0.45 = 4.4; * 1.4 = 6.16
        assert_eq!(report.conflict_index.total_score, 6.16);
        assert_eq!(report.conflict_index.risk_level, RiskLevel::High);

        let mut expected = input.clone();
        expected["conflictIndex"]["totalScore"] = json!(6.16);
        assert_eq!(serde_json::to_value(&report).unwrap(), expected);
    }

    #[test]
    fn test_normalizing_normalized_report_is_noop() {
        let once = run(&well_formed());
        let twice = normalize(&serde_json::to_string(&once).unwrap()).unwrap();
        assert_eq!(once, twice);

        let defaulted = run(&json!({"timeline": "nope"}));
        let again = normalize(&serde_json::to_string(&defaulted).unwrap()).unwrap();
        assert_eq!(defaulted, again);
    }

    #[test]
    fn test_ranges_are_clamped() {
        let report = run(&json!({
            "impulseProbability": 250,
            "conflictIndex": {"indices": {"taiwanStrait": 14, "eastChinaSea": -2, "thirdParty": "7.5"}}
        }));
        assert_eq!(report.impulse_probability, 100);
        let idx = report.conflict_index.indices;
        assert_eq!(idx.taiwan_strait, 10.0);
        assert_eq!(idx.east_china_sea, 0.0);
        assert_eq!(idx.third_party, 7.5);
        assert_eq!(idx.sino_us_relation, 0.0);

        let report = run(&json!({"impulseProbability": -5}));
        assert_eq!(report.impulse_probability, 0);
        let report = run(&json!({"impulseProbability": "likely"}));
        assert_eq!(report.impulse_probability, 0);
        let report = run(&json!({"impulseProbability": 42.6}));
        assert_eq!(report.impulse_probability, 43);
    }

    #[test]
    fn test_wrong_types_default() {
        let report = run(&json!({
            "timeline": {"not": "an array"},
            "impulseAnalysis": 12,
            "potentialTargets": ["ok", 3, null, "also ok"],
            "conflictIndex": {"drivers": "x", "riskMultiplier": "high"}
        }));
        assert!(report.timeline.is_empty());
        assert_eq!(report.impulse_analysis, "");
        assert_eq!(report.potential_targets, vec!["ok", "also ok"]);
        assert!(report.conflict_index.drivers.is_empty());
        assert_eq!(report.conflict_index.risk_multiplier.value, 1.0);
    }

    #[test]
    fn test_unknown_category_coerced() {
        let report = run(&json!({
            "timeline": [
                {"date": "2025-01-01", "title": "t", "summary": "s", "category": "ECONOMIC"},
                {"title": "no category"},
                "garbage"
            ]
        }));
        assert_eq!(report.timeline.len(), 2);
        assert_eq!(report.timeline[0].category, EventCategory::Other);
        assert_eq!(report.timeline[1].category, EventCategory::Other);
        assert_eq!(report.timeline[1].date, "");
    }

    #[test]
    fn test_missing_conflict_index_is_zeroed() {
        let report = run(&json!({"futurePrediction": "<p>narrative only</p>"}));
        assert_eq!(report.conflict_index, RiskIndexData::default());
        assert_eq!(report.conflict_index.risk_level, RiskLevel::Low);
        assert_eq!(report.conflict_index.risk_multiplier.value, 1.0);
    }

    #[test]
    fn test_generator_score_not_trusted() {
        let report = run(&json!({
            "conflictIndex": {
                "totalScore": 9.9,
                "riskLevel": "CRITICAL",
                "riskMultiplier": {"value": 0.5},
                "indices": {"taiwanStrait": 2, "eastChinaSea": 2, "sinoUsRelation": 2, "internalPolitics": 2, "thirdParty": 2}
            }
        }));
        let ci = report.conflict_index;
        assert_eq!(ci.total_score, 2.0);
        assert_eq!(ci.risk_level, RiskLevel::Low);
        assert_eq!(ci.risk_multiplier.value, 1.0);
        assert_eq!(ci.risk_multiplier.reason, "Generator-reported total: 9.9");
    }

    #[test]
    fn test_advisory_does_not_override_reason() {
        let report = run(&json!({
            "conflictIndex": {"totalScore": 9.9, "riskMultiplier": {"value": 1.2, "reason": "US advisory"}}
        }));
        assert_eq!(report.conflict_index.risk_multiplier.reason, "US advisory");
    }

    #[test]
    fn test_empty_object_is_generation_error() {
        assert_eq!(normalize("{}"), Err(AnalysisGenerationError::EmptyPayload));
        assert_eq!(normalize(" { } "), Err(AnalysisGenerationError::EmptyPayload));
        assert_eq!(normalize("  "), Err(AnalysisGenerationError::EmptyPayload));
    }

    #[test]
    fn test_unrecognised_payload_is_defaulted_report() {
        let report = normalize(r#"{"analysis": "x"}"#).unwrap();
        assert_eq!(report, AnalysisReport::default());
        assert!(report.is_no_data());

        let report = normalize("[1, 2]").unwrap();
        assert_eq!(report, AnalysisReport::default());
    }

    #[test]
    fn test_undecodable_is_malformed() {
        assert!(matches!(
            normalize("{timeline: oops}"),
            Err(AnalysisGenerationError::Malformed(_))
        ));
    }

    #[test]
    fn test_payload_sources_deduped() {
        let report = run(&json!({
            "sources": [
                {"title": "A", "uri": "https://a.example"},
                {"title": "A again", "uri": "https://a.example"},
                {"uri": "https://b.example"},
                {"title": "no uri"}
            ]
        }));
        assert_eq!(report.sources.len(), 2);
        assert_eq!(report.sources[0].title, "A");
        assert_eq!(report.sources[1].title, "Reference Source");
    }

    #[test]
    fn test_restrict_markup() {
        assert_eq!(restrict_markup("plain text"), "plain text");
        assert_eq!(
            restrict_markup("<p class=\"x\">Hi <em>there</em></p>"),
            "<p>Hi there</p>"
        );
        assert_eq!(
            restrict_markup("<H3>Title</H3><script>alert(1)</script><ul><li>a</li></ul>"),
            "<h3>Title</h3><ul><li>a</li></ul>"
        );
        assert_eq!(
            restrict_markup("<strong>x</strong><br/><a href=\"u\">link</a>"),
            "<strong>x</strong>link"
        );
        assert_eq!(restrict_markup("AT&T <p>5 > 3</p>"), "AT&amp;T <p>5 &gt; 3</p>");
    }

    #[test]
    fn test_split_tags_do_not_reassemble() {
        let out = restrict_markup(
            "<<x>script>alert(1)<<x>/script><<b>img src=x onerror=alert(2)>",
        );
        assert!(!out.contains('<'), "unexpected markup in {:?}", out);
        assert!(!out.to_ascii_lowercase().contains("<script"));
        assert_eq!(restrict_markup(&out), out);

        let out = restrict_markup("<<i>em>x");
        assert_eq!(out, "&lt;em&gt;x");
        assert_eq!(restrict_markup(&out), out);
    }

    #[test]
    fn test_nested_disallowed_markup() {
        assert_eq!(
            restrict_markup("<div><p>a <span><em>b</em></span></p><iframe>hidden</iframe></div>"),
            "<p>a b</p>"
        );
        assert_eq!(
            restrict_markup("<ul><li><a href=\"javascript:x\">go</a></li></ul><style>p{}</style>"),
            "<ul><li>go</li></ul>"
        );
    }

    #[test]
    fn test_adversarial_markup_renormalizes_unchanged() {
        let once = run(&json!({
            "impulseAnalysis": "<<i>em>x",
            "strategicAnalysis": "<p onclick=\"x()\">a<<b>script>b</p>",
            "futurePrediction": "<p>unclosed <strong>bold",
            "conflictIndex": {"drivers": ["<<x>img src=x>", "<li>stray</li>"]}
        }));
        let twice = normalize(&serde_json::to_string(&once).unwrap()).unwrap();
        assert_eq!(once, twice);
        assert!(!once.strategic_analysis.contains("onclick"));
        assert!(!once.strategic_analysis.contains("<script"));
    }
}
