// src/render.rs
use chrono::NaiveDate;

use crate::models::{AnalysisReport, EventCategory, TimelineEvent};
use crate::prompts::Lang;
use crate::risk::WEIGHTS;

struct Labels {
    title: &'static str,
    no_data: &'static str,
    score: &'static str,
    multiplier: &'static str,
    indices: [&'static str; 5],
    drivers: &'static str,
    mitigators: &'static str,
    timeline: &'static str,
    motivation: &'static str,
    probability: &'static str,
    strategic: &'static str,
    prediction: &'static str,
    surprise: &'static str,
    targets: &'static str,
    sources: &'static str,
}

const EN: Labels = Labels {
    title: "SJM-CRI 2.0 Risk Index",
    no_data: "_No data: the generator returned no usable analysis. Scores below are defaults._",
    score: "Composite Risk Score",
    multiplier: "Risk Multiplier",
    indices: [
        "Taiwan Strait",
        "East China Sea",
        "Sino-US Relations",
        "Internal Politics",
        "3rd Party Influence",
    ],
    drivers: "Risk Drivers (Escalation)",
    mitigators: "Risk Mitigators (Stabilization)",
    timeline: "Timeline",
    motivation: "1. Motivation Analysis",
    probability: "Impulse probability",
    strategic: "2. Strategic Intent",
    prediction: "3. Future Prediction",
    surprise: "4. Surprise Attack Feasibility",
    targets: "Potential Targets",
    sources: "Sources",
};

const ZH: Labels = Labels {
    title: "SJM-CRI 2.0 军事冲突风险指数",
    no_data: "_无数据：生成服务未返回可用分析，以下评分为默认值。_",
    score: "综合风险评分",
    multiplier: "风险乘数 (M)",
    indices: ["台海稳定性", "东海对抗度", "中美关系", "国内政治舆情", "第三方影响力"],
    drivers: "风险驱动因素 (升级)",
    mitigators: "风险缓和因素 (维稳)",
    timeline: "时间线",
    motivation: "1. 动机分析",
    probability: "冲动概率",
    strategic: "2. 战略意图",
    prediction: "3. 未来预测",
    surprise: "4. 突袭可行性",
    targets: "潜在目标",
    sources: "参考来源",
};

fn labels(lang: Lang) -> &'static Labels {
    match lang {
        Lang::En => &EN,
        Lang::Zh => &ZH,
    }
}

fn category_label(c: EventCategory, lang: Lang) -> &'static str {
    match (lang, c) {
        (Lang::En, EventCategory::Diplomatic) => "Diplomatic",
        (Lang::En, EventCategory::Military) => "Military",
        (Lang::En, EventCategory::PublicOpinion) => "Public Opinion",
        (Lang::En, EventCategory::Other) => "Other",
        (Lang::Zh, EventCategory::Diplomatic) => "外交",
        (Lang::Zh, EventCategory::Military) => "军事",
        (Lang::Zh, EventCategory::PublicOpinion) => "舆论",
        (Lang::Zh, EventCategory::Other) => "其他",
    }
}

/// Chronological copy for display; undated or unparseable events go last.
pub fn sorted_timeline(events: &[TimelineEvent]) -> Vec<&TimelineEvent> {
    let mut out: Vec<&TimelineEvent> = events.iter().collect();
    out.sort_by_key(|e| {
        let parsed = NaiveDate::parse_from_str(e.date.trim(), "%Y-%m-%d").ok();
        (parsed.is_none(), parsed)
    });
    out
}

fn push_section(md: &mut String, heading: &str, body: &str) {
    if body.trim().is_empty() {
        return;
    }
    md.push_str(&format!("## {}\n{}\n\n", heading, body.trim()));
}

/// Narrative fields are trusted HTML fragments and are emitted as-is.
pub fn render_markdown(r: &AnalysisReport, lang: Lang) -> String {
    let t = labels(lang);
    let ci = &r.conflict_index;
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", t.title));
    if r.is_no_data() {
        md.push_str(t.no_data);
        md.push_str("\n\n");
    }

    md.push_str(&format!(
        "**{}:** {} {:.2} ({})\n\n",
        t.score,
        ci.risk_level.tier_marker(),
        ci.total_score,
        ci.risk_level.as_str()
    ));
    md.push_str(&format!("**{}:** ×{:.2}", t.multiplier, ci.risk_multiplier.value));
    if !ci.risk_multiplier.reason.trim().is_empty() {
        md.push_str(&format!(" — {}", ci.risk_multiplier.reason.trim()));
    }
    md.push_str("\n\n");

    let idx = &ci.indices;
    let rows = [
        (WEIGHTS.taiwan_strait, idx.taiwan_strait),
        (WEIGHTS.east_china_sea, idx.east_china_sea),
        (WEIGHTS.sino_us_relation, idx.sino_us_relation),
        (WEIGHTS.internal_politics, idx.internal_politics),
        (WEIGHTS.third_party, idx.third_party),
    ];
    md.push_str("| Index | Weight | Score |\n|---|---|---|\n");
    for (name, (weight, value)) in t.indices.iter().zip(rows) {
        md.push_str(&format!(
            "| {} | {:.0}% | {:.1} |\n",
            name,
            weight * 100.0,
            value
        ));
    }
    md.push('\n');

    for (heading, items) in [(t.drivers, &ci.drivers), (t.mitigators, &ci.mitigators)] {
        if items.is_empty() {
            continue;
        }
        md.push_str(&format!("### {}\n", heading));
        for item in items {
            md.push_str(&format!("- {}\n", item.trim()));
        }
        md.push('\n');
    }

    if !r.timeline.is_empty() {
        md.push_str(&format!("## {}\n", t.timeline));
        for e in sorted_timeline(&r.timeline) {
            md.push_str(&format!(
                "- **{}** [{}] {}: {}\n",
                e.date,
                category_label(e.category, lang),
                e.title,
                e.summary
            ));
        }
        md.push('\n');
    }

    push_section(&mut md, t.motivation, &r.impulse_analysis);
    md.push_str(&format!("**{}:** {}%\n\n", t.probability, r.impulse_probability));
    push_section(&mut md, t.strategic, &r.strategic_analysis);
    push_section(&mut md, t.prediction, &r.future_prediction);
    push_section(&mut md, t.surprise, &r.surprise_attack_analysis);

    if !r.potential_targets.is_empty() {
        md.push_str(&format!("## {}\n", t.targets));
        for target in &r.potential_targets {
            md.push_str(&format!("- {}\n", target));
        }
        md.push('\n');
    }

    if !r.sources.is_empty() {
        md.push_str(&format!("## {}\n", t.sources));
        for s in &r.sources {
            md.push_str(&format!("- [{}]({})\n", s.title, s.uri));
        }
        md.push('\n');
    }

    md
}
