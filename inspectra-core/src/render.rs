//! Terminal and JSON rendering of a dashboard view
//!
//! Global invariants enforced:
//! - Sections appear in a fixed order
//! - Identical views render byte-for-byte identically

use crate::model::Property;
use crate::report::{render_view_report, report_file_name};
use crate::risk::{self, RiskTier, Style};
use crate::view::DashboardView;

const RULE_WIDTH: usize = 72;
const BAR_WIDTH: usize = 30;
const PROGRESS_WIDTH: usize = 20;

/// Render the full dashboard as plain text
pub fn render_text(view: &DashboardView) -> String {
    let mut out = String::new();

    out.push_str("INSPECTRA | AI Home Inspection\n");
    out.push_str("AI-Assisted Home & Building Inspection Workspace\n");
    out.push_str("A transparent, explainable system to assess housing safety.\n");
    for warning in &view.warnings {
        out.push_str(&format!("[error] {}\n", warning));
    }
    out.push_str(&format!(
        "Property: {}   Focus: {}   High-risk rooms only: {}\n",
        view.property.id,
        view.focus,
        if view.only_high_risk { "yes" } else { "no" }
    ));
    rule(&mut out);

    section(&mut out, "Overall Risk Assessment");
    out.push_str(&format!(
        "{:<24} {:<24} {}\n",
        "Risk Level", "Total Risk Score", "Inspection Confidence"
    ));
    out.push_str(&format!(
        "{:<24} {:<24} {}\n",
        view.property.risk_level,
        view.property.total_risk as i64,
        view.aggregates.confidence.as_str()
    ));
    rule(&mut out);

    section(&mut out, "Room-wise Risk Distribution");
    out.push_str("Risk score per room based on observed inspection findings.\n");
    if view.rooms.is_empty() {
        out.push_str("(no rooms to show)\n");
    }
    for room in &view.rooms {
        out.push_str(&format!(
            "{} {:>6} {}\n",
            truncate_or_pad(&room.room_type, 20),
            format_score(room.score),
            bar(room.score / 100.0, BAR_WIDTH)
        ));
    }
    rule(&mut out);

    section(&mut out, "Room Risk Heatmap");
    out.push_str(&format!("{:<20} {:>6} {}\n", "ROOM_TYPE", "SCORE", "RISK_LEVEL"));
    for room in &view.rooms {
        out.push_str(&format!(
            "{} {:>6} {}\n",
            truncate_or_pad(&room.room_type, 20),
            format_score(room.score),
            room.label
        ));
    }
    rule(&mut out);

    section(&mut out, "Explainable AI - Room-Level Risk Reasoning");
    out.push_str("AI reasoning shows which defects contributed to risk scores. ");
    out.push_str("Transparent and auditor-friendly.\n");
    for room in &view.rooms {
        out.push_str(&format!("\n* {}\n", room.room_type));
        out.push_str(&format!("  Room Risk Score: {}\n", format_score(room.score)));
        out.push_str(&format!("  AI Explanation: {}\n", room.explanation));
        out.push_str(&format!("  {}\n", callout(room.style, room.advisory)));
    }
    rule(&mut out);

    section(&mut out, "Inspection Coverage");
    out.push_str(&format!(
        "Rooms Inspected: {}\n",
        view.aggregates.rooms_inspected
    ));
    out.push_str(&format!(
        "{} {}%\n",
        bar(view.aggregates.coverage_ratio, PROGRESS_WIDTH),
        view.aggregates.coverage_percent()
    ));
    out.push_str("More inspected rooms increase confidence in the final risk score.\n");
    rule(&mut out);

    section(&mut out, "Plain-Language Inspection Summary");
    let summary = view
        .summary
        .text
        .as_deref()
        .unwrap_or("No summary available for this property.");
    out.push_str(&callout(view.summary.style, summary));
    out.push('\n');
    rule(&mut out);

    section(&mut out, "AI-Generated Inspection Report");
    out.push_str(&format!(
        "Save as: {}\n",
        report_file_name(&view.property.id)
    ));
    for line in render_view_report(view).lines() {
        out.push_str(&format!("  | {}\n", line).replace(" \n", "\n"));
    }
    rule(&mut out);

    section(&mut out, "Risk Severity Guide");
    for tier in RiskTier::all() {
        out.push_str(&format!(
            "- {:<6} ({}): {}\n",
            tier.label(),
            risk::range_text(tier, &view.thresholds),
            tier.guide()
        ));
    }
    rule(&mut out);

    section(&mut out, "Detected Defects (Sample Images)");
    if view.images.is_empty() {
        out.push_str("(no defect images for this property)\n");
    }
    for image in &view.images {
        out.push_str(&format!(
            "{} - {} (Confidence: {}%)\n    {}\n",
            image.room_type, image.defect_label, image.confidence_percent, image.image_url
        ));
    }
    rule(&mut out);

    section(&mut out, "Bank / Mortgage Risk Signal");
    out.push_str(&callout(view.bank.style, view.bank.message));
    out.push('\n');
    if !view.bank.from_warehouse {
        out.push_str("(no bank signal recorded; showing default decision)\n");
    }
    rule(&mut out);

    section(&mut out, "Risk Trend Over Time");
    let max_risk = view
        .trend
        .iter()
        .map(|p| p.total_risk)
        .fold(0.0_f64, f64::max);
    for point in &view.trend {
        let fraction = if max_risk > 0.0 {
            point.total_risk / max_risk
        } else {
            0.0
        };
        out.push_str(&format!(
            "#{:<4} {} {:>8} {}\n",
            point.sequence,
            truncate_or_pad(&point.property_id, 16),
            format_score(point.total_risk),
            bar(fraction, BAR_WIDTH)
        ));
    }
    rule(&mut out);

    out.push_str("INSPECTRA applies explainable AI-assisted logic to inspection data ");
    out.push_str("to help families, banks, and regulators detect unsafe housing early.\n");

    out
}

/// Render the view as pretty JSON
pub fn render_json(view: &DashboardView) -> String {
    serde_json::to_string_pretty(view).unwrap_or_else(|_| "{}".to_string())
}

/// Render the property selector list
pub fn render_property_list(properties: &[&Property]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {:<8} {}\n",
        truncate_or_pad("PROPERTY_ID", 20),
        "RISK",
        "TOTAL_RISK"
    ));
    for property in properties {
        out.push_str(&format!(
            "{} {:<8} {}\n",
            truncate_or_pad(&property.id, 20),
            property.risk_level,
            format_score(property.total_risk)
        ));
    }
    out
}

/// Scores print without a trailing `.0` when whole
pub fn format_score(score: f64) -> String {
    format!("{}", score)
}

fn section(out: &mut String, title: &str) {
    out.push_str(title);
    out.push('\n');
}

fn rule(out: &mut String) {
    out.push_str(&"-".repeat(RULE_WIDTH));
    out.push('\n');
}

fn callout(style: Style, text: &str) -> String {
    format!("[{}] {}", style.as_str(), text)
}

/// Horizontal bar for a fraction in [0, 1]
fn bar(fraction: f64, width: usize) -> String {
    let clamped = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (clamped * width as f64).round() as usize;
    format!("{}{}", "#".repeat(filled), ".".repeat(width - filled))
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Dataset, RiskLevel, Room};
    use crate::view::{build_view, ViewOptions};

    fn view() -> DashboardView {
        let dataset = Dataset {
            properties: vec![Property {
                id: "P7".to_string(),
                risk_level: RiskLevel::Medium,
                total_risk: 132.0,
            }],
            rooms: vec![
                Room {
                    property_id: "P7".to_string(),
                    room_type: "Kitchen".to_string(),
                    room_risk_score: 62.0,
                },
                Room {
                    property_id: "P7".to_string(),
                    room_type: "Bedroom".to_string(),
                    room_risk_score: 12.0,
                },
            ],
            ..Dataset::default()
        };
        build_view(&dataset, "P7", ViewOptions::default()).unwrap()
    }

    #[test]
    fn test_text_contains_sections_in_order() {
        let text = render_text(&view());
        let sections = [
            "Overall Risk Assessment",
            "Room-wise Risk Distribution",
            "Room Risk Heatmap",
            "Explainable AI",
            "Inspection Coverage",
            "Plain-Language Inspection Summary",
            "AI-Generated Inspection Report",
            "Risk Severity Guide",
            "Detected Defects",
            "Bank / Mortgage Risk Signal",
            "Risk Trend Over Time",
        ];
        let mut last = 0;
        for title in sections {
            let pos = text[last..]
                .find(title)
                .unwrap_or_else(|| panic!("missing or out of order: {}", title));
            last += pos;
        }
    }

    #[test]
    fn test_text_shows_degraded_secondary_data() {
        let text = render_text(&view());
        assert!(text.contains("No summary available for this property."));
        assert!(text.contains("[warning] Manual review required"));
        assert!(text.contains("(no defect images for this property)"));
        assert!(text.contains("Save as: P7_AI_Inspection_Report.txt"));
        assert!(text.contains("Rooms Inspected: 2"));
        assert!(text.contains(" 40%"));
    }

    #[test]
    fn test_text_is_deterministic() {
        assert_eq!(render_text(&view()), render_text(&view()));
    }

    #[test]
    fn test_json_roundtrips_as_value() {
        let json = render_json(&view());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["property"]["id"], "P7");
        assert_eq!(value["aggregates"]["confidence"], "Medium");
        assert_eq!(value["rooms"][0]["tier"], "MEDIUM");
        assert_eq!(value["bank"]["decision"], "MANUAL_REVIEW");
        assert!(value.get("warnings").is_none());
    }

    #[test]
    fn test_bar_and_padding() {
        assert_eq!(bar(0.5, 10), "#####.....");
        assert_eq!(bar(1.7, 4), "####");
        assert_eq!(bar(f64::NAN, 3), "...");
        assert_eq!(truncate_or_pad("Kitchen", 10), "Kitchen   ");
        assert_eq!(truncate_or_pad("Utility Room Annex", 10), "Utility...");
    }
}
