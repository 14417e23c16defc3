//! HTML dashboard generation
//!
//! Generates a self-contained HTML page with embedded CSS. The page needs no
//! scripts and works offline; defect images are referenced by URL, never embedded.

use crate::render::format_score;
use crate::report::{render_view_report, report_file_name};
use crate::risk::{self, RiskTier, Style};
use crate::view::{DashboardView, TrendPoint};

/// Render a dashboard view as an HTML page
pub fn render_html_view(view: &DashboardView) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>INSPECTRA | {id}</title>
    <style>{css}</style>
</head>
<body>
    <div class="container">
        {header}
        {warnings}
        {metrics}
        {rooms}
        {heatmap}
        {explanations}
        {coverage}
        {summary}
        {report}
        {guide}
        {images}
        {bank}
        {trend}
        {footer}
    </div>
</body>
</html>"#,
        id = html_escape(&view.property.id),
        css = inline_css(),
        header = render_header(view),
        warnings = render_warnings(view),
        metrics = render_metrics(view),
        rooms = render_room_bars(view),
        heatmap = render_heatmap(view),
        explanations = render_explanations(view),
        coverage = render_coverage(view),
        summary = render_summary(view),
        report = render_report_preview(view),
        guide = render_guide(view),
        images = render_images(view),
        bank = render_bank(view),
        trend = render_trend(&view.trend),
        footer = render_footer(),
    )
}

/// Inline CSS styles
fn inline_css() -> &'static str {
    r#"
* {
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}

body {
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    line-height: 1.6;
    color: #111827;
    background: #ffffff;
}

.container {
    max-width: 1100px;
    margin: 0 auto;
    padding: 2rem;
}

header {
    margin-bottom: 2rem;
    padding-bottom: 1rem;
    border-bottom: 2px solid #e5e7eb;
}

header h1 {
    font-size: 2rem;
    font-weight: 700;
}

header .meta {
    color: #6b7280;
    font-size: 0.875rem;
}

.section {
    margin-bottom: 2rem;
    padding-bottom: 1.5rem;
    border-bottom: 1px solid #e5e7eb;
}

.section h2 {
    font-size: 1.25rem;
    font-weight: 700;
    margin-bottom: 0.75rem;
}

.caption {
    color: #6b7280;
    font-size: 0.8rem;
    margin-bottom: 0.5rem;
}

.metrics {
    display: grid;
    grid-template-columns: repeat(3, 1fr);
    gap: 1rem;
}

.metric {
    background: #f9fafb;
    padding: 1rem;
    border-radius: 0.5rem;
    border-left: 4px solid #3b82f6;
}

.metric h3 {
    font-size: 0.875rem;
    font-weight: 600;
    color: #6b7280;
}

.metric .value {
    font-size: 1.5rem;
    font-weight: 700;
}

table {
    width: 100%;
    border-collapse: collapse;
}

th {
    padding: 0.5rem;
    text-align: left;
    font-size: 0.8rem;
    color: #374151;
    border-bottom: 2px solid #e5e7eb;
    background: #f9fafb;
}

td {
    padding: 0.5rem;
    border-bottom: 1px solid #e5e7eb;
    font-size: 0.875rem;
}

.bar-track {
    background: #f3f4f6;
    border-radius: 0.25rem;
    height: 0.9rem;
    width: 100%;
}

.bar-fill {
    background: #3b82f6;
    border-radius: 0.25rem;
    height: 100%;
}

.tier-high   { background: #fecaca; color: #991b1b; font-weight: 600; }
.tier-medium { background: #fed7aa; color: #9a3412; font-weight: 600; }
.tier-low    { background: #fef08a; color: #854d0e; font-weight: 600; }
.tier-safe   { background: #bbf7d0; color: #166534; font-weight: 600; }

.callout {
    padding: 0.75rem 1rem;
    border-radius: 0.375rem;
    border-left: 4px solid;
    margin: 0.5rem 0;
}

.callout-error   { background: #fef2f2; border-left-color: #ef4444; }
.callout-warning { background: #fffbeb; border-left-color: #f59e0b; }
.callout-info    { background: #eff6ff; border-left-color: #3b82f6; }
.callout-success { background: #f0fdf4; border-left-color: #22c55e; }

details {
    border: 1px solid #e5e7eb;
    border-radius: 0.375rem;
    padding: 0.5rem 1rem;
    margin-bottom: 0.5rem;
}

summary {
    cursor: pointer;
    font-weight: 600;
}

pre.report {
    background: #f9fafb;
    border: 1px solid #e5e7eb;
    border-radius: 0.375rem;
    padding: 1rem;
    font-family: 'Monaco', 'Courier New', monospace;
    font-size: 0.8rem;
    white-space: pre-wrap;
}

.images {
    display: grid;
    grid-template-columns: repeat(3, 1fr);
    gap: 1rem;
}

.images figure img {
    width: 100%;
    border-radius: 0.375rem;
}

.images figcaption {
    font-size: 0.8rem;
    color: #4b5563;
}

svg.trend polyline {
    fill: none;
    stroke: #3b82f6;
    stroke-width: 2;
}

footer {
    margin-top: 2rem;
    text-align: center;
    color: #6b7280;
    font-size: 0.8rem;
}

@media (max-width: 768px) {
    .container { padding: 1rem; }
    .metrics, .images { grid-template-columns: 1fr; }
}
"#
}

fn render_header(view: &DashboardView) -> String {
    format!(
        r#"<header>
    <h1>INSPECTRA</h1>
    <p><strong>AI-Assisted Home &amp; Building Inspection Workspace</strong><br>
    A transparent, explainable system to assess housing safety.</p>
    <div class="meta">Property {id} &middot; Focus: {focus} &middot; High-risk rooms only: {only}</div>
</header>"#,
        id = html_escape(&view.property.id),
        focus = view.focus,
        only = if view.only_high_risk { "yes" } else { "no" },
    )
}

fn render_warnings(view: &DashboardView) -> String {
    view.warnings
        .iter()
        .map(|w| callout(Style::Error, &html_escape(&w.to_string())))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_metrics(view: &DashboardView) -> String {
    format!(
        r#"<section class="section">
    <h2>Overall Risk Assessment</h2>
    <div class="metrics">
        <div class="metric"><h3>Risk Level</h3><div class="value">{level}</div></div>
        <div class="metric"><h3>Total Risk Score</h3><div class="value">{total}</div></div>
        <div class="metric"><h3>Inspection Confidence</h3><div class="value">{confidence}</div></div>
    </div>
</section>"#,
        level = view.property.risk_level,
        total = view.property.total_risk as i64,
        confidence = view.aggregates.confidence.as_str(),
    )
}

fn render_room_bars(view: &DashboardView) -> String {
    let rows: String = view
        .rooms
        .iter()
        .map(|room| {
            format!(
                r#"<tr><td>{name}</td><td>{score}</td><td><div class="bar-track"><div class="bar-fill" style="width: {pct:.0}%"></div></div></td></tr>"#,
                name = html_escape(&room.room_type),
                score = format_score(room.score),
                pct = room.score.clamp(0.0, 100.0),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<section class="section">
    <h2>Room-wise Risk Distribution</h2>
    <p class="caption">Risk score per room based on observed inspection findings.</p>
    <table>
        <thead><tr><th>Room</th><th>Score</th><th style="width: 60%">Risk</th></tr></thead>
        <tbody>
            {rows}
        </tbody>
    </table>
</section>"#,
        rows = rows,
    )
}

fn render_heatmap(view: &DashboardView) -> String {
    let rows: String = view
        .rooms
        .iter()
        .map(|room| {
            format!(
                r#"<tr><td>{name}</td><td>{score}</td><td class="{class}">{label}</td></tr>"#,
                name = html_escape(&room.room_type),
                score = format_score(room.score),
                class = tier_class(room.tier),
                label = room.label,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<section class="section">
    <h2>Room Risk Heatmap</h2>
    <table>
        <thead><tr><th>ROOM_TYPE</th><th>ROOM_RISK_SCORE</th><th>RISK_LEVEL</th></tr></thead>
        <tbody>
            {rows}
        </tbody>
    </table>
</section>"#,
        rows = rows,
    )
}

fn render_explanations(view: &DashboardView) -> String {
    let panels: String = view
        .rooms
        .iter()
        .map(|room| {
            format!(
                r#"<details>
    <summary>{name}</summary>
    <p><strong>Room Risk Score:</strong> {score}</p>
    <p><strong>AI Explanation:</strong> {explanation}</p>
    {advice}
</details>"#,
                name = html_escape(&room.room_type),
                score = format_score(room.score),
                explanation = room.explanation,
                advice = callout(room.style, room.advisory),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<section class="section">
    <h2>Explainable AI &ndash; Room-Level Risk Reasoning</h2>
    <p class="caption">AI reasoning shows which defects contributed to risk scores. Transparent and auditor-friendly.</p>
    {panels}
</section>"#,
        panels = panels,
    )
}

fn render_coverage(view: &DashboardView) -> String {
    format!(
        r#"<section class="section">
    <h2>Inspection Coverage</h2>
    <div class="metric"><h3>Rooms Inspected</h3><div class="value">{rooms}</div></div>
    <div class="bar-track" style="margin-top: 0.75rem"><div class="bar-fill" style="width: {pct}%"></div></div>
    <p class="caption">More inspected rooms increase confidence in the final risk score.</p>
</section>"#,
        rooms = view.aggregates.rooms_inspected,
        pct = view.aggregates.coverage_percent(),
    )
}

fn render_summary(view: &DashboardView) -> String {
    let text = view
        .summary
        .text
        .as_deref()
        .map(html_escape)
        .unwrap_or_else(|| "No summary available for this property.".to_string());
    format!(
        r#"<section class="section">
    <h2>Plain-Language Inspection Summary</h2>
    {callout}
</section>"#,
        callout = callout(view.summary.style, &text),
    )
}

fn render_report_preview(view: &DashboardView) -> String {
    format!(
        r#"<section class="section">
    <h2>AI-Generated Inspection Report</h2>
    <p class="caption">Saved as <code>{file}</code></p>
    <pre class="report">{report}</pre>
</section>"#,
        file = html_escape(&report_file_name(&view.property.id)),
        report = html_escape(&render_view_report(view)),
    )
}

fn render_guide(view: &DashboardView) -> String {
    let items: String = RiskTier::all()
        .iter()
        .map(|tier| {
            format!(
                r#"<li><span class="{class}">{label}</span> ({range}): {guide}</li>"#,
                class = tier_class(*tier),
                label = tier.label(),
                range = html_escape(&risk::range_text(*tier, &view.thresholds)),
                guide = tier.guide(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<section class="section">
    <h2>Risk Severity Guide</h2>
    <ul>
        {items}
    </ul>
</section>"#,
        items = items,
    )
}

fn render_images(view: &DashboardView) -> String {
    let body = if view.images.is_empty() {
        r#"<p class="caption">No defect images for this property.</p>"#.to_string()
    } else {
        let figures: String = view
            .images
            .iter()
            .map(|image| {
                format!(
                    r#"<figure><img src="{url}" alt="{label}" loading="lazy"><figcaption>{room} &ndash; {label} (Confidence: {pct}%)</figcaption></figure>"#,
                    url = html_escape(&image.image_url),
                    room = html_escape(&image.room_type),
                    label = html_escape(&image.defect_label),
                    pct = image.confidence_percent,
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!(r#"<div class="images">{}</div>"#, figures)
    };

    format!(
        r#"<section class="section">
    <h2>Detected Defects (Sample Images)</h2>
    {body}
</section>"#,
        body = body,
    )
}

fn render_bank(view: &DashboardView) -> String {
    let note = if view.bank.from_warehouse {
        String::new()
    } else {
        r#"<p class="caption">No bank signal recorded; showing the default decision.</p>"#
            .to_string()
    };
    format!(
        r#"<section class="section">
    <h2>Bank / Mortgage Risk Signal</h2>
    {callout}
    {note}
</section>"#,
        callout = callout(view.bank.style, view.bank.message),
        note = note,
    )
}

/// Render the trend as an inline SVG polyline
fn render_trend(points: &[TrendPoint]) -> String {
    const WIDTH: f64 = 600.0;
    const HEIGHT: f64 = 160.0;

    let max = points.iter().map(|p| p.total_risk).fold(0.0_f64, f64::max);
    let step = if points.len() > 1 {
        WIDTH / (points.len() - 1) as f64
    } else {
        0.0
    };
    let coords: Vec<String> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let y = if max > 0.0 {
                HEIGHT - (p.total_risk / max) * HEIGHT
            } else {
                HEIGHT
            };
            format!("{:.1},{:.1}", i as f64 * step, y)
        })
        .collect();

    format!(
        r#"<section class="section">
    <h2>Risk Trend Over Time</h2>
    <p class="caption">Total risk by inspection sequence ({count} inspections, peak {peak}).</p>
    <svg class="trend" viewBox="0 0 {w} {h}" width="100%" height="{h}" preserveAspectRatio="none">
        <polyline points="{coords}"></polyline>
    </svg>
</section>"#,
        count = points.len(),
        peak = format_score(max),
        w = WIDTH,
        h = HEIGHT,
        coords = coords.join(" "),
    )
}

fn render_footer() -> String {
    r#"<footer>
    <p>INSPECTRA applies explainable AI-assisted logic to inspection data to help families, banks, and regulators detect unsafe housing early.</p>
</footer>"#
        .to_string()
}

fn callout(style: Style, body: &str) -> String {
    format!(
        r#"<div class="callout callout-{}">{}</div>"#,
        style.as_str(),
        body
    )
}

fn tier_class(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::High => "tier-high",
        RiskTier::Medium => "tier-medium",
        RiskTier::Low => "tier-low",
        RiskTier::Safe => "tier-safe",
    }
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
