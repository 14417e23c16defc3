//! Downloadable inspection report
//!
//! Global invariants enforced:
//! - Report text is a pure function of its inputs
//! - Identical input yields byte-for-byte identical output

use crate::aggregates::PropertyAggregates;
use crate::model::Property;
use crate::view::DashboardView;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Fixed findings block; the upstream pipeline does not publish per-finding text
const KEY_FINDINGS: &[&str] = &[
    "High-risk rooms detected",
    "Electrical/damp issues identified",
    "Structural safety evaluated using transparent thresholds",
];

const RECOMMENDATION: &[&str] = &[
    "Immediate corrective inspection advised for high-risk rooms.",
    "Preventive maintenance recommended for medium-risk rooms.",
];

/// Render the plain-text report for a property
pub fn render_report(property: &Property, aggregates: &PropertyAggregates) -> String {
    let mut out = String::new();
    out.push('\n');
    out.push_str(&format!("PROPERTY ID: {}\n", property.id));
    out.push('\n');
    out.push_str(&format!("OVERALL RISK LEVEL: {}\n", property.risk_level));
    out.push_str(&format!("TOTAL RISK SCORE: {}\n", property.total_risk));
    out.push('\n');
    out.push_str("INSPECTION COVERAGE:\n");
    out.push_str(&format!("- Rooms inspected: {}\n", aggregates.rooms_inspected));
    out.push_str(&format!(
        "- Confidence level: {}\n",
        aggregates.confidence.as_str()
    ));
    out.push('\n');
    out.push_str("KEY AI FINDINGS:\n");
    for finding in KEY_FINDINGS {
        out.push_str(&format!("- {}\n", finding));
    }
    out.push('\n');
    out.push_str("RECOMMENDATION:\n");
    for line in RECOMMENDATION {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Render the report for an assembled view
pub fn render_view_report(view: &DashboardView) -> String {
    render_report(&view.property, &view.aggregates)
}

/// Download file name for a property's report
pub fn report_file_name(property_id: &str) -> String {
    format!("{}_AI_Inspection_Report.txt", sanitize_file_stem(property_id))
}

/// Keep ids usable as a file name on every platform
fn sanitize_file_stem(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Write the report for a view into `dir`, returning the written path
pub fn write_report(dir: &Path, view: &DashboardView) -> Result<PathBuf> {
    let path = dir.join(report_file_name(&view.property.id));
    atomic_write(&path, &render_view_report(view))?;
    tracing::info!(path = %path.display(), "wrote inspection report");
    Ok(path)
}

/// Write contents atomically (temp file + rename)
pub fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    use std::fs;
    use std::io::Write;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = fs::File::create(&temp_path)
        .with_context(|| format!("failed to create temp file: {}", temp_path.display()))?;
    file.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write to temp file: {}", temp_path.display()))?;
    file.sync_all()
        .with_context(|| format!("failed to sync temp file: {}", temp_path.display()))?;
    drop(file);

    fs::rename(&temp_path, path)
        .with_context(|| format!("failed to rename temp file to: {}", path.display()))?;

    Ok(())
}
