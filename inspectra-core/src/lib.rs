//! Inspectra core library - housing-inspection risk views over a read-only warehouse

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Warehouse access is read-only
// - No global mutable state
// - No clocks, threads, or async
// - Every view is rebuilt from freshly loaded tables
// - Identical input yields byte-for-byte identical output

pub mod aggregates;
pub mod config;
pub mod html;
pub mod model;
pub mod render;
pub mod report;
pub mod risk;
pub mod view;
pub mod warehouse;

pub use aggregates::{compute_property_aggregates, Confidence, PropertyAggregates};
pub use config::ResolvedConfig;
pub use model::Dataset;
pub use render::{render_json, render_text};
pub use report::{render_report, report_file_name};
pub use risk::{classify, Classification, RiskTier};
pub use view::{build_view, DashboardView, ViewError, ViewOptions};
pub use warehouse::{TableNames, Warehouse};

use anyhow::Result;

/// Load the warehouse named by `config` and build the view for one property
///
/// If the view cannot be built, table load failures are attached as context;
/// the [`ViewError`] is still reachable through `downcast_ref`.
pub fn load_view(
    config: &ResolvedConfig,
    database: &std::path::Path,
    property_id: &str,
    options: ViewOptions,
) -> Result<DashboardView> {
    let dataset = warehouse::load_dataset(database, &config.tables)?;
    let rules = view::ViewRules::from(config);
    view::build_view_with_rules(&dataset, property_id, options, &rules).map_err(|e| {
        if dataset.warnings.is_empty() {
            anyhow::Error::new(e)
        } else {
            let failures: Vec<String> = dataset.warnings.iter().map(|w| w.to_string()).collect();
            anyhow::Error::new(e).context(failures.join("\n"))
        }
    })
}
