//! Golden file tests - verify the downloadable report matches expected snapshots

use inspectra_core::config::ResolvedConfig;
use inspectra_core::{load_view, report, ViewOptions};
use rusqlite::Connection;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn golden_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .join("tests")
        .join("golden")
        .join(name)
}

fn read_golden(name: &str) -> String {
    let path = golden_path(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read golden file {}: {}", path.display(), e))
}

fn test_golden_report(property_id: &str) {
    let temp = TempDir::new().unwrap();
    let db = temp.path().join("warehouse.db");
    let sql = fs::read_to_string(fixture_path("warehouse.sql")).unwrap();
    Connection::open(&db).unwrap().execute_batch(&sql).unwrap();

    let config = ResolvedConfig::defaults().unwrap();
    let view = load_view(&config, &db, property_id, ViewOptions::default()).unwrap();

    let written = report::write_report(temp.path(), &view).unwrap();
    let actual = fs::read_to_string(&written).unwrap();
    let expected = read_golden(&report::report_file_name(property_id));

    assert_eq!(
        actual, expected,
        "Report for {} does not match golden file",
        property_id
    );
}

#[test]
fn test_golden_report_high_risk_property() {
    test_golden_report("P-101");
}

#[test]
fn test_golden_report_is_stable_across_runs() {
    test_golden_report("P-101");
    test_golden_report("P-101");
}
