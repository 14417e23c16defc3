//! Read-only warehouse access
//!
//! Issues one `SELECT *` per upstream table and decodes rows by column name.
//! A table that fails to load (missing table, missing column, undecodable row)
//! yields an empty result plus a [`LoadWarning`]; it never aborts the other tables.

use crate::model::{
    BankDecision, BankSignal, Dataset, LoadWarning, Property, Room, RoomImage, Summary,
    PLACEHOLDER_IMAGE_URL, UNKNOWN_DEFECT_LABEL,
};
use anyhow::{Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use serde::Serialize;
use std::path::Path;

/// Upstream table names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableNames {
    pub property: String,
    pub room: String,
    pub summary: String,
    pub image: String,
    pub bank: String,
}

impl Default for TableNames {
    fn default() -> Self {
        TableNames {
            property: "PROPERTY_RISK".to_string(),
            room: "ROOM_RISK".to_string(),
            summary: "PROPERTY_SUMMARY".to_string(),
            image: "ROOM_IMAGES".to_string(),
            bank: "BANK_RISK_VIEW".to_string(),
        }
    }
}

impl TableNames {
    /// Table names are spliced into SQL, so only dotted identifiers are accepted
    pub fn check_name(name: &str) -> Result<()> {
        if name.is_empty() {
            anyhow::bail!("table name must not be empty");
        }
        for segment in name.split('.') {
            let mut chars = segment.chars();
            let valid_start = chars
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
            if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
                anyhow::bail!("invalid table name: {:?}", name);
            }
        }
        Ok(())
    }
}

/// A read-only connection to the inspection warehouse
pub struct Warehouse {
    conn: Connection,
}

impl Warehouse {
    /// Open a SQLite warehouse file read-only
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open warehouse: {}", path.display()))?;
        Ok(Warehouse { conn })
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: Connection) -> Self {
        Warehouse { conn }
    }

    /// Load all five tables, substituting empty results for tables that fail
    pub fn load(&self, tables: &TableNames) -> Dataset {
        let mut warnings = Vec::new();

        let properties = self.load_table(&tables.property, decode_property, &mut warnings);
        let rooms = self.load_table(&tables.room, decode_room, &mut warnings);
        let summaries = self.load_table(&tables.summary, decode_summary, &mut warnings);
        let images = self.load_table(&tables.image, decode_image, &mut warnings);
        let bank_signals = self.load_table(&tables.bank, decode_bank_signal, &mut warnings);

        Dataset {
            properties,
            rooms,
            summaries,
            images,
            bank_signals,
            warnings,
        }
    }

    fn load_table<T>(
        &self,
        table: &str,
        decode: fn(&Columns, &Row<'_>) -> Result<T>,
        warnings: &mut Vec<LoadWarning>,
    ) -> Vec<T> {
        match select_all(&self.conn, table, decode) {
            Ok(rows) => {
                tracing::debug!(table = %table, rows = rows.len(), "loaded table");
                rows
            }
            Err(e) => {
                let message = format!("{:#}", e);
                tracing::debug!(table = %table, error = %message, "table load failed");
                warnings.push(LoadWarning {
                    table: table.to_string(),
                    message,
                });
                Vec::new()
            }
        }
    }
}

/// Open `path` and load every table
pub fn load_dataset(path: &Path, tables: &TableNames) -> Result<Dataset> {
    Ok(Warehouse::open(path)?.load(tables))
}

fn select_all<T>(
    conn: &Connection,
    table: &str,
    decode: fn(&Columns, &Row<'_>) -> Result<T>,
) -> Result<Vec<T>> {
    TableNames::check_name(table)?;
    let sql = format!("SELECT * FROM {}", table);
    let mut stmt = conn
        .prepare(&sql)
        .with_context(|| format!("failed to query {}", table))?;
    let columns = Columns::new(stmt.column_names());

    let mut rows = stmt.query([])?;
    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let decoded = decode(&columns, row)
            .with_context(|| format!("failed to decode row {} of {}", out.len() + 1, table))?;
        out.push(decoded);
    }
    Ok(out)
}

/// Column lookup by case-insensitive name
struct Columns {
    names: Vec<String>,
}

impl Columns {
    fn new(names: Vec<&str>) -> Self {
        Columns {
            names: names.into_iter().map(str::to_ascii_uppercase).collect(),
        }
    }

    fn index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.index(name)
            .with_context(|| format!("missing column {}", name))
    }
}

fn text_at(row: &Row<'_>, idx: usize) -> Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => anyhow::bail!("column {} holds a blob, expected text", idx),
    })
}

fn number_at(row: &Row<'_>, idx: usize) -> Result<Option<f64>> {
    let value = match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f) => Some(f),
        ValueRef::Text(t) => {
            let s = String::from_utf8_lossy(t);
            let value = s
                .trim()
                .parse::<f64>()
                .with_context(|| format!("column {} is not numeric: {:?}", idx, s))?;
            Some(value)
        }
        ValueRef::Blob(_) => anyhow::bail!("column {} holds a blob, expected a number", idx),
    };
    if let Some(v) = value {
        anyhow::ensure!(v.is_finite(), "column {} is not a finite number: {}", idx, v);
    }
    Ok(value)
}

fn required_text(columns: &Columns, row: &Row<'_>, name: &str) -> Result<String> {
    text_at(row, columns.require(name)?)?.with_context(|| format!("{} is NULL", name))
}

fn required_number(columns: &Columns, row: &Row<'_>, name: &str) -> Result<f64> {
    number_at(row, columns.require(name)?)?.with_context(|| format!("{} is NULL", name))
}

fn optional_text(columns: &Columns, row: &Row<'_>, name: &str) -> Result<Option<String>> {
    match columns.index(name) {
        Some(idx) => text_at(row, idx),
        None => Ok(None),
    }
}

fn optional_number(columns: &Columns, row: &Row<'_>, name: &str) -> Result<Option<f64>> {
    match columns.index(name) {
        Some(idx) => number_at(row, idx),
        None => Ok(None),
    }
}

fn decode_property(columns: &Columns, row: &Row<'_>) -> Result<Property> {
    Ok(Property {
        id: required_text(columns, row, "PROPERTY_ID")?,
        risk_level: required_text(columns, row, "RISK_LEVEL")?.parse()?,
        total_risk: required_number(columns, row, "TOTAL_RISK")?,
    })
}

fn decode_room(columns: &Columns, row: &Row<'_>) -> Result<Room> {
    Ok(Room {
        property_id: required_text(columns, row, "PROPERTY_ID")?,
        room_type: required_text(columns, row, "ROOM_TYPE")?,
        room_risk_score: required_number(columns, row, "ROOM_RISK_SCORE")?,
    })
}

fn decode_summary(columns: &Columns, row: &Row<'_>) -> Result<Summary> {
    Ok(Summary {
        property_id: required_text(columns, row, "PROPERTY_ID")?,
        summary_text: optional_text(columns, row, "SUMMARY_TEXT")?.unwrap_or_default(),
    })
}

fn decode_image(columns: &Columns, row: &Row<'_>) -> Result<RoomImage> {
    Ok(RoomImage {
        property_id: required_text(columns, row, "PROPERTY_ID")?,
        room_type: required_text(columns, row, "ROOM_TYPE")?,
        image_url: optional_text(columns, row, "IMAGE_URL")?
            .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
        defect_label: optional_text(columns, row, "DEFECT_LABEL")?
            .unwrap_or_else(|| UNKNOWN_DEFECT_LABEL.to_string()),
        defect_confidence: optional_number(columns, row, "DEFECT_CONFIDENCE")?.unwrap_or(0.0),
    })
}

fn decode_bank_signal(columns: &Columns, row: &Row<'_>) -> Result<BankSignal> {
    let bank_decision = match optional_text(columns, row, "BANK_DECISION")? {
        Some(s) => s.parse()?,
        None => BankDecision::default(),
    };
    Ok(BankSignal {
        property_id: required_text(columns, row, "PROPERTY_ID")?,
        bank_decision,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RiskLevel;

    fn memory_warehouse(sql: &str) -> Warehouse {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(sql).unwrap();
        Warehouse::from_connection(conn)
    }

    #[test]
    fn test_check_name() {
        assert!(TableNames::check_name("PROPERTY_RISK").is_ok());
        assert!(TableNames::check_name("core.PROPERTY_RISK").is_ok());
        assert!(TableNames::check_name("").is_err());
        assert!(TableNames::check_name("a..b").is_err());
        assert!(TableNames::check_name("1TABLE").is_err());
        assert!(TableNames::check_name("t; DROP TABLE t").is_err());
    }

    #[test]
    fn test_missing_tables_become_warnings() {
        let warehouse = memory_warehouse(
            "CREATE TABLE PROPERTY_RISK (PROPERTY_ID TEXT, RISK_LEVEL TEXT, TOTAL_RISK REAL);
             INSERT INTO PROPERTY_RISK VALUES ('P1', 'HIGH', 240.0);",
        );
        let dataset = warehouse.load(&TableNames::default());
        assert_eq!(dataset.properties.len(), 1);
        assert!(dataset.rooms.is_empty());
        let failed: Vec<&str> = dataset.warnings.iter().map(|w| w.table.as_str()).collect();
        assert_eq!(
            failed,
            vec!["ROOM_RISK", "PROPERTY_SUMMARY", "ROOM_IMAGES", "BANK_RISK_VIEW"]
        );
    }

    #[test]
    fn test_integer_ids_and_lowercase_columns() {
        let warehouse = memory_warehouse(
            "CREATE TABLE PROPERTY_RISK (property_id INTEGER, risk_level TEXT, total_risk INTEGER);
             INSERT INTO PROPERTY_RISK VALUES (101, 'medium', 150);",
        );
        let dataset = warehouse.load(&TableNames::default());
        assert_eq!(
            dataset.properties,
            vec![Property {
                id: "101".to_string(),
                risk_level: RiskLevel::Medium,
                total_risk: 150.0,
            }]
        );
    }

    #[test]
    fn test_image_defaults_for_missing_columns() {
        let warehouse = memory_warehouse(
            "CREATE TABLE ROOM_IMAGES (PROPERTY_ID TEXT, ROOM_TYPE TEXT, DEFECT_LABEL TEXT);
             INSERT INTO ROOM_IMAGES VALUES ('P1', 'Kitchen', NULL);",
        );
        let dataset = warehouse.load(&TableNames::default());
        assert_eq!(dataset.images.len(), 1);
        let image = &dataset.images[0];
        assert_eq!(image.image_url, PLACEHOLDER_IMAGE_URL);
        assert_eq!(image.defect_label, UNKNOWN_DEFECT_LABEL);
        assert_eq!(image.defect_confidence, 0.0);
    }

    #[test]
    fn test_bad_row_fails_whole_table() {
        let warehouse = memory_warehouse(
            "CREATE TABLE PROPERTY_RISK (PROPERTY_ID TEXT, RISK_LEVEL TEXT, TOTAL_RISK REAL);
             INSERT INTO PROPERTY_RISK VALUES ('P1', 'HIGH', 240.0);
             INSERT INTO PROPERTY_RISK VALUES ('P2', 'EXTREME', 300.0);",
        );
        let dataset = warehouse.load(&TableNames::default());
        assert!(dataset.properties.is_empty());
        let warning = dataset
            .warnings
            .iter()
            .find(|w| w.table == "PROPERTY_RISK")
            .expect("property table should warn");
        assert!(warning.message.contains("row 2"), "{}", warning.message);
    }

    #[test]
    fn test_null_bank_decision_defaults_to_manual_review() {
        let warehouse = memory_warehouse(
            "CREATE TABLE BANK_RISK_VIEW (PROPERTY_ID TEXT, BANK_DECISION TEXT);
             INSERT INTO BANK_RISK_VIEW VALUES ('P1', NULL);
             INSERT INTO BANK_RISK_VIEW VALUES ('P2', 'LOAN_APPROVE');",
        );
        let dataset = warehouse.load(&TableNames::default());
        assert_eq!(dataset.bank_signals[0].bank_decision, BankDecision::ManualReview);
        assert_eq!(dataset.bank_signals[1].bank_decision, BankDecision::LoanApprove);
    }

    #[test]
    fn test_numeric_text_scores_are_parsed() {
        let warehouse = memory_warehouse(
            "CREATE TABLE ROOM_RISK (PROPERTY_ID TEXT, ROOM_TYPE TEXT, ROOM_RISK_SCORE TEXT);
             INSERT INTO ROOM_RISK VALUES ('P1', 'Attic', ' 72.5 ');",
        );
        let dataset = warehouse.load(&TableNames::default());
        assert_eq!(dataset.rooms[0].room_risk_score, 72.5);
    }

    #[test]
    fn test_non_finite_scores_fail_the_table() {
        for bad in ["NaN", "inf", "-inf"] {
            let warehouse = memory_warehouse(&format!(
                "CREATE TABLE ROOM_RISK (PROPERTY_ID TEXT, ROOM_TYPE TEXT, ROOM_RISK_SCORE TEXT);
                 INSERT INTO ROOM_RISK VALUES ('P1', 'Kitchen', 80);
                 INSERT INTO ROOM_RISK VALUES ('P1', 'Attic', '{}');",
                bad
            ));
            let dataset = warehouse.load(&TableNames::default());
            assert!(dataset.rooms.is_empty(), "{} should not load", bad);
            let warning = dataset
                .warnings
                .iter()
                .find(|w| w.table == "ROOM_RISK")
                .unwrap_or_else(|| panic!("no ROOM_RISK warning for {}", bad));
            assert!(warning.message.contains("not a finite number"));
        }
    }
}
