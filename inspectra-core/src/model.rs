//! Warehouse row types
//!
//! Every row is a read-only snapshot of an upstream table. Nothing in this crate
//! creates, mutates or deletes them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Placeholder shown when a defect image row has no URL
pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/200";

/// Label shown when a defect image row has no defect label
pub const UNKNOWN_DEFECT_LABEL: &str = "Unknown";

/// Overall property risk level, computed upstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            other => anyhow::bail!("unknown risk level: {:?}", other),
        }
    }
}

/// Lending decision published by the bank risk view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BankDecision {
    LoanReject,
    #[default]
    ManualReview,
    LoanApprove,
}

impl BankDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            BankDecision::LoanReject => "LOAN_REJECT",
            BankDecision::ManualReview => "MANUAL_REVIEW",
            BankDecision::LoanApprove => "LOAN_APPROVE",
        }
    }
}

impl fmt::Display for BankDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for BankDecision {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOAN_REJECT" => Ok(BankDecision::LoanReject),
            "MANUAL_REVIEW" => Ok(BankDecision::ManualReview),
            "LOAN_APPROVE" => Ok(BankDecision::LoanApprove),
            other => anyhow::bail!("unknown bank decision: {:?}", other),
        }
    }
}

/// Row of `PROPERTY_RISK`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Property {
    pub id: String,
    pub risk_level: RiskLevel,
    pub total_risk: f64,
}

/// Row of `ROOM_RISK`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Room {
    pub property_id: String,
    pub room_type: String,
    pub room_risk_score: f64,
}

/// Row of `PROPERTY_SUMMARY`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Summary {
    pub property_id: String,
    pub summary_text: String,
}

/// Row of `ROOM_IMAGES`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RoomImage {
    pub property_id: String,
    pub room_type: String,
    pub image_url: String,
    pub defect_label: String,
    pub defect_confidence: f64,
}

impl RoomImage {
    /// Detector confidence as a whole percentage (truncated)
    pub fn confidence_percent(&self) -> i64 {
        (self.defect_confidence * 100.0) as i64
    }
}

/// Row of `BANK_RISK_VIEW`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BankSignal {
    pub property_id: String,
    pub bank_decision: BankDecision,
}

/// Message recorded when a table could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoadWarning {
    pub table: String,
    pub message: String,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Data load failed ({}): {}", self.table, self.message)
    }
}

/// All five upstream tables, loaded once per view
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Dataset {
    pub properties: Vec<Property>,
    pub rooms: Vec<Room>,
    pub summaries: Vec<Summary>,
    pub images: Vec<RoomImage>,
    pub bank_signals: Vec<BankSignal>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<LoadWarning>,
}

impl Dataset {
    /// First property row with the given id
    pub fn property(&self, property_id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == property_id)
    }

    /// First summary row for the property
    pub fn summary_for(&self, property_id: &str) -> Option<&Summary> {
        self.summaries.iter().find(|s| s.property_id == property_id)
    }

    /// First bank signal row for the property
    pub fn bank_signal_for(&self, property_id: &str) -> Option<&BankSignal> {
        self.bank_signals
            .iter()
            .find(|b| b.property_id == property_id)
    }

    /// Image rows for the property, in table order
    pub fn images_for<'a>(&'a self, property_id: &'a str) -> impl Iterator<Item = &'a RoomImage> {
        self.images
            .iter()
            .filter(move |i| i.property_id == property_id)
    }
}
