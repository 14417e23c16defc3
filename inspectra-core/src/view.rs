//! Dashboard view assembly
//!
//! A [`DashboardView`] is everything shown for one property, computed in one pass
//! from a loaded [`Dataset`]. Views are rebuilt from scratch for every request;
//! nothing is cached between them.

use crate::aggregates::{self, CoverageRules, PropertyAggregates, HIGH_RISK_CUTOFF};
use crate::model::{BankDecision, Dataset, LoadWarning, Property, RiskLevel};
use crate::risk::{self, RiskThresholds, RiskTier, Style};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why a view could not be built
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("No inspection data available yet.")]
    NoInspectionData,
    #[error("unknown property: {0}")]
    UnknownProperty(String),
}

/// Inspection focus selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InspectionFocus {
    #[default]
    Overall,
    Structural,
    Electrical,
    Finishing,
}

impl InspectionFocus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InspectionFocus::Overall => "Overall",
            InspectionFocus::Structural => "Structural",
            InspectionFocus::Electrical => "Electrical",
            InspectionFocus::Finishing => "Finishing",
        }
    }
}

impl fmt::Display for InspectionFocus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for InspectionFocus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overall" => Ok(InspectionFocus::Overall),
            "structural" => Ok(InspectionFocus::Structural),
            "electrical" => Ok(InspectionFocus::Electrical),
            "finishing" => Ok(InspectionFocus::Finishing),
            other => anyhow::bail!("unknown inspection focus: {:?}", other),
        }
    }
}

/// Viewer controls
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewOptions {
    pub focus: InspectionFocus,
    pub only_high_risk: bool,
}

/// Scoring rules applied while building a view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRules {
    pub thresholds: RiskThresholds,
    pub high_risk_cutoff: f64,
    pub coverage: CoverageRules,
}

impl Default for ViewRules {
    fn default() -> Self {
        ViewRules {
            thresholds: RiskThresholds::default(),
            high_risk_cutoff: HIGH_RISK_CUTOFF,
            coverage: CoverageRules::default(),
        }
    }
}

impl From<&crate::config::ResolvedConfig> for ViewRules {
    fn from(config: &crate::config::ResolvedConfig) -> Self {
        ViewRules {
            thresholds: config.thresholds,
            high_risk_cutoff: config.high_risk_cutoff,
            coverage: config.coverage,
        }
    }
}

/// One room with its classification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RoomFinding {
    pub room_type: String,
    pub score: f64,
    pub tier: RiskTier,
    pub label: &'static str,
    pub explanation: &'static str,
    pub advisory: &'static str,
    pub style: Style,
}

/// Plain-language summary callout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SummaryCallout {
    pub text: Option<String>,
    pub style: Style,
}

/// One defect image card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DefectImage {
    pub room_type: String,
    pub image_url: String,
    pub defect_label: String,
    pub confidence_percent: i64,
}

/// Bank/mortgage signal callout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BankCallout {
    pub decision: BankDecision,
    /// False when the bank view had no row and the default decision is shown
    pub from_warehouse: bool,
    pub style: Style,
    pub message: &'static str,
}

/// One point of the risk trend series
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TrendPoint {
    pub sequence: usize,
    pub property_id: String,
    pub total_risk: f64,
}

/// Everything shown for one property
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DashboardView {
    pub property: Property,
    pub focus: InspectionFocus,
    pub only_high_risk: bool,
    pub aggregates: PropertyAggregates,
    pub rooms: Vec<RoomFinding>,
    pub summary: SummaryCallout,
    pub images: Vec<DefectImage>,
    pub bank: BankCallout,
    pub trend: Vec<TrendPoint>,
    pub thresholds: RiskThresholds,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<LoadWarning>,
}

impl DashboardView {
    pub fn risk_level(&self) -> RiskLevel {
        self.property.risk_level
    }
}

/// Unique property ids in first-seen order
pub fn property_ids(dataset: &Dataset) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    dataset
        .properties
        .iter()
        .map(|p| p.id.as_str())
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Build a view with the default scoring rules
pub fn build_view(
    dataset: &Dataset,
    property_id: &str,
    options: ViewOptions,
) -> Result<DashboardView, ViewError> {
    build_view_with_rules(dataset, property_id, options, &ViewRules::default())
}

/// Build a view with custom scoring rules
pub fn build_view_with_rules(
    dataset: &Dataset,
    property_id: &str,
    options: ViewOptions,
    rules: &ViewRules,
) -> Result<DashboardView, ViewError> {
    if dataset.properties.is_empty() {
        return Err(ViewError::NoInspectionData);
    }
    let property = dataset
        .property(property_id)
        .ok_or_else(|| ViewError::UnknownProperty(property_id.to_string()))?;

    let aggregates = aggregates::compute_property_aggregates_with_rules(
        &dataset.rooms,
        property_id,
        &rules.coverage,
    );

    let mut shown = aggregates::rooms_for_property(&dataset.rooms, property_id);
    if options.only_high_risk {
        shown = aggregates::high_risk_rooms(&shown, rules.high_risk_cutoff);
    }
    let rooms = shown
        .into_iter()
        .map(|room| {
            let tier = risk::assign_tier_with_thresholds(room.room_risk_score, &rules.thresholds);
            RoomFinding {
                room_type: room.room_type.clone(),
                score: room.room_risk_score,
                tier,
                label: tier.label(),
                explanation: tier.explanation(),
                advisory: tier.advisory(),
                style: tier.style(),
            }
        })
        .collect();

    let summary = SummaryCallout {
        text: dataset
            .summary_for(property_id)
            .map(|s| s.summary_text.clone()),
        style: risk::summary_style(property.risk_level),
    };

    let images = dataset
        .images_for(property_id)
        .map(|image| DefectImage {
            room_type: image.room_type.clone(),
            image_url: image.image_url.clone(),
            defect_label: image.defect_label.clone(),
            confidence_percent: image.confidence_percent(),
        })
        .collect();

    let signal = dataset.bank_signal_for(property_id);
    let decision = signal.map(|b| b.bank_decision).unwrap_or_default();
    let (style, message) = risk::bank_advice(decision);
    let bank = BankCallout {
        decision,
        from_warehouse: signal.is_some(),
        style,
        message,
    };

    let trend = dataset
        .properties
        .iter()
        .enumerate()
        .map(|(i, p)| TrendPoint {
            sequence: i + 1,
            property_id: p.id.clone(),
            total_risk: p.total_risk,
        })
        .collect();

    Ok(DashboardView {
        property: property.clone(),
        focus: options.focus,
        only_high_risk: options.only_high_risk,
        aggregates,
        rooms,
        summary,
        images,
        bank,
        trend,
        thresholds: rules.thresholds,
        warnings: dataset.warnings.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregates::Confidence;
    use crate::model::{BankSignal, Room, RoomImage, Summary};

    fn dataset() -> Dataset {
        let room = |pid: &str, name: &str, score: f64| Room {
            property_id: pid.to_string(),
            room_type: name.to_string(),
            room_risk_score: score,
        };
        Dataset {
            properties: vec![
                Property {
                    id: "P1".to_string(),
                    risk_level: RiskLevel::High,
                    total_risk: 245.0,
                },
                Property {
                    id: "P2".to_string(),
                    risk_level: RiskLevel::Low,
                    total_risk: 40.0,
                },
                Property {
                    id: "P1".to_string(),
                    risk_level: RiskLevel::Low,
                    total_risk: 10.0,
                },
            ],
            rooms: vec![
                room("P1", "Kitchen", 85.0),
                room("P1", "Bedroom", 20.0),
                room("P1", "Bathroom", 65.0),
                room("P2", "Living Room", 40.0),
            ],
            summaries: vec![Summary {
                property_id: "P1".to_string(),
                summary_text: "Kitchen wiring needs urgent work.".to_string(),
            }],
            images: vec![RoomImage {
                property_id: "P1".to_string(),
                room_type: "Kitchen".to_string(),
                image_url: "https://img.example/k.jpg".to_string(),
                defect_label: "Exposed wiring".to_string(),
                defect_confidence: 0.93,
            }],
            bank_signals: vec![BankSignal {
                property_id: "P1".to_string(),
                bank_decision: BankDecision::LoanReject,
            }],
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_empty_property_table_halts() {
        let err = build_view(&Dataset::default(), "P1", ViewOptions::default()).unwrap_err();
        assert_eq!(err, ViewError::NoInspectionData);
        assert_eq!(err.to_string(), "No inspection data available yet.");
    }

    #[test]
    fn test_unknown_property() {
        let err = build_view(&dataset(), "P9", ViewOptions::default()).unwrap_err();
        assert_eq!(err, ViewError::UnknownProperty("P9".to_string()));
    }

    #[test]
    fn test_first_property_row_wins() {
        let view = build_view(&dataset(), "P1", ViewOptions::default()).unwrap();
        assert_eq!(view.property.total_risk, 245.0);
        assert_eq!(view.risk_level(), RiskLevel::High);
    }

    #[test]
    fn test_full_view() {
        let view = build_view(&dataset(), "P1", ViewOptions::default()).unwrap();
        assert_eq!(view.aggregates.rooms_inspected, 3);
        assert_eq!(view.aggregates.confidence, Confidence::High);
        assert_eq!(view.rooms.len(), 3);
        assert_eq!(view.rooms[0].tier, RiskTier::High);
        assert_eq!(view.rooms[1].label, "Safe");
        assert_eq!(view.rooms[2].style, Style::Warning);
        assert_eq!(view.summary.style, Style::Error);
        assert_eq!(
            view.summary.text.as_deref(),
            Some("Kitchen wiring needs urgent work.")
        );
        assert_eq!(view.images.len(), 1);
        assert_eq!(view.images[0].confidence_percent, 93);
        assert_eq!(view.bank.decision, BankDecision::LoanReject);
        assert!(view.bank.from_warehouse);
        assert_eq!(view.trend.len(), 3);
        assert_eq!(view.trend[1].sequence, 2);
    }

    #[test]
    fn test_high_risk_toggle_filters_rooms_not_aggregates() {
        let options = ViewOptions {
            only_high_risk: true,
            ..ViewOptions::default()
        };
        let view = build_view(&dataset(), "P1", options).unwrap();
        let names: Vec<&str> = view.rooms.iter().map(|r| r.room_type.as_str()).collect();
        assert_eq!(names, vec!["Kitchen", "Bathroom"]);
        assert_eq!(view.aggregates.rooms_inspected, 3);
    }

    #[test]
    fn test_missing_secondary_rows_degrade() {
        let view = build_view(&dataset(), "P2", ViewOptions::default()).unwrap();
        assert!(view.summary.text.is_none());
        assert_eq!(view.summary.style, Style::Success);
        assert!(view.images.is_empty());
        assert_eq!(view.bank.decision, BankDecision::ManualReview);
        assert!(!view.bank.from_warehouse);
        assert_eq!(view.aggregates.confidence, Confidence::Medium);
    }

    #[test]
    fn test_property_without_rooms() {
        let mut data = dataset();
        data.rooms.clear();
        let view = build_view(&data, "P1", ViewOptions::default()).unwrap();
        assert!(view.rooms.is_empty());
        assert_eq!(view.aggregates.rooms_inspected, 0);
        assert_eq!(view.aggregates.coverage_ratio, 0.0);
    }

    #[test]
    fn test_property_ids_unique_in_order() {
        assert_eq!(property_ids(&dataset()), vec!["P1", "P2"]);
    }

    #[test]
    fn test_focus_parse() {
        assert_eq!(
            "Electrical".parse::<InspectionFocus>().unwrap(),
            InspectionFocus::Electrical
        );
        assert!("plumbing".parse::<InspectionFocus>().is_err());
    }
}
