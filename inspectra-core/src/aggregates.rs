//! Per-property aggregates over room rows
//!
//! Global invariants enforced:
//! - Aggregates are strictly derived (never stored, always computed)
//! - Total over any finite input, including an empty room set
//! - Coverage ratio never exceeds 1.0

use crate::model::Room;
use serde::{Deserialize, Serialize};

/// Rooms assumed to make up a full inspection
pub const FULL_INSPECTION_ROOMS: usize = 5;

/// Rooms needed before confidence is reported as High
pub const CONFIDENCE_MIN_ROOMS: usize = 3;

/// Room score at or above which a room counts as high-risk for the filter toggle
pub const HIGH_RISK_CUTOFF: f64 = 60.0;

/// Confidence in the overall score, from how many rooms were inspected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "High",
            Confidence::Medium => "Medium",
        }
    }
}

/// Coverage rules; defaults are the five-room inspection model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageRules {
    pub full_inspection_rooms: usize,
    pub confidence_min_rooms: usize,
}

impl Default for CoverageRules {
    fn default() -> Self {
        CoverageRules {
            full_inspection_rooms: FULL_INSPECTION_ROOMS,
            confidence_min_rooms: CONFIDENCE_MIN_ROOMS,
        }
    }
}

/// Summary metrics for one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PropertyAggregates {
    pub property_id: String,
    pub rooms_inspected: usize,
    pub confidence: Confidence,
    pub coverage_ratio: f64,
}

impl PropertyAggregates {
    /// Coverage as a rounded whole percentage
    pub fn coverage_percent(&self) -> u32 {
        (self.coverage_ratio * 100.0).round() as u32
    }
}

/// Room rows belonging to a property, in table order
pub fn rooms_for_property<'a>(rooms: &'a [Room], property_id: &str) -> Vec<&'a Room> {
    rooms
        .iter()
        .filter(|r| r.property_id == property_id)
        .collect()
}

/// Keep only rooms scoring at or above `cutoff`
pub fn high_risk_rooms<'a>(rooms: &[&'a Room], cutoff: f64) -> Vec<&'a Room> {
    rooms
        .iter()
        .copied()
        .filter(|r| r.room_risk_score >= cutoff)
        .collect()
}

/// High once at least `confidence_min_rooms` rooms are inspected
pub fn confidence_with_rules(rooms_inspected: usize, rules: &CoverageRules) -> Confidence {
    if rooms_inspected >= rules.confidence_min_rooms {
        Confidence::High
    } else {
        Confidence::Medium
    }
}

/// Fraction of a full inspection completed, capped at 1.0
pub fn coverage_ratio_with_rules(rooms_inspected: usize, rules: &CoverageRules) -> f64 {
    if rules.full_inspection_rooms == 0 {
        return 1.0;
    }
    (rooms_inspected as f64 / rules.full_inspection_rooms as f64).min(1.0)
}

/// Compute aggregates for a property with the default coverage rules
pub fn compute_property_aggregates(rooms: &[Room], property_id: &str) -> PropertyAggregates {
    compute_property_aggregates_with_rules(rooms, property_id, &CoverageRules::default())
}

/// Compute aggregates for a property with custom coverage rules
pub fn compute_property_aggregates_with_rules(
    rooms: &[Room],
    property_id: &str,
    rules: &CoverageRules,
) -> PropertyAggregates {
    let rooms_inspected = rooms
        .iter()
        .filter(|r| r.property_id == property_id)
        .count();

    PropertyAggregates {
        property_id: property_id.to_string(),
        rooms_inspected,
        confidence: confidence_with_rules(rooms_inspected, rules),
        coverage_ratio: coverage_ratio_with_rules(rooms_inspected, rules),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(property_id: &str, room_type: &str, score: f64) -> Room {
        Room {
            property_id: property_id.to_string(),
            room_type: room_type.to_string(),
            room_risk_score: score,
        }
    }

    fn rooms_for(property_id: &str, count: usize) -> Vec<Room> {
        (0..count)
            .map(|i| room(property_id, &format!("Room {}", i), 50.0))
            .collect()
    }

    #[test]
    fn test_three_rooms_is_high_confidence() {
        let rooms = rooms_for("P1", 3);
        let agg = compute_property_aggregates(&rooms, "P1");
        assert_eq!(agg.rooms_inspected, 3);
        assert_eq!(agg.confidence, Confidence::High);
        assert!((agg.coverage_ratio - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_two_rooms_is_medium_confidence() {
        let rooms = rooms_for("P1", 2);
        let agg = compute_property_aggregates(&rooms, "P1");
        assert_eq!(agg.rooms_inspected, 2);
        assert_eq!(agg.confidence, Confidence::Medium);
        assert!((agg.coverage_ratio - 0.4).abs() < 1e-9);
        assert_eq!(agg.coverage_percent(), 40);
    }

    #[test]
    fn test_coverage_clamped_at_full_inspection() {
        let rooms = rooms_for("P1", 7);
        let agg = compute_property_aggregates(&rooms, "P1");
        assert_eq!(agg.rooms_inspected, 7);
        assert_eq!(agg.coverage_ratio, 1.0);
        assert_eq!(coverage_ratio_with_rules(5, &CoverageRules::default()), 1.0);
    }

    #[test]
    fn test_empty_room_set() {
        let agg = compute_property_aggregates(&[], "P1");
        assert_eq!(agg.rooms_inspected, 0);
        assert_eq!(agg.confidence, Confidence::Medium);
        assert_eq!(agg.coverage_ratio, 0.0);
    }

    #[test]
    fn test_only_matching_property_counted() {
        let mut rooms = rooms_for("P1", 2);
        rooms.extend(rooms_for("P2", 4));
        assert_eq!(compute_property_aggregates(&rooms, "P1").rooms_inspected, 2);
        assert_eq!(compute_property_aggregates(&rooms, "P2").rooms_inspected, 4);
        assert_eq!(compute_property_aggregates(&rooms, "P3").rooms_inspected, 0);
    }

    #[test]
    fn test_high_risk_filter_keeps_order() {
        let rooms = vec![
            room("P1", "Kitchen", 85.0),
            room("P1", "Bedroom", 20.0),
            room("P1", "Bathroom", 60.0),
            room("P2", "Garage", 95.0),
        ];
        let mine = rooms_for_property(&rooms, "P1");
        let high = high_risk_rooms(&mine, HIGH_RISK_CUTOFF);
        let names: Vec<&str> = high.iter().map(|r| r.room_type.as_str()).collect();
        assert_eq!(names, vec!["Kitchen", "Bathroom"]);
    }

    #[test]
    fn test_custom_rules() {
        let rules = CoverageRules {
            full_inspection_rooms: 8,
            confidence_min_rooms: 5,
        };
        assert_eq!(confidence_with_rules(4, &rules), Confidence::Medium);
        assert_eq!(confidence_with_rules(5, &rules), Confidence::High);
        assert_eq!(coverage_ratio_with_rules(2, &rules), 0.25);
    }
}
