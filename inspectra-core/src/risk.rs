//! Room risk tier classification
//!
//! Global invariants enforced:
//! - Classification is a pure function of the score and thresholds
//! - Thresholds are inclusive lower bounds (score >= high is HIGH)

use crate::model::{BankDecision, RiskLevel};
use serde::{Deserialize, Serialize};

/// Severity tier for a single room score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Safe,   // < 30
    Low,    // 30-60
    Medium, // 60-80
    High,   // >= 80
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Safe => "SAFE",
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        }
    }

    /// Title-case label used in the heatmap table
    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Safe => "Safe",
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }

    /// Human explanation of what drives a score in this tier
    pub fn explanation(&self) -> &'static str {
        match self {
            RiskTier::High => "Severe structural or safety defect",
            RiskTier::Medium => "Electrical hazard or dampness detected",
            RiskTier::Low => "Minor maintenance or finishing issue",
            RiskTier::Safe => "No significant defects found",
        }
    }

    /// One-line advice shown under a room explanation
    pub fn advisory(&self) -> &'static str {
        match self {
            RiskTier::High => "High-confidence safety risk",
            RiskTier::Medium => "Moderate risk, attention advised",
            RiskTier::Low => "Low risk, routine maintenance suggested",
            RiskTier::Safe => "Room appears safe",
        }
    }

    pub fn style(&self) -> Style {
        match self {
            RiskTier::High => Style::Error,
            RiskTier::Medium => Style::Warning,
            RiskTier::Low => Style::Info,
            RiskTier::Safe => Style::Success,
        }
    }

    /// Severity guide description
    pub fn guide(&self) -> &'static str {
        match self {
            RiskTier::High => "Structural or serious safety hazards",
            RiskTier::Medium => "Electrical/damp issues",
            RiskTier::Low => "Minor cosmetic/maintenance issues",
            RiskTier::Safe => "No visible defects",
        }
    }

    /// Highest tier first
    pub fn all() -> [RiskTier; 4] {
        [RiskTier::High, RiskTier::Medium, RiskTier::Low, RiskTier::Safe]
    }
}

/// Presentation severity for callouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    Error,
    Warning,
    Info,
    Success,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Error => "error",
            Style::Warning => "warning",
            Style::Info => "info",
            Style::Success => "success",
        }
    }
}

/// Configurable tier thresholds (inclusive lower bounds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        RiskThresholds {
            high: 80.0,
            medium: 60.0,
            low: 30.0,
        }
    }
}

/// Tier plus the explanation shown for it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: RiskTier,
    pub explanation: &'static str,
}

/// Classify a room score with the fixed default thresholds
pub fn classify(score: f64) -> Classification {
    classify_with_thresholds(score, &RiskThresholds::default())
}

/// Classify a room score with custom thresholds
pub fn classify_with_thresholds(score: f64, thresholds: &RiskThresholds) -> Classification {
    let tier = assign_tier_with_thresholds(score, thresholds);
    Classification {
        tier,
        explanation: tier.explanation(),
    }
}

/// Assign a tier with custom thresholds
pub fn assign_tier_with_thresholds(score: f64, thresholds: &RiskThresholds) -> RiskTier {
    if score >= thresholds.high {
        RiskTier::High
    } else if score >= thresholds.medium {
        RiskTier::Medium
    } else if score >= thresholds.low {
        RiskTier::Low
    } else {
        RiskTier::Safe
    }
}

/// Callout style for the plain-language summary, driven by the upstream level
pub fn summary_style(level: RiskLevel) -> Style {
    match level {
        RiskLevel::High => Style::Error,
        RiskLevel::Medium => Style::Warning,
        RiskLevel::Low => Style::Success,
    }
}

/// Callout style and message for a lending decision
pub fn bank_advice(decision: BankDecision) -> (Style, &'static str) {
    match decision {
        BankDecision::LoanReject => (Style::Error, "Loan not recommended due to safety risks"),
        BankDecision::ManualReview => (Style::Warning, "Manual review required"),
        BankDecision::LoanApprove => (
            Style::Success,
            "Property suitable for standard loan approval",
        ),
    }
}

/// Score range covered by a tier, for the severity guide
///
/// Returns `(min, max)` where `max` is `None` for the open-ended top tier and
/// `min` is `None` for the open-ended bottom tier.
pub fn tier_range(tier: RiskTier, thresholds: &RiskThresholds) -> (Option<f64>, Option<f64>) {
    match tier {
        RiskTier::High => (Some(thresholds.high), None),
        RiskTier::Medium => (Some(thresholds.medium), Some(thresholds.high)),
        RiskTier::Low => (Some(thresholds.low), Some(thresholds.medium)),
        RiskTier::Safe => (None, Some(thresholds.low)),
    }
}

/// Human-readable score range for a tier, e.g. `60 <= score < 80`
pub fn range_text(tier: RiskTier, thresholds: &RiskThresholds) -> String {
    match tier_range(tier, thresholds) {
        (Some(min), Some(max)) => format!("{} <= score < {}", min, max),
        (Some(min), None) => format!("score >= {}", min),
        (None, Some(max)) => format!("score < {}", max),
        (None, None) => "any score".to_string(),
    }
}
