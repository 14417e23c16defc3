//! Configuration file support for Inspectra
//!
//! Loads dashboard configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.inspectrarc.json` in the working directory
//! 3. `inspectra.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::aggregates::{
    CoverageRules, CONFIDENCE_MIN_ROOMS, FULL_INSPECTION_ROOMS, HIGH_RISK_CUTOFF,
};
use crate::risk::RiskThresholds;
use crate::warehouse::TableNames;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Inspectra configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InspectraConfig {
    /// Path to the SQLite warehouse
    #[serde(default)]
    pub database: Option<PathBuf>,

    /// Table name overrides
    #[serde(default)]
    pub tables: Option<TableConfig>,

    /// Custom room tier thresholds
    #[serde(default)]
    pub thresholds: Option<ThresholdConfig>,

    /// Score at or above which a room is shown by the high-risk toggle (default: 60)
    #[serde(default)]
    pub high_risk_cutoff: Option<f64>,

    /// Rooms in a full inspection (default: 5)
    #[serde(default)]
    pub full_inspection_rooms: Option<usize>,

    /// Rooms required for High confidence (default: 3)
    #[serde(default)]
    pub confidence_min_rooms: Option<usize>,
}

/// Table name overrides
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableConfig {
    pub property: Option<String>,
    pub room: Option<String>,
    pub summary: Option<String>,
    pub image: Option<String>,
    pub bank: Option<String>,
}

/// Custom room tier thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Lower bound of HIGH (default: 80)
    pub high: Option<f64>,
    /// Lower bound of MEDIUM (default: 60)
    pub medium: Option<f64>,
    /// Lower bound of LOW (default: 30)
    pub low: Option<f64>,
}

/// Resolved configuration with defaults filled in
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    pub database: Option<PathBuf>,
    pub tables: TableNames,
    pub thresholds: RiskThresholds,
    pub high_risk_cutoff: f64,
    pub coverage: CoverageRules,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl InspectraConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref t) = self.thresholds {
            let defaults = RiskThresholds::default();
            let high = t.high.unwrap_or(defaults.high);
            let medium = t.medium.unwrap_or(defaults.medium);
            let low = t.low.unwrap_or(defaults.low);

            for (name, val) in [("high", high), ("medium", medium), ("low", low)] {
                if !val.is_finite() || val <= 0.0 {
                    anyhow::bail!("thresholds.{} must be positive (got {})", name, val);
                }
            }
            if low >= medium {
                anyhow::bail!(
                    "thresholds.low ({}) must be less than thresholds.medium ({})",
                    low,
                    medium
                );
            }
            if medium >= high {
                anyhow::bail!(
                    "thresholds.medium ({}) must be less than thresholds.high ({})",
                    medium,
                    high
                );
            }
        }

        if let Some(cutoff) = self.high_risk_cutoff {
            if !cutoff.is_finite() || cutoff < 0.0 {
                anyhow::bail!("high_risk_cutoff must be non-negative (got {})", cutoff);
            }
        }

        if self.full_inspection_rooms == Some(0) {
            anyhow::bail!("full_inspection_rooms must be at least 1");
        }
        if self.confidence_min_rooms == Some(0) {
            anyhow::bail!("confidence_min_rooms must be at least 1");
        }

        if let Some(ref tables) = self.tables {
            for (name, val) in [
                ("property", &tables.property),
                ("room", &tables.room),
                ("summary", &tables.summary),
                ("image", &tables.image),
                ("bank", &tables.bank),
            ] {
                if let Some(v) = val {
                    TableNames::check_name(v)
                        .with_context(|| format!("invalid tables.{}", name))?;
                }
            }
        }

        Ok(())
    }

    /// Resolve config into the form used by the loader and view
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let defaults = RiskThresholds::default();
        let thresholds = match &self.thresholds {
            Some(t) => RiskThresholds {
                high: t.high.unwrap_or(defaults.high),
                medium: t.medium.unwrap_or(defaults.medium),
                low: t.low.unwrap_or(defaults.low),
            },
            None => defaults,
        };

        let mut tables = TableNames::default();
        if let Some(ref t) = self.tables {
            if let Some(ref v) = t.property {
                tables.property = v.clone();
            }
            if let Some(ref v) = t.room {
                tables.room = v.clone();
            }
            if let Some(ref v) = t.summary {
                tables.summary = v.clone();
            }
            if let Some(ref v) = t.image {
                tables.image = v.clone();
            }
            if let Some(ref v) = t.bank {
                tables.bank = v.clone();
            }
        }

        Ok(ResolvedConfig {
            database: self.database.clone(),
            tables,
            thresholds,
            high_risk_cutoff: self.high_risk_cutoff.unwrap_or(HIGH_RISK_CUTOFF),
            coverage: CoverageRules {
                full_inspection_rooms: self
                    .full_inspection_rooms
                    .unwrap_or(FULL_INSPECTION_ROOMS),
                confidence_min_rooms: self.confidence_min_rooms.unwrap_or(CONFIDENCE_MIN_ROOMS),
            },
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        InspectraConfig::default().resolve()
    }
}

/// Discover and load a config file from a directory
///
/// Search order:
/// 1. `.inspectrarc.json`
/// 2. `inspectra.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(dir: &Path) -> Result<Option<(InspectraConfig, PathBuf)>> {
    for name in [".inspectrarc.json", "inspectra.config.json"] {
        let path = dir.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<InspectraConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: InspectraConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in `dir`.
/// Returns default config if nothing is found.
pub fn load_and_resolve(dir: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(dir)? {
            Some((config, path)) => (config, Some(path)),
            None => (InspectraConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    resolved.config_path = source_path;
    Ok(resolved)
}
