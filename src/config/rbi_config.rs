//! RBI Configuration - every interval, weight and band as operator-tunable TOML
//!
//! Each struct implements `Default` with a representative 5×5 semi-quantitative
//! scheme, so an empty or partial file always yields a complete configuration.
//! Organisations should replace the numeric tables with values from their
//! applicable risk-based-inspection standard.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::bands::{validate_bands, RiskCategoryBand, ScoreBand};
use super::defaults::{
    CONFIG_ENV_VAR, COF_MAX, COF_MIN, LOCAL_CONFIG_FILE, RISK_SCORE_MAX, RISK_SCORE_MIN,
    WEIGHT_SUM_TOLERANCE,
};
use crate::types::{CriticalityLevel, EquipmentType, RBILevel, RiskLevel, ServiceType};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for the RBI engine.
///
/// Load with `RBIConfig::load()` which searches:
/// 1. `$RBI_CONFIG` env var
/// 2. `./rbi_config.toml`
/// 3. Built-in defaults
///
/// Read-only to the engine; shared across concurrent calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RBIConfig {
    /// Global interval clamp applied at every level
    #[serde(default)]
    pub intervals: IntervalBounds,

    #[serde(default)]
    pub level1: Level1Settings,

    #[serde(default)]
    pub level2: Level2Settings,

    #[serde(default)]
    pub level3: Level3Settings,

    #[serde(default)]
    pub level4: Level4Settings,

    /// Conservatism applied per skipped level
    #[serde(default)]
    pub fallback: FallbackSettings,

    #[serde(default)]
    pub corrosion: CorrosionSettings,

    #[serde(default)]
    pub data_quality: DataQualitySettings,

    /// Consequence profile per service type, keyed by `ServiceType::as_str()`.
    /// A service without an entry is not resolvable for Level 4.
    #[serde(default = "default_service_risk")]
    pub service_risk: BTreeMap<String, ServiceRiskProfile>,

    /// Economic consequence per equipment type (1-5), keyed by `EquipmentType::as_str()`
    #[serde(default = "default_equipment_consequence")]
    pub equipment_consequence: BTreeMap<String, f64>,
}

impl Default for RBIConfig {
    fn default() -> Self {
        Self {
            intervals: IntervalBounds::default(),
            level1: Level1Settings::default(),
            level2: Level2Settings::default(),
            level3: Level3Settings::default(),
            level4: Level4Settings::default(),
            fallback: FallbackSettings::default(),
            corrosion: CorrosionSettings::default(),
            data_quality: DataQualitySettings::default(),
            service_risk: default_service_risk(),
            equipment_consequence: default_equipment_consequence(),
        }
    }
}

impl RBIConfig {
    /// Load configuration using the standard search order:
    /// 1. `$RBI_CONFIG` environment variable
    /// 2. `./rbi_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded RBI config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        // 2. Check ./rbi_config.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded RBI config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        // 3. Defaults
        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        // Two-pass: check for unknown keys first (warnings only)
        for w in super::validation::validate_unknown_keys(&contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Save config to a file.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "RBI config saved");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Per-level accessors
    // ------------------------------------------------------------------------

    pub fn base_interval_months(&self, level: RBILevel) -> f64 {
        match level {
            RBILevel::Level1 => self.level1.base_interval_months,
            RBILevel::Level2 => self.level2.base_interval_months,
            RBILevel::Level3 => self.level3.base_interval_months,
            RBILevel::Level4 => self.level4.base_interval_months,
        }
    }

    /// Confidence baseline of a level's method, before any fallback penalty.
    pub fn level_confidence(&self, level: RBILevel) -> f64 {
        match level {
            RBILevel::Level1 => self.level1.confidence,
            RBILevel::Level2 => self.level2.confidence,
            RBILevel::Level3 => self.level3.confidence,
            RBILevel::Level4 => self.level4.confidence,
        }
    }

    pub fn risk_categories(&self, level: RBILevel) -> &[RiskCategoryBand] {
        match level {
            RBILevel::Level1 => &self.level1.risk_categories,
            RBILevel::Level2 => &self.level2.risk_categories,
            RBILevel::Level3 => &self.level3.risk_categories,
            RBILevel::Level4 => &self.level4.risk_categories,
        }
    }

    pub fn service_profile(&self, service: ServiceType) -> Option<&ServiceRiskProfile> {
        self.service_risk.get(service.as_str())
    }

    pub fn equipment_consequence_for(&self, equipment: EquipmentType) -> Option<f64> {
        self.equipment_consequence.get(equipment.as_str()).copied()
    }

    /// Clamp an interval to the global `[min, max]` bounds.
    pub fn clamp_interval(&self, months: f64) -> f64 {
        months.clamp(
            self.intervals.min_interval_months,
            self.intervals.max_interval_months,
        )
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Validate the whole configuration for internal consistency.
    ///
    /// Rules:
    /// - Interval bounds positive, min < max; base intervals positive
    /// - Every risk-category table covers the risk score domain without gaps
    ///   or shadowed bands; interval factors positive
    /// - Level confidences in (0, 1] and ascending by level
    /// - Fallback factor in (0, 1), reduction in (0, 1), floor below every
    ///   level confidence
    /// - Weight sets sum to ~1.0; data-quality weights non-negative
    /// - Every number finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let iv = &self.intervals;
        if !(iv.min_interval_months > 0.0) {
            errors.push("intervals.min_interval_months must be > 0".to_string());
        }
        if iv.max_interval_months <= iv.min_interval_months {
            errors.push(format!(
                "intervals.max_interval_months ({:.1}) must be > min_interval_months ({:.1})",
                iv.max_interval_months, iv.min_interval_months
            ));
        }

        let mut previous_confidence = 0.0;
        for level in RBILevel::ALL {
            let key = format!("level{}", level.as_u8());

            if !(self.base_interval_months(level) > 0.0) {
                errors.push(format!("{key}.base_interval_months must be > 0"));
            }

            let confidence = self.level_confidence(level);
            if !(confidence > 0.0 && confidence <= 1.0) {
                errors.push(format!("{key}.confidence ({confidence:.2}) must be in (0, 1]"));
            }
            if confidence <= previous_confidence {
                errors.push(format!(
                    "{key}.confidence ({confidence:.2}) must be greater than the level below ({previous_confidence:.2})"
                ));
            }
            previous_confidence = confidence;

            let bands = self.risk_categories(level);
            validate_bands(
                &format!("{key}.risk_categories"),
                bands,
                RISK_SCORE_MIN,
                RISK_SCORE_MAX,
                &mut errors,
            );
            for (i, band) in bands.iter().enumerate() {
                if !(band.interval_factor > 0.0) {
                    errors.push(format!(
                        "{key}.risk_categories[{i}].interval_factor must be > 0"
                    ));
                }
            }
        }

        for (ty, multiplier) in &self.level1.equipment_multipliers {
            if !(*multiplier > 0.0) {
                errors.push(format!("level1.equipment_multipliers.{ty} must be > 0"));
            }
        }

        let l2 = &self.level2;
        Self::check_weight_sum(
            "level2 pof weights (coating + damage + age)",
            l2.coating_weight + l2.damage_weight + l2.age_weight,
            &mut errors,
        );
        validate_bands("level2.age_bands", &l2.age_bands, 0.0, 0.0, &mut errors);
        if l2.damage_score_per_mechanism < 0.0 {
            errors.push("level2.damage_score_per_mechanism cannot be negative".to_string());
        }
        if l2.default_age_years < 0.0 {
            errors.push("level2.default_age_years cannot be negative".to_string());
        }

        let l3 = &self.level3;
        validate_bands(
            "level3.remaining_life_bands",
            &l3.remaining_life_bands,
            0.0,
            0.0,
            &mut errors,
        );
        if !(l3.remaining_life_fraction > 0.0 && l3.remaining_life_fraction <= 1.0) {
            errors.push(format!(
                "level3.remaining_life_fraction ({:.2}) must be in (0, 1]",
                l3.remaining_life_fraction
            ));
        }

        let cm = &self.level4.criticality_multipliers;
        for (name, value) in [
            ("low", cm.low),
            ("medium", cm.medium),
            ("high", cm.high),
            ("critical", cm.critical),
        ] {
            if !(value > 0.0) {
                errors.push(format!("level4.criticality_multipliers.{name} must be > 0"));
            }
        }

        let fb = &self.fallback;
        if !(fb.adjustment_factor > 0.0 && fb.adjustment_factor < 1.0) {
            errors.push(format!(
                "fallback.adjustment_factor ({:.2}) must be in (0, 1)",
                fb.adjustment_factor
            ));
        }
        if !(fb.confidence_reduction > 0.0 && fb.confidence_reduction < 1.0) {
            errors.push(format!(
                "fallback.confidence_reduction ({:.2}) must be in (0, 1)",
                fb.confidence_reduction
            ));
        }
        if !(fb.confidence_floor >= 0.0) {
            errors.push("fallback.confidence_floor cannot be negative".to_string());
        }
        if fb.confidence_floor >= self.level1.confidence {
            errors.push(format!(
                "fallback.confidence_floor ({:.2}) must be below every level confidence (level1 = {:.2})",
                fb.confidence_floor, self.level1.confidence
            ));
        }
        if !(fb.interval_multiplier_floor > 0.0 && fb.interval_multiplier_floor <= 1.0) {
            errors.push(format!(
                "fallback.interval_multiplier_floor ({:.2}) must be in (0, 1]",
                fb.interval_multiplier_floor
            ));
        }

        if !(self.corrosion.min_corrosion_rate_mm_per_year > 0.0) {
            errors.push("corrosion.min_corrosion_rate_mm_per_year must be > 0 (used as divisor)".to_string());
        }

        let dq = &self.data_quality;
        if dq.staleness_threshold_days == 0 {
            errors.push("data_quality.staleness_threshold_days must be > 0".to_string());
        }
        if !(dq.staleness_penalty > 0.0 && dq.staleness_penalty <= 1.0) {
            errors.push(format!(
                "data_quality.staleness_penalty ({:.2}) must be in (0, 1]",
                dq.staleness_penalty
            ));
        }
        for (name, weight) in dq.weights.entries() {
            if weight < 0.0 {
                errors.push(format!("data_quality.weights.{name} cannot be negative"));
            }
        }
        Self::check_weight_sum("data_quality.weights", dq.weights.sum(), &mut errors);

        for (service, profile) in &self.service_risk {
            for (dim, value) in [
                ("safety", profile.safety),
                ("environmental", profile.environmental),
                ("economic", profile.economic),
            ] {
                if !(COF_MIN..=COF_MAX).contains(&value) {
                    errors.push(format!(
                        "service_risk.{service}.{dim} ({value:.2}) must be within {COF_MIN}-{COF_MAX}"
                    ));
                }
            }
        }
        for (equipment, value) in &self.equipment_consequence {
            if !(COF_MIN..=COF_MAX).contains(value) {
                errors.push(format!(
                    "equipment_consequence.{equipment} ({value:.2}) must be within {COF_MIN}-{COF_MAX}"
                ));
            }
        }

        // Suspicious-but-legal values
        for w in super::validation::validate_operating_ranges(self) {
            warn!("{}", w);
        }

        // Reject NaN/Inf in any numeric field; map keys are free-form text
        match toml::Value::try_from(self) {
            Ok(tree) => collect_non_finite(&tree, "", &mut errors),
            Err(e) => errors.push(format!("Config could not be inspected for NaN/Inf: {e}")),
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_weight_sum(name: &str, sum: f64, errors: &mut Vec<String>) {
        if !sum.is_finite() || (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            errors.push(format!("{name} must sum to ~1.0, got {sum:.2}"));
        }
    }
}

fn collect_non_finite(value: &toml::Value, path: &str, errors: &mut Vec<String>) {
    match value {
        toml::Value::Float(f) if !f.is_finite() => {
            errors.push(format!("{path} must be a finite number, got {f}"));
        }
        toml::Value::Table(table) => {
            for (key, child) in table {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                collect_non_finite(child, &child_path, errors);
            }
        }
        toml::Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect_non_finite(child, &format!("{path}[{i}]"), errors);
            }
        }
        _ => {}
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Interval Bounds
// ============================================================================

/// Every computed interval is clamped into `[min, max]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalBounds {
    #[serde(default = "default_min_interval")]
    pub min_interval_months: f64,

    #[serde(default = "default_max_interval")]
    pub max_interval_months: f64,
}

fn default_min_interval() -> f64 { 6.0 }
fn default_max_interval() -> f64 { 120.0 }

impl Default for IntervalBounds {
    fn default() -> Self {
        Self {
            min_interval_months: default_min_interval(),
            max_interval_months: default_max_interval(),
        }
    }
}

// ============================================================================
// Level 1 - fixed interval by equipment type
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level1Settings {
    #[serde(default = "default_l1_base")]
    pub base_interval_months: f64,

    /// Low: the method ignores condition data entirely
    #[serde(default = "default_l1_confidence")]
    pub confidence: f64,

    /// Level 1 computes no consequence, so its risk score is always 0.
    /// The default single band reports every Level 1 result as Medium.
    #[serde(default = "default_l1_risk_categories")]
    pub risk_categories: Vec<RiskCategoryBand>,

    /// Interval multiplier per equipment type, keyed by `EquipmentType::as_str()`.
    /// Unlisted types use 1.0 and report the multiplier as estimated.
    #[serde(default = "default_equipment_multipliers")]
    pub equipment_multipliers: BTreeMap<String, f64>,
}

fn default_l1_base() -> f64 { 36.0 }
fn default_l1_confidence() -> f64 { 0.40 }

fn default_l1_risk_categories() -> Vec<RiskCategoryBand> {
    vec![RiskCategoryBand::new(RISK_SCORE_MIN, RISK_SCORE_MAX, RiskLevel::Medium, 1.0)]
}

fn default_equipment_multipliers() -> BTreeMap<String, f64> {
    [
        (EquipmentType::PressureVessel, 1.0),
        (EquipmentType::HeatExchanger, 0.9),
        (EquipmentType::Piping, 0.8),
        (EquipmentType::StorageTank, 1.2),
        (EquipmentType::Column, 1.0),
        (EquipmentType::Reactor, 0.75),
        (EquipmentType::Pump, 1.0),
        (EquipmentType::Compressor, 0.9),
        (EquipmentType::ReliefValve, 0.67),
        (EquipmentType::Other, 1.0),
    ]
    .into_iter()
    .map(|(ty, m)| (ty.as_str().to_string(), m))
    .collect()
}

impl Default for Level1Settings {
    fn default() -> Self {
        Self {
            base_interval_months: default_l1_base(),
            confidence: default_l1_confidence(),
            risk_categories: default_l1_risk_categories(),
            equipment_multipliers: default_equipment_multipliers(),
        }
    }
}

// ============================================================================
// Level 2 - semi-quantitative weighted PoF table
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level2Settings {
    #[serde(default = "default_l2_base")]
    pub base_interval_months: f64,

    #[serde(default = "default_l2_confidence")]
    pub confidence: f64,

    #[serde(default = "default_semi_quant_risk_categories")]
    pub risk_categories: Vec<RiskCategoryBand>,

    /// Weight of the coating condition factor in PoF
    #[serde(default = "default_coating_weight")]
    pub coating_weight: f64,

    /// Weight of the damage mechanism factor in PoF
    #[serde(default = "default_damage_weight")]
    pub damage_weight: f64,

    /// Weight of the equipment age factor in PoF
    #[serde(default = "default_age_weight")]
    pub age_weight: f64,

    /// Damage factor = 1 + count × this, capped at 5
    #[serde(default = "default_damage_score_per_mechanism")]
    pub damage_score_per_mechanism: f64,

    /// Equipment age (years) → PoF factor
    #[serde(default = "default_age_bands")]
    pub age_bands: Vec<ScoreBand>,

    /// Assumed age when the installation date is unknown
    #[serde(default = "default_age_years")]
    pub default_age_years: f64,
}

fn default_l2_base() -> f64 { 60.0 }
fn default_l2_confidence() -> f64 { 0.60 }
fn default_coating_weight() -> f64 { 0.40 }
fn default_damage_weight() -> f64 { 0.35 }
fn default_age_weight() -> f64 { 0.25 }
fn default_damage_score_per_mechanism() -> f64 { 1.0 }
fn default_age_years() -> f64 { 20.0 }

fn default_semi_quant_risk_categories() -> Vec<RiskCategoryBand> {
    vec![
        RiskCategoryBand::new(0.0, 6.0, RiskLevel::Low, 1.0),
        RiskCategoryBand::new(6.0, 12.0, RiskLevel::Medium, 0.6),
        RiskCategoryBand::new(12.0, RISK_SCORE_MAX, RiskLevel::High, 0.3),
    ]
}

fn default_age_bands() -> Vec<ScoreBand> {
    vec![
        ScoreBand::new(0.0, 5.0, 1.0),
        ScoreBand::new(5.0, 10.0, 2.0),
        ScoreBand::new(10.0, 20.0, 3.0),
        ScoreBand::new(20.0, 30.0, 4.0),
        ScoreBand::new(30.0, 200.0, 5.0),
    ]
}

impl Default for Level2Settings {
    fn default() -> Self {
        Self {
            base_interval_months: default_l2_base(),
            confidence: default_l2_confidence(),
            risk_categories: default_semi_quant_risk_categories(),
            coating_weight: default_coating_weight(),
            damage_weight: default_damage_weight(),
            age_weight: default_age_weight(),
            damage_score_per_mechanism: default_damage_score_per_mechanism(),
            age_bands: default_age_bands(),
            default_age_years: default_age_years(),
        }
    }
}

// ============================================================================
// Level 3 - quantitative remaining life
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level3Settings {
    #[serde(default = "default_l3_base")]
    pub base_interval_months: f64,

    #[serde(default = "default_l3_confidence")]
    pub confidence: f64,

    #[serde(default = "default_semi_quant_risk_categories")]
    pub risk_categories: Vec<RiskCategoryBand>,

    /// Remaining life (years) → PoF. Shorter life, higher score.
    #[serde(default = "default_remaining_life_bands")]
    pub remaining_life_bands: Vec<ScoreBand>,

    /// Interval may not exceed this fraction of remaining life
    #[serde(default = "default_remaining_life_fraction")]
    pub remaining_life_fraction: f64,
}

fn default_l3_base() -> f64 { 72.0 }
fn default_l3_confidence() -> f64 { 0.75 }
fn default_remaining_life_fraction() -> f64 { 0.5 }

fn default_remaining_life_bands() -> Vec<ScoreBand> {
    vec![
        ScoreBand::new(0.0, 2.0, 5.0),
        ScoreBand::new(2.0, 5.0, 4.0),
        ScoreBand::new(5.0, 10.0, 3.0),
        ScoreBand::new(10.0, 20.0, 2.0),
        ScoreBand::new(20.0, 1000.0, 1.0),
    ]
}

impl Default for Level3Settings {
    fn default() -> Self {
        Self {
            base_interval_months: default_l3_base(),
            confidence: default_l3_confidence(),
            risk_categories: default_semi_quant_risk_categories(),
            remaining_life_bands: default_remaining_life_bands(),
            remaining_life_fraction: default_remaining_life_fraction(),
        }
    }
}

// ============================================================================
// Level 4 - full PoF × CoF matrix
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level4Settings {
    #[serde(default = "default_l4_base")]
    pub base_interval_months: f64,

    #[serde(default = "default_l4_confidence")]
    pub confidence: f64,

    #[serde(default = "default_l4_risk_categories")]
    pub risk_categories: Vec<RiskCategoryBand>,

    #[serde(default)]
    pub criticality_multipliers: CriticalityMultipliers,
}

fn default_l4_base() -> f64 { 120.0 }
fn default_l4_confidence() -> f64 { 0.90 }

fn default_l4_risk_categories() -> Vec<RiskCategoryBand> {
    vec![
        RiskCategoryBand::new(0.0, 4.0, RiskLevel::Low, 1.0),
        RiskCategoryBand::new(4.0, 10.0, RiskLevel::Medium, 0.6),
        RiskCategoryBand::new(10.0, RISK_SCORE_MAX, RiskLevel::High, 0.25),
    ]
}

impl Default for Level4Settings {
    fn default() -> Self {
        Self {
            base_interval_months: default_l4_base(),
            confidence: default_l4_confidence(),
            risk_categories: default_l4_risk_categories(),
            criticality_multipliers: CriticalityMultipliers::default(),
        }
    }
}

/// Scales service consequence by equipment criticality at Level 4.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalityMultipliers {
    #[serde(default = "default_crit_low")]
    pub low: f64,
    #[serde(default = "default_crit_medium")]
    pub medium: f64,
    #[serde(default = "default_crit_high")]
    pub high: f64,
    #[serde(default = "default_crit_critical")]
    pub critical: f64,
}

fn default_crit_low() -> f64 { 0.8 }
fn default_crit_medium() -> f64 { 1.0 }
fn default_crit_high() -> f64 { 1.2 }
fn default_crit_critical() -> f64 { 1.4 }

impl CriticalityMultipliers {
    pub fn for_level(&self, level: CriticalityLevel) -> f64 {
        match level {
            CriticalityLevel::Low => self.low,
            CriticalityLevel::Medium => self.medium,
            CriticalityLevel::High => self.high,
            CriticalityLevel::Critical => self.critical,
        }
    }
}

impl Default for CriticalityMultipliers {
    fn default() -> Self {
        Self {
            low: default_crit_low(),
            medium: default_crit_medium(),
            high: default_crit_high(),
            critical: default_crit_critical(),
        }
    }
}

// ============================================================================
// Fallback
// ============================================================================

/// Conservatism applied once per skipped level, compounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackSettings {
    /// Interval multiplier per skipped level (< 1)
    #[serde(default = "default_adjustment_factor")]
    pub adjustment_factor: f64,

    /// Confidence subtracted per skipped level
    #[serde(default = "default_confidence_reduction")]
    pub confidence_reduction: f64,

    /// Confidence never drops below this
    #[serde(default = "default_confidence_floor")]
    pub confidence_floor: f64,

    /// Compounded interval multiplier never drops below this
    #[serde(default = "default_interval_multiplier_floor")]
    pub interval_multiplier_floor: f64,
}

fn default_adjustment_factor() -> f64 { 0.8 }
fn default_confidence_reduction() -> f64 { 0.1 }
fn default_confidence_floor() -> f64 { 0.1 }
fn default_interval_multiplier_floor() -> f64 { 0.5 }

impl Default for FallbackSettings {
    fn default() -> Self {
        Self {
            adjustment_factor: default_adjustment_factor(),
            confidence_reduction: default_confidence_reduction(),
            confidence_floor: default_confidence_floor(),
            interval_multiplier_floor: default_interval_multiplier_floor(),
        }
    }
}

// ============================================================================
// Corrosion
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrosionSettings {
    /// Floor for derived rates (mm/year); avoids division artifacts on
    /// flat or increasing readings
    #[serde(default = "default_min_corrosion_rate")]
    pub min_corrosion_rate_mm_per_year: f64,
}

fn default_min_corrosion_rate() -> f64 { 0.01 }

impl Default for CorrosionSettings {
    fn default() -> Self {
        Self {
            min_corrosion_rate_mm_per_year: default_min_corrosion_rate(),
        }
    }
}

// ============================================================================
// Data Quality
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualitySettings {
    /// Measurements older than this are stale
    #[serde(default = "default_staleness_threshold_days")]
    pub staleness_threshold_days: u32,

    /// Multiplier on the quality score when data is stale
    #[serde(default = "default_staleness_penalty")]
    pub staleness_penalty: f64,

    #[serde(default)]
    pub weights: DataQualityWeights,
}

fn default_staleness_threshold_days() -> u32 { 1095 }
fn default_staleness_penalty() -> f64 { 0.8 }

impl Default for DataQualitySettings {
    fn default() -> Self {
        Self {
            staleness_threshold_days: default_staleness_threshold_days(),
            staleness_penalty: default_staleness_penalty(),
            weights: DataQualityWeights::default(),
        }
    }
}

/// Weight of each field in the data-quality score. Should sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityWeights {
    #[serde(default = "default_w_identity")]
    pub equipment_type: f64,
    #[serde(default = "default_w_identity")]
    pub service_type: f64,
    #[serde(default = "default_w_minor")]
    pub installation_date: f64,
    #[serde(default = "default_w_minor")]
    pub design_data: f64,
    #[serde(default = "default_w_minor")]
    pub material: f64,
    #[serde(default = "default_w_identity")]
    pub criticality_level: f64,
    #[serde(default = "default_w_thickness")]
    pub thickness_measurements: f64,
    #[serde(default = "default_w_identity")]
    pub corrosion_rate: f64,
    #[serde(default = "default_w_minor")]
    pub coating_condition: f64,
    #[serde(default = "default_w_identity")]
    pub damage_mechanisms: f64,
    #[serde(default = "default_w_minor")]
    pub inspection_quality: f64,
    #[serde(default = "default_w_minor")]
    pub last_inspection_date: f64,
}

fn default_w_identity() -> f64 { 0.10 }
fn default_w_minor() -> f64 { 0.05 }
fn default_w_thickness() -> f64 { 0.20 }

impl DataQualityWeights {
    /// Every weight paired with its key name.
    pub fn entries(&self) -> [(&'static str, f64); 12] {
        [
            ("equipment_type", self.equipment_type),
            ("service_type", self.service_type),
            ("installation_date", self.installation_date),
            ("design_data", self.design_data),
            ("material", self.material),
            ("criticality_level", self.criticality_level),
            ("thickness_measurements", self.thickness_measurements),
            ("corrosion_rate", self.corrosion_rate),
            ("coating_condition", self.coating_condition),
            ("damage_mechanisms", self.damage_mechanisms),
            ("inspection_quality", self.inspection_quality),
            ("last_inspection_date", self.last_inspection_date),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.entries().iter().map(|(_, w)| w).sum()
    }
}

impl Default for DataQualityWeights {
    fn default() -> Self {
        Self {
            equipment_type: default_w_identity(),
            service_type: default_w_identity(),
            installation_date: default_w_minor(),
            design_data: default_w_minor(),
            material: default_w_minor(),
            criticality_level: default_w_identity(),
            thickness_measurements: default_w_thickness(),
            corrosion_rate: default_w_identity(),
            coating_condition: default_w_minor(),
            damage_mechanisms: default_w_identity(),
            inspection_quality: default_w_minor(),
            last_inspection_date: default_w_minor(),
        }
    }
}

// ============================================================================
// Service Risk
// ============================================================================

/// Consequence of a loss of containment in a given service (1-5 per dimension).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRiskProfile {
    pub safety: f64,
    pub environmental: f64,
    pub economic: f64,
}

impl ServiceRiskProfile {
    pub fn new(safety: f64, environmental: f64, economic: f64) -> Self {
        Self {
            safety,
            environmental,
            economic,
        }
    }

    pub fn mean(&self) -> f64 {
        (self.safety + self.environmental + self.economic) / 3.0
    }
}

fn default_service_risk() -> BTreeMap<String, ServiceRiskProfile> {
    [
        (ServiceType::SweetHydrocarbon, ServiceRiskProfile::new(3.0, 3.0, 3.0)),
        (ServiceType::SourHydrocarbon, ServiceRiskProfile::new(5.0, 4.0, 4.0)),
        (ServiceType::Amine, ServiceRiskProfile::new(3.0, 3.0, 3.0)),
        (ServiceType::Caustic, ServiceRiskProfile::new(4.0, 3.0, 2.0)),
        (ServiceType::Condensate, ServiceRiskProfile::new(3.0, 3.0, 3.0)),
        (ServiceType::Steam, ServiceRiskProfile::new(3.0, 1.0, 2.0)),
        (ServiceType::Water, ServiceRiskProfile::new(1.0, 1.0, 1.0)),
        (ServiceType::Chemical, ServiceRiskProfile::new(4.0, 4.0, 3.0)),
        (ServiceType::Hydrogen, ServiceRiskProfile::new(5.0, 2.0, 4.0)),
        (ServiceType::Other, ServiceRiskProfile::new(3.0, 3.0, 3.0)),
    ]
    .into_iter()
    .map(|(svc, profile)| (svc.as_str().to_string(), profile))
    .collect()
}

fn default_equipment_consequence() -> BTreeMap<String, f64> {
    [
        (EquipmentType::PressureVessel, 3.0),
        (EquipmentType::HeatExchanger, 3.0),
        (EquipmentType::Piping, 2.0),
        (EquipmentType::StorageTank, 3.0),
        (EquipmentType::Column, 4.0),
        (EquipmentType::Reactor, 5.0),
        (EquipmentType::Pump, 2.0),
        (EquipmentType::Compressor, 4.0),
        (EquipmentType::ReliefValve, 4.0),
        (EquipmentType::Other, 3.0),
    ]
    .into_iter()
    .map(|(ty, c)| (ty.as_str().to_string(), c))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = RBIConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config: RBIConfig = toml::from_str("").expect("empty TOML should parse");
        assert_eq!(config, RBIConfig::default());
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[intervals]
max_interval_months = 96.0

[fallback]
adjustment_factor = 0.7
"#;
        let config: RBIConfig = toml::from_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.intervals.max_interval_months, 96.0);
        assert_eq!(config.fallback.adjustment_factor, 0.7);
        // Non-overridden values retain defaults
        assert_eq!(config.intervals.min_interval_months, 6.0);
        assert_eq!(config.fallback.confidence_reduction, 0.1);
        assert_eq!(config.level4.risk_categories.len(), 3);
    }

    #[test]
    fn test_risk_categories_from_toml() {
        let toml_str = r#"
[[level2.risk_categories]]
min = 0.0
max = 10.0
category = "low"
interval_factor = 1.0

[[level2.risk_categories]]
min = 10.0
max = 25.0
category = "high"
interval_factor = 0.4
"#;
        let config: RBIConfig = toml::from_str(toml_str).expect("bands should parse");
        assert_eq!(config.level2.risk_categories.len(), 2);
        assert_eq!(config.level2.risk_categories[1].category, RiskLevel::High);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_catches_band_gap() {
        let mut config = RBIConfig::default();
        config.level3.risk_categories = vec![
            RiskCategoryBand::new(0.0, 5.0, RiskLevel::Low, 1.0),
            RiskCategoryBand::new(8.0, 25.0, RiskLevel::High, 0.3),
        ];
        match config.validate() {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("level3.risk_categories") && e.contains("gap")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_catches_adjustment_factor_above_one() {
        let mut config = RBIConfig::default();
        config.fallback.adjustment_factor = 1.2;
        let result = config.validate();
        assert!(result.is_err());
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("adjustment_factor")));
        }
    }

    #[test]
    fn test_validation_catches_inverted_interval_bounds() {
        let mut config = RBIConfig::default();
        config.intervals.min_interval_months = 60.0;
        config.intervals.max_interval_months = 24.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_requires_ascending_confidence() {
        let mut config = RBIConfig::default();
        config.level3.confidence = 0.5;
        let result = config.validate();
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("level3.confidence")));
        } else {
            panic!("level3 confidence below level2 should fail");
        }
    }

    #[test]
    fn test_validation_catches_bad_weights() {
        let mut config = RBIConfig::default();
        config.level2.coating_weight = 0.9;
        let result = config.validate();
        assert!(result.is_err(), "Weights summing to 1.5 should fail");
    }

    #[test]
    fn test_validation_catches_floor_above_level1_confidence() {
        let mut config = RBIConfig::default();
        config.fallback.confidence_floor = 0.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_nan() {
        let mut config = RBIConfig::default();
        config.corrosion.min_corrosion_rate_mm_per_year = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_map_value_is_named() {
        let mut config = RBIConfig::default();
        config
            .level1
            .equipment_multipliers
            .insert("air_cooler".to_string(), f64::INFINITY);
        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert!(
                errors
                    .iter()
                    .any(|e| e.starts_with("level1.equipment_multipliers.air_cooler must be a finite number")),
                "{errors:?}"
            ),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = RBIConfig::default();
        config.fallback.adjustment_factor = 0.0;
        config.fallback.confidence_reduction = 0.0;
        config.data_quality.staleness_threshold_days = 0;
        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert!(errors.len() >= 3, "{errors:?}"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_clamp_interval() {
        let config = RBIConfig::default();
        assert_eq!(config.clamp_interval(1.0), 6.0);
        assert_eq!(config.clamp_interval(500.0), 120.0);
        assert_eq!(config.clamp_interval(48.0), 48.0);
    }

    #[test]
    fn test_every_enum_variant_has_default_entries() {
        let config = RBIConfig::default();
        for svc in ServiceType::ALL {
            assert!(config.service_profile(svc).is_some(), "missing {svc}");
        }
        for ty in EquipmentType::ALL {
            assert!(config.equipment_consequence_for(ty).is_some(), "missing {ty}");
            assert!(config.level1.equipment_multipliers.contains_key(ty.as_str()));
        }
    }

    #[test]
    fn test_toml_round_trip() {
        let config = RBIConfig::default();
        let text = config.to_toml().expect("serialize");
        let parsed: RBIConfig = toml::from_str(&text).expect("parse back");
        assert_eq!(parsed, config);
    }
}
