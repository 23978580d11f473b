//! Calculation levels, capability records, and the engine's result types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{CriticalityLevel, EquipmentType, ServiceType};

// ============================================================================
// Calculation Level
// ============================================================================

/// RBI methodology tier. Higher levels need more data and give more confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RBILevel {
    /// Coarse fixed interval by equipment type
    Level1 = 1,
    /// Semi-quantitative weighted PoF table
    Level2 = 2,
    /// Quantitative remaining-life PoF
    Level3 = 3,
    /// Full PoF × CoF risk matrix
    Level4 = 4,
}

impl RBILevel {
    pub const ALL: [RBILevel; 4] = [
        RBILevel::Level1,
        RBILevel::Level2,
        RBILevel::Level3,
        RBILevel::Level4,
    ];

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(n: u8) -> Option<Self> {
        match n {
            1 => Some(RBILevel::Level1),
            2 => Some(RBILevel::Level2),
            3 => Some(RBILevel::Level3),
            4 => Some(RBILevel::Level4),
            _ => None,
        }
    }

    /// The next less data-hungry level, or `None` at Level 1.
    pub fn next_lower(self) -> Option<Self> {
        Self::from_u8(self.as_u8() - 1)
    }

    /// Attempt chain from `self` down to Level 1, inclusive.
    pub fn descending_from(self) -> impl Iterator<Item = RBILevel> {
        std::iter::successors(Some(self), |l| l.next_lower())
    }
}

impl std::fmt::Display for RBILevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Level {}", self.as_u8())
    }
}

// ============================================================================
// Risk
// ============================================================================

/// Risk classification from the ordered risk-category lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::High => write!(f, "HIGH"),
        }
    }
}

/// Consequence-of-failure scores per dimension (1-5 scale, 0 = not computed).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CofScores {
    pub safety: f64,
    pub environmental: f64,
    pub economic: f64,
}

impl CofScores {
    pub fn uniform(value: f64) -> Self {
        Self {
            safety: value,
            environmental: value,
            economic: value,
        }
    }

    /// Governing consequence across all dimensions.
    pub fn max(&self) -> f64 {
        self.safety.max(self.environmental).max(self.economic)
    }

    pub fn is_computed(&self) -> bool {
        self.max() > 0.0
    }
}

// ============================================================================
// Capability
// ============================================================================

/// One input a level's cumulative data predicate depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataRequirement {
    EquipmentType,
    ServiceType,
    ThicknessMeasurements,
    CoatingCondition,
    CorrosionRate,
    DamageMechanisms,
    CriticalityLevel,
    ServiceRiskCategory,
    InspectionQuality,
}

impl DataRequirement {
    /// Stable field name used in `missing_data`.
    pub fn field_name(&self) -> &'static str {
        match self {
            DataRequirement::EquipmentType => "equipment_type",
            DataRequirement::ServiceType => "service_type",
            DataRequirement::ThicknessMeasurements => "thickness_measurements",
            DataRequirement::CoatingCondition => "coating_condition",
            DataRequirement::CorrosionRate => "corrosion_rate",
            DataRequirement::DamageMechanisms => "damage_mechanisms",
            DataRequirement::CriticalityLevel => "criticality_level",
            DataRequirement::ServiceRiskCategory => "service_risk_category",
            DataRequirement::InspectionQuality => "inspection_quality",
        }
    }

    /// Lowest level whose predicate introduces this requirement.
    pub fn introduced_at(&self) -> RBILevel {
        match self {
            DataRequirement::EquipmentType | DataRequirement::ServiceType => RBILevel::Level1,
            DataRequirement::ThicknessMeasurements | DataRequirement::CoatingCondition => {
                RBILevel::Level2
            }
            DataRequirement::CorrosionRate | DataRequirement::DamageMechanisms => RBILevel::Level3,
            DataRequirement::CriticalityLevel
            | DataRequirement::ServiceRiskCategory
            | DataRequirement::InspectionQuality => RBILevel::Level4,
        }
    }
}

impl std::fmt::Display for DataRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

/// An unmet requirement with a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingRequirement {
    pub requirement: DataRequirement,
    pub detail: String,
}

/// Whether one level is computable for an equipment item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelCapability {
    pub level: RBILevel,
    pub capable: bool,
    /// Cumulative: includes unmet requirements of lower levels, in predicate order.
    pub missing_requirements: Vec<MissingRequirement>,
}

/// Why a requested level was skipped.
///
/// `requirement` is the level's first unmet requirement in predicate order.
/// Requirements are cumulative, so a gap at a lower level is reported for
/// every level above it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackReason {
    pub skipped_level: RBILevel,
    pub requirement: DataRequirement,
    pub detail: String,
}

// ============================================================================
// Audit breakdown
// ============================================================================

/// One weighted input to a composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub name: String,
    pub value: f64,
    pub weight: f64,
}

/// Component scores and weights behind a level's PoF / CoF, kept for audit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub pof_components: Vec<ScoreComponent>,
    pub cof_components: Vec<ScoreComponent>,
    pub risk_score: f64,
    pub risk_category: String,
    pub interval_factor: f64,
}

// ============================================================================
// Calculation Result
// ============================================================================

/// Calculation bookkeeping carried alongside the headline result.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputParameters {
    pub fallback_reasons: Vec<FallbackReason>,
    pub fallback_steps: u8,
    /// Multiplier applied to the interval for conservatism (1.0 without fallback)
    pub interval_multiplier: f64,
    /// Confidence removed by fallback
    pub confidence_penalty: f64,
    /// Level interval before fallback adjustment and clamping
    pub unadjusted_interval_months: f64,
    pub risk_score: f64,
    /// Corrosion rate used (mm/year), Level 3+ only
    pub corrosion_rate: Option<f64>,
    pub corrosion_rate_derived: bool,
    /// Governing remaining life (years), Level 3+ only
    pub remaining_life_years: Option<f64>,
    pub score_breakdown: Option<ScoreBreakdown>,
}

/// Output of one engine calculation. The only artifact callers persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RBICalculationResult {
    pub equipment_id: String,
    pub calculation_level: RBILevel,
    pub requested_level: RBILevel,
    pub fallback_occurred: bool,
    pub next_inspection_date: NaiveDate,
    pub risk_level: RiskLevel,
    pub pof_score: f64,
    pub cof_scores: CofScores,
    /// 0.0 - 1.0
    pub confidence_score: f64,
    /// 0.0 - 1.0
    pub data_quality_score: f64,
    pub inspection_interval_months: f64,
    pub missing_data: Vec<String>,
    pub estimated_parameters: Vec<String>,
    pub input_parameters: InputParameters,
    pub calculated_at: DateTime<Utc>,
}

/// One entry of a batch run; failed items are kept in place, not dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntry {
    Calculated(RBICalculationResult),
    Failed { equipment_id: String, error: String },
}

impl BatchEntry {
    pub fn equipment_id(&self) -> &str {
        match self {
            BatchEntry::Calculated(r) => &r.equipment_id,
            BatchEntry::Failed { equipment_id, .. } => equipment_id,
        }
    }

    pub fn result(&self) -> Option<&RBICalculationResult> {
        match self {
            BatchEntry::Calculated(r) => Some(r),
            BatchEntry::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BatchEntry::Failed { .. })
    }
}

/// Diagnostic capability overview for reporting / UI. Not used for scheduling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationSummary {
    pub equipment_id: String,
    pub equipment_type: Option<EquipmentType>,
    pub service_type: Option<ServiceType>,
    pub criticality_level: Option<CriticalityLevel>,
    pub installation_date: Option<NaiveDate>,
    pub recommended_level: Option<RBILevel>,
    pub capabilities: Vec<LevelCapability>,
    pub data_quality_score: f64,
    pub thickness_measurement_count: usize,
    pub last_inspection_date: Option<NaiveDate>,
}
