//! Fallback explanation report types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{DataRequirement, EquipmentType, RBILevel, RiskLevel, ServiceType};

// ============================================================================
// Labels
// ============================================================================

/// Size of an interval / confidence change relative to the fully-capable baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactCategory {
    Minimal,
    Low,
    Medium,
    High,
}

impl std::fmt::Display for ImpactCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImpactCategory::Minimal => write!(f, "Minimal"),
            ImpactCategory::Low => write!(f, "Low"),
            ImpactCategory::Medium => write!(f, "Medium"),
            ImpactCategory::High => write!(f, "High"),
        }
    }
}

/// How far the applied fallback adjustment pulls the interval in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConservatismLevel {
    VeryConservative,
    Conservative,
    SlightlyConservative,
    Standard,
}

impl std::fmt::Display for ConservatismLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConservatismLevel::VeryConservative => write!(f, "Very Conservative"),
            ConservatismLevel::Conservative => write!(f, "Conservative"),
            ConservatismLevel::SlightlyConservative => write!(f, "Slightly Conservative"),
            ConservatismLevel::Standard => write!(f, "Standard"),
        }
    }
}

/// Uncertainty implied by a confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UncertaintyLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl std::fmt::Display for UncertaintyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UncertaintyLevel::Low => write!(f, "Low"),
            UncertaintyLevel::Medium => write!(f, "Medium"),
            UncertaintyLevel::High => write!(f, "High"),
            UncertaintyLevel::VeryHigh => write!(f, "Very High"),
        }
    }
}

/// Cost or effort grade of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
        }
    }
}

// ============================================================================
// Report sections
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub report_id: String,
    pub equipment_id: String,
    pub equipment_type: Option<EquipmentType>,
    pub service_type: Option<ServiceType>,
    pub generated_at: DateTime<Utc>,
    pub calculated_at: DateTime<Utc>,
    pub requested_level: RBILevel,
    pub calculation_level: RBILevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub headline: String,
    pub fallback_occurred: bool,
    pub levels_skipped: u8,
    pub risk_level: RiskLevel,
    pub inspection_interval_months: f64,
    pub next_inspection_date: NaiveDate,
    pub confidence_score: f64,
    pub data_quality_score: f64,
    pub overall_impact: ImpactCategory,
    pub key_message: String,
}

/// One skipped level and what it cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackItem {
    pub order: usize,
    pub skipped_level: RBILevel,
    pub requirement: DataRequirement,
    pub reason: String,
    /// Fraction of interval removed by this step
    pub interval_impact: f64,
    /// Confidence removed by this step
    pub confidence_impact: f64,
    pub impact: ImpactCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackAnalysis {
    pub fallback_occurred: bool,
    pub requested_level: RBILevel,
    pub achieved_level: RBILevel,
    /// Ordered from the requested level downwards
    pub items: Vec<FallbackItem>,
    pub primary_cause: Option<DataRequirement>,
}

/// Actual result versus a hypothetical result at the requested level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactAssessment {
    pub actual_interval_months: f64,
    pub hypothetical_interval_months: f64,
    pub interval_reduction_months: f64,
    pub interval_impact_fraction: f64,
    pub interval_impact: ImpactCategory,
    pub actual_confidence: f64,
    pub hypothetical_confidence: f64,
    pub confidence_reduction: f64,
    pub confidence_impact_fraction: f64,
    pub confidence_impact: ImpactCategory,
    pub overall_impact: ImpactCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataGap {
    pub requirement: DataRequirement,
    pub field: String,
    /// Lowest level this gap blocks
    pub blocks_level: RBILevel,
    pub detail: String,
    /// The calculation substituted an estimate for this value
    pub currently_estimated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub rank: usize,
    pub requirement: DataRequirement,
    pub title: String,
    pub action: String,
    pub unlocks_level: RBILevel,
    pub cost: Severity,
    pub effort: Severity,
    pub expected_confidence_gain: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPhase {
    pub phase: usize,
    pub target_level: RBILevel,
    pub timeframe: String,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    pub target_level: RBILevel,
    pub phases: Vec<ActionPhase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBenefitAnalysis {
    pub overall_cost: Severity,
    pub overall_effort: Severity,
    pub expected_interval_gain_months: f64,
    pub expected_confidence_gain: f64,
    pub recommendation_count: usize,
    pub worthwhile: bool,
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskImplications {
    pub risk_level: RiskLevel,
    /// Compounded interval multiplier actually applied
    pub effective_adjustment_factor: f64,
    pub conservatism: ConservatismLevel,
    pub uncertainty: UncertaintyLevel,
    pub statements: Vec<String>,
}

/// Human-oriented explanation of an engine result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackReport {
    pub metadata: ReportMetadata,
    pub executive_summary: ExecutiveSummary,
    pub fallback_analysis: FallbackAnalysis,
    pub impact_assessment: ImpactAssessment,
    pub data_gaps: Vec<DataGap>,
    pub recommendations: Vec<Recommendation>,
    pub action_plan: ActionPlan,
    pub cost_benefit: CostBenefitAnalysis,
    pub risk_implications: RiskImplications,
}
