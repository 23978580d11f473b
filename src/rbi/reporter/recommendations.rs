//! Improvement recommendations, action plan and cost/benefit roll-up.

use super::labels::roll_up_severity;
use crate::config::RBIConfig;
use crate::types::{
    ActionPhase, ActionPlan, CostBenefitAnalysis, DataGap, DataRequirement, ImpactAssessment,
    ImpactCategory, RBILevel, Recommendation, Severity,
};

/// Timeframe per action-plan phase; later phases reuse the last entry.
const PHASE_TIMEFRAMES: [&str; 3] = ["0-30 days", "30-90 days", "90-180 days"];

struct Remedy {
    title: &'static str,
    action: &'static str,
    cost: Severity,
    effort: Severity,
}

fn remedy(requirement: DataRequirement) -> Remedy {
    let (title, action, cost, effort) = match requirement {
        DataRequirement::EquipmentType => (
            "Record equipment type",
            "Classify the equipment in the asset register",
            Severity::Low,
            Severity::Low,
        ),
        DataRequirement::ServiceType => (
            "Record service type",
            "Assign the process service from process and P&ID data",
            Severity::Low,
            Severity::Low,
        ),
        DataRequirement::ThicknessMeasurements => (
            "Thickness survey",
            "Carry out an ultrasonic thickness survey at the condition monitoring locations",
            Severity::Medium,
            Severity::Medium,
        ),
        DataRequirement::CoatingCondition => (
            "Coating assessment",
            "Perform an external visual inspection and grade the coating condition",
            Severity::Low,
            Severity::Low,
        ),
        DataRequirement::CorrosionRate => (
            "Establish corrosion rate",
            "Repeat the thickness survey at the same locations or install corrosion coupons",
            Severity::Medium,
            Severity::Medium,
        ),
        DataRequirement::DamageMechanisms => (
            "Damage mechanism review",
            "Run a damage mechanism review for the equipment in its current service",
            Severity::Medium,
            Severity::High,
        ),
        DataRequirement::CriticalityLevel => (
            "Criticality assessment",
            "Assign a criticality level through a consequence assessment",
            Severity::Low,
            Severity::Medium,
        ),
        DataRequirement::ServiceRiskCategory => (
            "Configure service risk",
            "Add a service_risk profile for this service type to the RBI configuration",
            Severity::Low,
            Severity::Low,
        ),
        DataRequirement::InspectionQuality => (
            "Improve inspection quality",
            "Upgrade the next inspection scope and methods so the campaign rates Good",
            Severity::High,
            Severity::High,
        ),
    };
    Remedy {
        title,
        action,
        cost,
        effort,
    }
}

/// One recommendation per data gap, ranked by the level it unlocks
/// (lowest first), then cost, then effort.
pub fn rank_recommendations(
    gaps: &[DataGap],
    config: &RBIConfig,
    current_confidence: f64,
) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = gaps
        .iter()
        .map(|gap| {
            let r = remedy(gap.requirement);
            Recommendation {
                rank: 0,
                requirement: gap.requirement,
                title: r.title.to_string(),
                action: r.action.to_string(),
                unlocks_level: gap.blocks_level,
                cost: r.cost,
                effort: r.effort,
                expected_confidence_gain: (config.level_confidence(gap.blocks_level)
                    - current_confidence)
                    .max(0.0),
            }
        })
        .collect();

    recommendations.sort_by(|a, b| {
        a.unlocks_level
            .cmp(&b.unlocks_level)
            .then(a.cost.cmp(&b.cost))
            .then(a.effort.cmp(&b.effort))
            .then(a.requirement.cmp(&b.requirement))
    });
    for (i, rec) in recommendations.iter_mut().enumerate() {
        rec.rank = i + 1;
    }
    recommendations
}

/// Phases grouped by the level each recommendation unlocks.
pub fn build_action_plan(target_level: RBILevel, recommendations: &[Recommendation]) -> ActionPlan {
    let mut phases: Vec<ActionPhase> = Vec::new();
    for rec in recommendations {
        match phases.last_mut() {
            Some(phase) if phase.target_level == rec.unlocks_level => {
                phase.actions.push(rec.action.clone());
            }
            _ => {
                let index = phases.len();
                let timeframe = PHASE_TIMEFRAMES[index.min(PHASE_TIMEFRAMES.len() - 1)];
                phases.push(ActionPhase {
                    phase: index + 1,
                    target_level: rec.unlocks_level,
                    timeframe: timeframe.to_string(),
                    actions: vec![rec.action.clone()],
                });
            }
        }
    }
    ActionPlan {
        target_level,
        phases,
    }
}

pub fn analyze_cost_benefit(
    recommendations: &[Recommendation],
    impact: &ImpactAssessment,
) -> CostBenefitAnalysis {
    let overall_cost = roll_up_severity(recommendations.iter().map(|r| r.cost));
    let overall_effort = roll_up_severity(recommendations.iter().map(|r| r.effort));
    let expected_confidence_gain = recommendations
        .iter()
        .map(|r| r.expected_confidence_gain)
        .fold(0.0, f64::max);

    let worthwhile = !recommendations.is_empty()
        && (impact.overall_impact >= ImpactCategory::Medium || overall_cost < Severity::High);

    let rationale = if recommendations.is_empty() {
        "No data gaps below the requested level; nothing to collect".to_string()
    } else if worthwhile {
        format!(
            "{} impact at {} cost: closing the gaps recovers up to {:.1} months of interval and {:.2} confidence",
            impact.overall_impact, overall_cost, impact.interval_reduction_months, expected_confidence_gain
        )
    } else {
        format!(
            "{} impact does not justify {} cost; revisit at the next scheduled inspection",
            impact.overall_impact, overall_cost
        )
    };

    CostBenefitAnalysis {
        overall_cost,
        overall_effort,
        expected_interval_gain_months: impact.interval_reduction_months,
        expected_confidence_gain,
        recommendation_count: recommendations.len(),
        worthwhile,
        rationale,
    }
}
