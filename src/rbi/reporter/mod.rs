//! Fallback Reporter - explains an engine result after the fact
//!
//! Reads a finished `RBICalculationResult` together with the data it was
//! computed from and produces a `FallbackReport`: why levels were skipped,
//! what that cost in interval and confidence, which data gaps to close,
//! and in what order. Never influences the calculation itself.

pub mod labels;
pub mod recommendations;

pub use labels::{categorize_impact, conservatism_label, roll_up_severity, uncertainty_label};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::capability::LevelCapabilityAssessor;
use crate::config::defaults::REPORT_ID_PREFIX;
use crate::config::RBIConfig;
use crate::types::{
    DataGap, EquipmentData, ExecutiveSummary, ExtractedRBIData, FallbackAnalysis, FallbackItem,
    FallbackReport, ImpactAssessment, RBICalculationResult, ReportMetadata, RiskImplications,
    RiskLevel,
};

pub struct FallbackReporter<'a> {
    config: &'a RBIConfig,
}

impl<'a> FallbackReporter<'a> {
    pub fn new(config: &'a RBIConfig) -> Self {
        Self { config }
    }

    pub fn generate_report(
        &self,
        equipment: &EquipmentData,
        extracted: &ExtractedRBIData,
        result: &RBICalculationResult,
    ) -> FallbackReport {
        self.generate_report_at(equipment, extracted, result, Utc::now())
    }

    pub fn generate_report_at(
        &self,
        equipment: &EquipmentData,
        extracted: &ExtractedRBIData,
        result: &RBICalculationResult,
        generated_at: DateTime<Utc>,
    ) -> FallbackReport {
        // 1. Metadata
        let metadata = ReportMetadata {
            report_id: format!(
                "{}-{}-{}",
                REPORT_ID_PREFIX,
                result.equipment_id,
                generated_at.format("%Y%m%d%H%M%S")
            ),
            equipment_id: result.equipment_id.clone(),
            equipment_type: equipment.equipment_type,
            service_type: equipment.service_type,
            generated_at,
            calculated_at: result.calculated_at,
            requested_level: result.requested_level,
            calculation_level: result.calculation_level,
        };

        // 2. Per-step analysis and overall impact
        let fallback_analysis = self.analyze_fallback(result);
        let impact_assessment = self.assess_impact(result);

        // 3. Gaps → recommendations → plan
        let data_gaps = self.identify_data_gaps(equipment, extracted, result);
        let recommendations = recommendations::rank_recommendations(
            &data_gaps,
            self.config,
            result.confidence_score,
        );
        let action_plan =
            recommendations::build_action_plan(result.requested_level, &recommendations);
        let cost_benefit =
            recommendations::analyze_cost_benefit(&recommendations, &impact_assessment);

        // 4. Narrative sections
        let executive_summary =
            build_executive_summary(result, &fallback_analysis, &impact_assessment);
        let risk_implications = build_risk_implications(result);

        debug!(
            equipment_id = %result.equipment_id,
            report_id = %metadata.report_id,
            gaps = data_gaps.len(),
            recommendations = recommendations.len(),
            "Fallback report generated"
        );

        FallbackReport {
            metadata,
            executive_summary,
            fallback_analysis,
            impact_assessment,
            data_gaps,
            recommendations,
            action_plan,
            cost_benefit,
            risk_implications,
        }
    }

    /// One item per skipped level with the marginal cost of that step.
    fn analyze_fallback(&self, result: &RBICalculationResult) -> FallbackAnalysis {
        let fb = &self.config.fallback;
        let baseline = self.config.level_confidence(result.calculation_level);
        let multiplier = |steps: usize| {
            if steps == 0 {
                1.0
            } else {
                fb.adjustment_factor
                    .powi(i32::try_from(steps).unwrap_or(i32::MAX))
                    .max(fb.interval_multiplier_floor)
            }
        };
        let confidence = |steps: usize| {
            (baseline - fb.confidence_reduction * steps as f64).max(fb.confidence_floor)
        };

        let reasons = &result.input_parameters.fallback_reasons;
        let items: Vec<FallbackItem> = reasons
            .iter()
            .enumerate()
            .map(|(i, reason)| {
                let before = multiplier(i);
                let after = multiplier(i + 1);
                let interval_impact = if before > 0.0 { 1.0 - after / before } else { 0.0 };
                let confidence_impact = (confidence(i) - confidence(i + 1)).max(0.0);
                FallbackItem {
                    order: i + 1,
                    skipped_level: reason.skipped_level,
                    requirement: reason.requirement,
                    reason: reason.detail.clone(),
                    interval_impact,
                    confidence_impact,
                    impact: categorize_impact(interval_impact.max(confidence_impact)),
                }
            })
            .collect();

        FallbackAnalysis {
            fallback_occurred: result.fallback_occurred,
            requested_level: result.requested_level,
            achieved_level: result.calculation_level,
            items,
            // The lowest skipped level is the one immediately out of reach
            primary_cause: reasons.last().map(|r| r.requirement),
        }
    }

    /// Actual result versus the requested level being fully capable.
    fn assess_impact(&self, result: &RBICalculationResult) -> ImpactAssessment {
        let actual_interval = result.inspection_interval_months;
        let hypothetical_interval = self
            .config
            .clamp_interval(result.input_parameters.unadjusted_interval_months);
        let interval_reduction = (hypothetical_interval - actual_interval).max(0.0);
        let interval_fraction = if hypothetical_interval > 0.0 {
            interval_reduction / hypothetical_interval
        } else {
            0.0
        };

        let actual_confidence = result.confidence_score;
        let hypothetical_confidence = self.config.level_confidence(result.requested_level);
        let confidence_reduction = (hypothetical_confidence - actual_confidence).max(0.0);
        let confidence_fraction = if hypothetical_confidence > 0.0 {
            confidence_reduction / hypothetical_confidence
        } else {
            0.0
        };

        let interval_impact = categorize_impact(interval_fraction);
        let confidence_impact = categorize_impact(confidence_fraction);

        ImpactAssessment {
            actual_interval_months: actual_interval,
            hypothetical_interval_months: hypothetical_interval,
            interval_reduction_months: interval_reduction,
            interval_impact_fraction: interval_fraction,
            interval_impact,
            actual_confidence,
            hypothetical_confidence,
            confidence_reduction,
            confidence_impact_fraction: confidence_fraction,
            confidence_impact,
            overall_impact: interval_impact.max(confidence_impact),
        }
    }

    /// Unmet requirements up to the requested level.
    fn identify_data_gaps(
        &self,
        equipment: &EquipmentData,
        extracted: &ExtractedRBIData,
        result: &RBICalculationResult,
    ) -> Vec<DataGap> {
        LevelCapabilityAssessor::new(self.config)
            .unmet_requirements(equipment, extracted)
            .into_iter()
            .filter(|m| m.requirement.introduced_at() <= result.requested_level)
            .map(|m| {
                let field = m.requirement.field_name().to_string();
                DataGap {
                    requirement: m.requirement,
                    currently_estimated: result.estimated_parameters.contains(&field),
                    field,
                    blocks_level: m.requirement.introduced_at(),
                    detail: m.detail,
                }
            })
            .collect()
    }
}

fn build_executive_summary(
    result: &RBICalculationResult,
    analysis: &FallbackAnalysis,
    impact: &ImpactAssessment,
) -> ExecutiveSummary {
    let levels_skipped = result.input_parameters.fallback_steps;

    let (headline, key_message) = if result.fallback_occurred {
        let cause = analysis
            .primary_cause
            .map_or_else(|| "required data".to_string(), |c| c.field_name().replace('_', " "));
        (
            format!(
                "{} assessed at {} instead of {}",
                result.equipment_id, result.calculation_level, result.requested_level
            ),
            format!(
                "Missing {} prevented a higher-level assessment; the interval was shortened by {:.1} months and confidence reduced by {:.2}",
                cause, impact.interval_reduction_months, impact.confidence_reduction
            ),
        )
    } else {
        (
            format!(
                "{} assessed at {} as requested",
                result.equipment_id, result.calculation_level
            ),
            format!(
                "No fallback was needed; next inspection due {}",
                result.next_inspection_date
            ),
        )
    };

    ExecutiveSummary {
        headline,
        fallback_occurred: result.fallback_occurred,
        levels_skipped,
        risk_level: result.risk_level,
        inspection_interval_months: result.inspection_interval_months,
        next_inspection_date: result.next_inspection_date,
        confidence_score: result.confidence_score,
        data_quality_score: result.data_quality_score,
        overall_impact: impact.overall_impact,
        key_message,
    }
}

fn build_risk_implications(result: &RBICalculationResult) -> RiskImplications {
    let factor = result.input_parameters.interval_multiplier;
    let conservatism = conservatism_label(factor);
    let uncertainty = uncertainty_label(result.confidence_score);

    let mut statements = vec![format!(
        "Risk classified {} at {} with {} uncertainty",
        result.risk_level, result.calculation_level, uncertainty
    )];
    if result.fallback_occurred {
        statements.push(format!(
            "{} adjustment applied: interval scaled by {:.2} across {} skipped level(s)",
            conservatism, factor, result.input_parameters.fallback_steps
        ));
    }
    if result.risk_level == RiskLevel::High && result.fallback_occurred {
        statements.push(
            "High risk assessed on incomplete data; prioritise closing the data gaps".to_string(),
        );
    }
    if result.data_quality_score < 0.5 {
        statements.push(format!(
            "Data quality score {:.2} is low; results rest largely on defaults and estimates",
            result.data_quality_score
        ));
    }
    if !result.estimated_parameters.is_empty() {
        statements.push(format!(
            "Estimated inputs: {}",
            result.estimated_parameters.join(", ")
        ));
    }

    RiskImplications {
        risk_level: result.risk_level,
        effective_adjustment_factor: factor,
        conservatism,
        uncertainty,
        statements,
    }
}
