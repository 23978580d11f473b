//! Level 4 - full PoF × CoF risk matrix
//!
//! PoF comes from remaining life as at Level 3. Each consequence dimension
//! is the configured service profile scaled by the criticality multiplier.

use tracing::debug;

use super::{
    assess_remaining_life, breakdown, clamp_cof, classify, component, remaining_life_interval,
    CalculationInput, LevelCalculator, LevelError, LevelOutcome,
};
use crate::types::{CofScores, DataRequirement, RBILevel};

pub struct Level4Calculator;

impl LevelCalculator for Level4Calculator {
    fn level(&self) -> RBILevel {
        RBILevel::Level4
    }

    fn calculate(&self, input: &CalculationInput<'_>) -> Result<LevelOutcome, LevelError> {
        let level = RBILevel::Level4;
        let settings = &input.config.level4;
        let missing = |requirement| LevelError::MissingInput { level, requirement };

        let criticality = input
            .equipment
            .criticality_level
            .ok_or_else(|| missing(DataRequirement::CriticalityLevel))?;
        let profile = input
            .equipment
            .service_type
            .and_then(|svc| input.config.service_profile(svc))
            .ok_or_else(|| missing(DataRequirement::ServiceRiskCategory))?;

        let mut estimated_parameters = Vec::new();
        let assessment = assess_remaining_life(input, level)?;
        if assessment.rate.derived {
            estimated_parameters.push("corrosion_rate".to_string());
        }

        let multiplier = settings.criticality_multipliers.for_level(criticality);
        let cof_scores = CofScores {
            safety: clamp_cof(profile.safety * multiplier),
            environmental: clamp_cof(profile.environmental * multiplier),
            economic: clamp_cof(profile.economic * multiplier),
        };

        let (risk_score, band) = classify(input.config, level, assessment.pof, &cof_scores)?;
        let interval_months = remaining_life_interval(
            input.config,
            settings.base_interval_months,
            band,
            &assessment.life,
        );

        debug!(
            equipment_id = %input.equipment.equipment_id,
            pof_score = assessment.pof,
            cof_max = cof_scores.max(),
            risk_score,
            risk_level = %band.category,
            interval_months,
            "Level 4 risk matrix"
        );

        Ok(LevelOutcome {
            level,
            pof_score: assessment.pof,
            cof_scores,
            risk_score,
            risk_level: band.category,
            interval_months,
            confidence_baseline: settings.confidence,
            estimated_parameters,
            breakdown: Some(breakdown(
                vec![
                    component("remaining_life_years", assessment.life.years, 1.0),
                    component("corrosion_rate_mm_per_year", assessment.rate.value, 1.0),
                ],
                vec![
                    component("safety", profile.safety, multiplier),
                    component("environmental", profile.environmental, multiplier),
                    component("economic", profile.economic, multiplier),
                ],
                risk_score,
                band,
            )),
            corrosion_rate: Some(assessment.rate),
            remaining_life: Some(assessment.life),
        })
    }
}
