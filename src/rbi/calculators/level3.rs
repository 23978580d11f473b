//! Level 3 - quantitative remaining life
//!
//! Remaining life = (latest thickness − minimum required) ÷ corrosion rate
//! at the governing location. Shorter life maps to a higher PoF band, and
//! the interval never exceeds a configured fraction of remaining life.

use tracing::debug;

use super::{
    approximate_cof, assess_remaining_life, breakdown, classify, component,
    remaining_life_interval, CalculationInput, LevelCalculator, LevelError, LevelOutcome,
};
use crate::types::RBILevel;

pub struct Level3Calculator;

impl LevelCalculator for Level3Calculator {
    fn level(&self) -> RBILevel {
        RBILevel::Level3
    }

    fn calculate(&self, input: &CalculationInput<'_>) -> Result<LevelOutcome, LevelError> {
        let level = RBILevel::Level3;
        let settings = &input.config.level3;
        let mut estimated_parameters = Vec::new();

        let assessment = assess_remaining_life(input, level)?;
        if assessment.rate.derived {
            estimated_parameters.push("corrosion_rate".to_string());
        }

        let (cof_scores, cof_components) = approximate_cof(input, &mut estimated_parameters);
        let (risk_score, band) = classify(input.config, level, assessment.pof, &cof_scores)?;
        let interval_months = remaining_life_interval(
            input.config,
            settings.base_interval_months,
            band,
            &assessment.life,
        );

        debug!(
            equipment_id = %input.equipment.equipment_id,
            corrosion_rate = assessment.rate.value,
            remaining_life_years = assessment.life.years,
            location = %assessment.life.location,
            pof_score = assessment.pof,
            interval_months,
            "Level 3 remaining life"
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
                vec![component("remaining_life_years", assessment.life.years, 1.0)],
                cof_components,
                risk_score,
                band,
            )),
            corrosion_rate: Some(assessment.rate),
            remaining_life: Some(assessment.life),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::config::RBIConfig;
    use crate::types::{DataRequirement, RiskLevel};

    fn input<'a>(
        eq: &'a crate::types::EquipmentData,
        ex: &'a crate::types::ExtractedRBIData,
        config: &'a RBIConfig,
    ) -> CalculationInput<'a> {
        CalculationInput {
            equipment: eq,
            extracted: ex,
            config,
            as_of: date(2024, 1, 1),
        }
    }

    #[test]
    fn derived_rate_drives_remaining_life() {
        let config = RBIConfig::default();
        let eq = full_equipment();
        let ex = full_extracted();
        let outcome = Level3Calculator.calculate(&input(&eq, &ex, &config)).expect("level 3");

        let rate = outcome.corrosion_rate.as_ref().expect("rate");
        assert!(rate.derived);
        assert!((rate.value - 0.25).abs() < 1e-9);
        let life = outcome.remaining_life.as_ref().expect("life");
        assert!((life.years - 20.0).abs() < 1e-9);
        // 20 years falls in the 10-20 band → PoF 2, × cof 3 = 6 → Low
        assert_eq!(outcome.pof_score, 2.0);
        assert_eq!(outcome.risk_level, RiskLevel::Low);
        assert_eq!(outcome.interval_months, 72.0);
        assert_eq!(outcome.estimated_parameters, vec!["corrosion_rate".to_string()]);
    }

    #[test]
    fn short_remaining_life_caps_interval() {
        let config = RBIConfig::default();
        let eq = full_equipment();
        let mut ex = full_extracted();
        ex.corrosion_rate = Some(2.5); // 5 mm margin → 2 years
        let outcome = Level3Calculator.calculate(&input(&eq, &ex, &config)).expect("level 3");
        assert!(outcome.estimated_parameters.is_empty());
        assert!((outcome.remaining_life.as_ref().expect("life").years - 2.0).abs() < 1e-9);
        // 2 years × 12 × 0.5 = 12 months
        assert!((outcome.interval_months - 12.0).abs() < 1e-9);
        assert_eq!(outcome.pof_score, 5.0);
        assert_eq!(outcome.risk_level, RiskLevel::High);
    }

    #[test]
    fn zero_supplied_rate_is_floored() {
        let config = RBIConfig::default();
        let eq = full_equipment();
        let mut ex = full_extracted();
        ex.corrosion_rate = Some(0.0);
        let outcome = Level3Calculator.calculate(&input(&eq, &ex, &config)).expect("level 3");
        assert_eq!(outcome.corrosion_rate.expect("rate").value, 0.01);
    }

    #[test]
    fn single_reading_without_rate_is_rejected() {
        let config = RBIConfig::default();
        let eq = full_equipment();
        let mut ex = full_extracted();
        ex.thickness_measurements.truncate(1);
        let err = Level3Calculator
            .calculate(&input(&eq, &ex, &config))
            .expect_err("no rate");
        assert!(matches!(
            err,
            LevelError::MissingInput {
                requirement: DataRequirement::CorrosionRate,
                ..
            }
        ));
    }
}
