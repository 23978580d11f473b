//! Level 2 - semi-quantitative weighted PoF
//!
//! PoF = coating factor × w_c + damage factor × w_d + age factor × w_a,
//! each factor on the 1-5 scale. Consequence is approximated from service
//! and equipment type.

use tracing::debug;

use super::{
    approximate_cof, breakdown, clamp_pof, classify, component, CalculationInput,
    LevelCalculator, LevelError, LevelOutcome,
};
use crate::config::defaults::{POF_MAX, POF_MIN};
use crate::config::first_match;
use crate::types::{DataRequirement, RBILevel};

pub struct Level2Calculator;

impl LevelCalculator for Level2Calculator {
    fn level(&self) -> RBILevel {
        RBILevel::Level2
    }

    fn calculate(&self, input: &CalculationInput<'_>) -> Result<LevelOutcome, LevelError> {
        let level = RBILevel::Level2;
        let settings = &input.config.level2;

        if input.extracted.thickness_measurements.is_empty() {
            return Err(LevelError::MissingInput {
                level,
                requirement: DataRequirement::ThicknessMeasurements,
            });
        }
        let coating = input.extracted.coating_condition.ok_or(LevelError::MissingInput {
            level,
            requirement: DataRequirement::CoatingCondition,
        })?;

        let mut estimated_parameters = Vec::new();

        let coating_factor = coating.pof_factor();

        let mechanism_count = input.extracted.identified_damage_mechanisms().count();
        let damage_factor =
            (POF_MIN + mechanism_count as f64 * settings.damage_score_per_mechanism).min(POF_MAX);

        let age_years = match input.equipment.age_years(input.as_of) {
            Some(age) => age,
            None => {
                estimated_parameters.push("equipment_age".to_string());
                settings.default_age_years
            }
        };
        let age_factor = first_match(&settings.age_bands, age_years)
            .map(|b| b.score)
            .unwrap_or(POF_MAX);

        let pof_score = clamp_pof(
            coating_factor * settings.coating_weight
                + damage_factor * settings.damage_weight
                + age_factor * settings.age_weight,
        );

        let (cof_scores, cof_components) = approximate_cof(input, &mut estimated_parameters);
        let (risk_score, band) = classify(input.config, level, pof_score, &cof_scores)?;
        let interval_months = settings.base_interval_months * band.interval_factor;

        debug!(
            equipment_id = %input.equipment.equipment_id,
            coating_factor,
            damage_factor,
            age_factor,
            pof_score,
            risk_score,
            "Level 2 scores"
        );

        Ok(LevelOutcome {
            level,
            pof_score,
            cof_scores,
            risk_score,
            risk_level: band.category,
            interval_months,
            confidence_baseline: settings.confidence,
            estimated_parameters,
            breakdown: Some(breakdown(
                vec![
                    component("coating_condition", coating_factor, settings.coating_weight),
                    component("damage_mechanisms", damage_factor, settings.damage_weight),
                    component("equipment_age", age_factor, settings.age_weight),
                ],
                cof_components,
                risk_score,
                band,
            )),
            corrosion_rate: None,
            remaining_life: None,
        })
    }
}
