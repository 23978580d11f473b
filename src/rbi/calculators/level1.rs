//! Level 1 - fixed base interval scaled by equipment type
//!
//! Ignores condition data entirely. PoF sits at the scale minimum and no
//! consequence is computed, so the risk score is always 0.

use tracing::debug;

use super::{breakdown, classify, component, CalculationInput, LevelCalculator, LevelError, LevelOutcome};
use crate::config::defaults::POF_MIN;
use crate::types::{CofScores, DataRequirement, RBILevel};

pub struct Level1Calculator;

impl LevelCalculator for Level1Calculator {
    fn level(&self) -> RBILevel {
        RBILevel::Level1
    }

    fn calculate(&self, input: &CalculationInput<'_>) -> Result<LevelOutcome, LevelError> {
        let level = RBILevel::Level1;
        let equipment_type = input.equipment.equipment_type.ok_or(LevelError::MissingInput {
            level,
            requirement: DataRequirement::EquipmentType,
        })?;
        input.equipment.service_type.ok_or(LevelError::MissingInput {
            level,
            requirement: DataRequirement::ServiceType,
        })?;

        let settings = &input.config.level1;
        let mut estimated_parameters = Vec::new();
        let multiplier = match settings.equipment_multipliers.get(equipment_type.as_str()) {
            Some(m) => *m,
            None => {
                estimated_parameters.push("equipment_multiplier".to_string());
                1.0
            }
        };

        let pof_score = POF_MIN;
        let cof_scores = CofScores::default();
        let (risk_score, band) = classify(input.config, level, pof_score, &cof_scores)?;
        let interval_months = settings.base_interval_months * multiplier * band.interval_factor;

        debug!(
            equipment_id = %input.equipment.equipment_id,
            equipment_type = %equipment_type,
            multiplier,
            interval_months,
            "Level 1 interval"
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
                vec![component("equipment_multiplier", multiplier, 1.0)],
                Vec::new(),
                risk_score,
                band,
            )),
            corrosion_rate: None,
            remaining_life: None,
        })
    }
}
