//! RBI Calculation Engine
//!
//! The only component callers invoke directly. For one equipment item:
//!
//! 1. Fetch `EquipmentData` and `ExtractedRBIData` from the providers
//! 2. Assess which levels are computable
//! 3. Select the highest capable level at or below the requested one
//! 4. Run that level's calculator
//! 5. Apply fallback conservatism, clamp the interval, date the next inspection
//!
//! Only a missing Level 1 is fatal. Every other gap is absorbed by fallback
//! and recorded in the result.

use std::sync::Arc;

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use rayon::prelude::*;
use thiserror::Error;
use tracing::{error, info, warn};

use super::calculators::{calculator_for, CalculationInput, LevelError};
use super::capability::LevelCapabilityAssessor;
use super::fallback::{FallbackError, FallbackManager};
use crate::config::defaults::DAYS_PER_MONTH;
use crate::config::{ConfigError, RBIConfig};
use crate::providers::{EquipmentDataProvider, ExtractedDataProvider, ProviderError};
use crate::types::{
    BatchEntry, CalculationSummary, EquipmentData, ExtractedRBIData, InputParameters,
    RBICalculationResult, RBILevel,
};

// ============================================================================
// Error Types
// ============================================================================

/// Fatal calculation failure. Fallback is never reported through this type.
#[derive(Debug, Error)]
pub enum CalculationError {
    #[error("Equipment not found: {0}")]
    EquipmentNotFound(String),

    #[error("Data provider failed for {equipment_id}: {message}")]
    Provider {
        equipment_id: String,
        message: String,
    },

    #[error("Insufficient data for {equipment_id}: Level 1 needs {}", missing.join(", "))]
    InsufficientData {
        equipment_id: String,
        missing: Vec<String>,
    },

    #[error("Scoring failed for {equipment_id}: {source}")]
    Scoring {
        equipment_id: String,
        #[source]
        source: LevelError,
    },
}

impl CalculationError {
    fn from_provider(equipment_id: &str, err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(id) => CalculationError::EquipmentNotFound(id),
            other => CalculationError::Provider {
                equipment_id: equipment_id.to_string(),
                message: other.to_string(),
            },
        }
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Orchestrates capability assessment, level selection and scoring.
///
/// Holds no mutable state; one engine can serve concurrent calculations.
pub struct RBICalculationEngine {
    config: Arc<RBIConfig>,
    equipment_provider: Arc<dyn EquipmentDataProvider>,
    extracted_provider: Arc<dyn ExtractedDataProvider>,
}

impl RBICalculationEngine {
    /// Build an engine, rejecting a malformed configuration up front.
    pub fn new(
        config: RBIConfig,
        equipment_provider: Arc<dyn EquipmentDataProvider>,
        extracted_provider: Arc<dyn ExtractedDataProvider>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            min_interval = config.intervals.min_interval_months,
            max_interval = config.intervals.max_interval_months,
            adjustment_factor = config.fallback.adjustment_factor,
            "RBI calculation engine initialized"
        );
        Ok(Self {
            config: Arc::new(config),
            equipment_provider,
            extracted_provider,
        })
    }

    pub fn config(&self) -> &RBIConfig {
        &self.config
    }

    /// Calculate the next inspection date for one equipment item, now.
    pub fn calculate_next_inspection_date(
        &self,
        equipment_id: &str,
        requested_level: RBILevel,
    ) -> Result<RBICalculationResult, CalculationError> {
        self.calculate_next_inspection_date_at(equipment_id, requested_level, Utc::now())
    }

    /// As `calculate_next_inspection_date`, with an explicit calculation timestamp.
    pub fn calculate_next_inspection_date_at(
        &self,
        equipment_id: &str,
        requested_level: RBILevel,
        now: DateTime<Utc>,
    ) -> Result<RBICalculationResult, CalculationError> {
        let (equipment, extracted) = self.fetch(equipment_id)?;
        self.calculate_for(&equipment, &extracted, requested_level, now)
    }

    /// Calculate from data the caller already holds, bypassing the providers.
    pub fn calculate_for(
        &self,
        equipment: &EquipmentData,
        extracted: &ExtractedRBIData,
        requested_level: RBILevel,
        now: DateTime<Utc>,
    ) -> Result<RBICalculationResult, CalculationError> {
        let equipment_id = equipment.equipment_id.as_str();
        let as_of = now.date_naive();

        let assessment = LevelCapabilityAssessor::new(&self.config).assess(equipment, extracted, as_of);
        if assessment.stale_data {
            warn!(
                equipment_id,
                staleness_threshold_days = self.config.data_quality.staleness_threshold_days,
                "Condition data is stale, data quality discounted"
            );
        }

        let decision = FallbackManager::new(&self.config.fallback)
            .select(equipment_id, requested_level, &assessment)
            .map_err(|e| match e {
                FallbackError::NoCapableLevel { missing } => CalculationError::InsufficientData {
                    equipment_id: equipment_id.to_string(),
                    missing: missing
                        .iter()
                        .map(|m| m.requirement.field_name().to_string())
                        .collect(),
                },
            })?;

        let input = CalculationInput {
            equipment,
            extracted,
            config: &self.config,
            as_of,
        };
        let outcome = calculator_for(decision.actual)
            .calculate(&input)
            .map_err(|source| CalculationError::Scoring {
                equipment_id: equipment_id.to_string(),
                source,
            })?;

        let interval_multiplier = decision.interval_multiplier();
        let inspection_interval_months = self
            .config
            .clamp_interval(outcome.interval_months * interval_multiplier);
        let confidence_score = decision.adjust_confidence(outcome.confidence_baseline);

        let start = extracted.last_inspection_date.unwrap_or(as_of);
        let next_inspection_date = add_months(start, inspection_interval_months);

        let mut estimated_parameters: Vec<String> = Vec::new();
        for p in outcome.estimated_parameters {
            if !estimated_parameters.contains(&p) {
                estimated_parameters.push(p);
            }
        }

        let input_parameters = InputParameters {
            fallback_reasons: decision.reasons.clone(),
            fallback_steps: decision.steps,
            interval_multiplier,
            confidence_penalty: (outcome.confidence_baseline - confidence_score).max(0.0),
            unadjusted_interval_months: outcome.interval_months,
            risk_score: outcome.risk_score,
            corrosion_rate: outcome.corrosion_rate.as_ref().map(|r| r.value),
            corrosion_rate_derived: outcome.corrosion_rate.as_ref().is_some_and(|r| r.derived),
            remaining_life_years: outcome.remaining_life.as_ref().map(|l| l.years),
            score_breakdown: outcome.breakdown,
        };

        info!(
            equipment_id,
            requested = %requested_level,
            actual = %decision.actual,
            risk_level = %outcome.risk_level,
            interval_months = inspection_interval_months,
            confidence = confidence_score,
            next_inspection = %next_inspection_date,
            "RBI calculation complete"
        );

        Ok(RBICalculationResult {
            equipment_id: equipment_id.to_string(),
            calculation_level: decision.actual,
            requested_level,
            fallback_occurred: decision.fallback_occurred(),
            next_inspection_date,
            risk_level: outcome.risk_level,
            pof_score: outcome.pof_score,
            cof_scores: outcome.cof_scores,
            confidence_score,
            data_quality_score: assessment.data_quality_score,
            inspection_interval_months,
            missing_data: decision.missing_data,
            estimated_parameters,
            input_parameters,
            calculated_at: now,
        })
    }

    /// Calculate many items independently. Output order and length match
    /// the input; fatal failures are kept in place as `BatchEntry::Failed`.
    pub fn calculate_batch<S>(&self, equipment_ids: &[S], requested_level: RBILevel) -> Vec<BatchEntry>
    where
        S: AsRef<str> + Sync,
    {
        self.calculate_batch_at(equipment_ids, requested_level, Utc::now())
    }

    pub fn calculate_batch_at<S>(
        &self,
        equipment_ids: &[S],
        requested_level: RBILevel,
        now: DateTime<Utc>,
    ) -> Vec<BatchEntry>
    where
        S: AsRef<str> + Sync,
    {
        let entries: Vec<BatchEntry> = equipment_ids
            .par_iter()
            .map(|id| {
                let id = id.as_ref();
                match self.calculate_next_inspection_date_at(id, requested_level, now) {
                    Ok(result) => BatchEntry::Calculated(result),
                    Err(e) => {
                        error!(equipment_id = id, error = %e, "Batch item failed");
                        BatchEntry::Failed {
                            equipment_id: id.to_string(),
                            error: e.to_string(),
                        }
                    }
                }
            })
            .collect();

        let failed = entries.iter().filter(|e| e.is_failed()).count();
        info!(
            total = entries.len(),
            failed,
            requested = %requested_level,
            "RBI batch complete"
        );
        entries
    }

    /// Diagnostic capability overview. Never used for scheduling.
    pub fn get_calculation_summary(
        &self,
        equipment_id: &str,
    ) -> Result<CalculationSummary, CalculationError> {
        self.get_calculation_summary_at(equipment_id, Utc::now().date_naive())
    }

    pub fn get_calculation_summary_at(
        &self,
        equipment_id: &str,
        as_of: NaiveDate,
    ) -> Result<CalculationSummary, CalculationError> {
        let (equipment, extracted) = self.fetch(equipment_id)?;
        let assessment = LevelCapabilityAssessor::new(&self.config).assess(&equipment, &extracted, as_of);

        Ok(CalculationSummary {
            equipment_id: equipment.equipment_id,
            equipment_type: equipment.equipment_type,
            service_type: equipment.service_type,
            criticality_level: equipment.criticality_level,
            installation_date: equipment.installation_date,
            recommended_level: assessment.recommended_level,
            capabilities: assessment.capabilities,
            data_quality_score: assessment.data_quality_score,
            thickness_measurement_count: extracted.thickness_measurements.len(),
            last_inspection_date: extracted.last_inspection_date,
        })
    }

    fn fetch(
        &self,
        equipment_id: &str,
    ) -> Result<(EquipmentData, ExtractedRBIData), CalculationError> {
        let equipment = self
            .equipment_provider
            .get(equipment_id)
            .map_err(|e| CalculationError::from_provider(equipment_id, e))?;
        let extracted = self
            .extracted_provider
            .get(equipment_id)
            .map_err(|e| CalculationError::from_provider(equipment_id, e))?;
        Ok((equipment, extracted))
    }
}

/// Add a fractional number of months to a date.
///
/// Whole months use calendar month addition (day clamped to month end);
/// the remainder becomes `round(fraction × 30.4375)` days. Saturates at
/// `NaiveDate::MAX`.
pub fn add_months(start: NaiveDate, months: f64) -> NaiveDate {
    let months = months.max(0.0);
    let whole = months.trunc();
    let extra_days = ((months - whole) * DAYS_PER_MONTH).round() as u64;
    let whole = whole.min(f64::from(u32::MAX)) as u32;

    start
        .checked_add_months(Months::new(whole))
        .and_then(|d| d.checked_add_days(Days::new(extra_days)))
        .unwrap_or(NaiveDate::MAX)
}
