//! Fallback Manager - level selection with compounding conservatism
//!
//! Walks the attempt chain from the requested level down to Level 1 and
//! stops at the first capable level. Every level passed over is recorded
//! with the requirement that blocked it. Level 1 is terminal: if it is not
//! capable the chain is exhausted and the calculation is fatal.
//!
//! Each skipped level multiplies the interval by `adjustment_factor` and
//! removes `confidence_reduction` from the confidence, both bounded by
//! configured floors.

use thiserror::Error;
use tracing::warn;

use super::capability::CapabilityAssessment;
use crate::config::FallbackSettings;
use crate::types::{FallbackReason, MissingRequirement, RBILevel};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FallbackError {
    /// Not even Level 1 is computable
    #[error("no computable level: {}", describe(.missing))]
    NoCapableLevel { missing: Vec<MissingRequirement> },
}

fn describe(missing: &[MissingRequirement]) -> String {
    missing
        .iter()
        .map(|m| m.requirement.field_name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The selected level and the bookkeeping needed to adjust its output.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackDecision {
    pub requested: RBILevel,
    pub actual: RBILevel,
    /// One entry per skipped level, requested level first
    pub reasons: Vec<FallbackReason>,
    pub steps: u8,
    /// Deduplicated field names missing across every skipped level
    pub missing_data: Vec<String>,
    settings: FallbackSettings,
}

impl FallbackDecision {
    pub fn fallback_occurred(&self) -> bool {
        self.steps > 0
    }

    /// `max(adjustment_factor^steps, interval_multiplier_floor)`; 1.0 without fallback.
    pub fn interval_multiplier(&self) -> f64 {
        if self.steps == 0 {
            return 1.0;
        }
        self.settings
            .adjustment_factor
            .powi(i32::from(self.steps))
            .max(self.settings.interval_multiplier_floor)
    }

    /// `max(baseline − confidence_reduction × steps, confidence_floor)`.
    pub fn adjust_confidence(&self, baseline: f64) -> f64 {
        if self.steps == 0 {
            return baseline.clamp(0.0, 1.0);
        }
        let reduced = baseline - self.settings.confidence_reduction * f64::from(self.steps);
        reduced.max(self.settings.confidence_floor).clamp(0.0, 1.0)
    }
}

/// Picks the highest capable level at or below the requested one.
pub struct FallbackManager<'a> {
    settings: &'a FallbackSettings,
}

impl<'a> FallbackManager<'a> {
    pub fn new(settings: &'a FallbackSettings) -> Self {
        Self { settings }
    }

    pub fn select(
        &self,
        equipment_id: &str,
        requested: RBILevel,
        assessment: &CapabilityAssessment,
    ) -> Result<FallbackDecision, FallbackError> {
        let mut reasons: Vec<FallbackReason> = Vec::new();
        let mut missing_data: Vec<String> = Vec::new();
        let mut last_missing: Vec<MissingRequirement> = Vec::new();

        for level in requested.descending_from() {
            let Some(capability) = assessment.capability(level) else {
                continue;
            };

            if capability.capable {
                let steps = requested.as_u8() - level.as_u8();
                if steps > 0 {
                    warn!(
                        equipment_id,
                        requested = %requested,
                        actual = %level,
                        steps,
                        missing = ?missing_data,
                        "RBI level fallback"
                    );
                }
                return Ok(FallbackDecision {
                    requested,
                    actual: level,
                    reasons,
                    steps,
                    missing_data,
                    settings: self.settings.clone(),
                });
            }

            if let Some(blocking) = assessment.first_missing(level) {
                reasons.push(FallbackReason {
                    skipped_level: level,
                    requirement: blocking.requirement,
                    detail: blocking.detail.clone(),
                });
            }
            for m in &capability.missing_requirements {
                let field = m.requirement.field_name();
                if !missing_data.iter().any(|f| f == field) {
                    missing_data.push(field.to_string());
                }
            }
            last_missing = capability.missing_requirements.clone();
        }

        Err(FallbackError::NoCapableLevel {
            missing: last_missing,
        })
    }
}
