//! Level capability assessment
//!
//! Each level has a cumulative data predicate: Level N needs everything
//! Level N-1 needs plus its own inputs. The assessor evaluates every
//! requirement once, then derives the per-level capability table, the
//! recommended (highest capable) level, and a data-quality score.

use chrono::NaiveDate;
use tracing::debug;

use super::corrosion::rate_derivable;
use crate::config::RBIConfig;
use crate::types::{
    DataRequirement, EquipmentData, ExtractedRBIData, InspectionQuality, LevelCapability,
    MissingRequirement, RBILevel,
};

/// Predicate evaluation order. Earlier entries are reported first.
pub const REQUIREMENT_ORDER: [DataRequirement; 9] = [
    DataRequirement::EquipmentType,
    DataRequirement::ServiceType,
    DataRequirement::ThicknessMeasurements,
    DataRequirement::CoatingCondition,
    DataRequirement::CorrosionRate,
    DataRequirement::DamageMechanisms,
    DataRequirement::CriticalityLevel,
    DataRequirement::ServiceRiskCategory,
    DataRequirement::InspectionQuality,
];

/// Capability of all four levels for one equipment item.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityAssessment {
    /// Level 1 through Level 4, in order
    pub capabilities: Vec<LevelCapability>,
    /// Highest capable level; `None` when not even Level 1 is computable
    pub recommended_level: Option<RBILevel>,
    pub data_quality_score: f64,
    /// Newest condition data is older than the staleness threshold
    pub stale_data: bool,
}

impl CapabilityAssessment {
    pub fn capability(&self, level: RBILevel) -> Option<&LevelCapability> {
        self.capabilities.iter().find(|c| c.level == level)
    }

    pub fn is_capable(&self, level: RBILevel) -> bool {
        self.capability(level).is_some_and(|c| c.capable)
    }

    /// First unmet requirement of a level, in predicate order.
    pub fn first_missing(&self, level: RBILevel) -> Option<&MissingRequirement> {
        self.capability(level)
            .and_then(|c| c.missing_requirements.first())
    }
}

/// Determines which levels are computable from the supplied data.
pub struct LevelCapabilityAssessor<'a> {
    config: &'a RBIConfig,
}

impl<'a> LevelCapabilityAssessor<'a> {
    pub fn new(config: &'a RBIConfig) -> Self {
        Self { config }
    }

    /// Assess all levels as of `as_of` (used for staleness).
    pub fn assess(
        &self,
        equipment: &EquipmentData,
        extracted: &ExtractedRBIData,
        as_of: NaiveDate,
    ) -> CapabilityAssessment {
        let unmet = self.unmet_requirements(equipment, extracted);

        let capabilities: Vec<LevelCapability> = RBILevel::ALL
            .iter()
            .map(|&level| {
                let missing_requirements: Vec<MissingRequirement> = unmet
                    .iter()
                    .filter(|m| m.requirement.introduced_at() <= level)
                    .cloned()
                    .collect();
                LevelCapability {
                    level,
                    capable: missing_requirements.is_empty(),
                    missing_requirements,
                }
            })
            .collect();

        let recommended_level = capabilities
            .iter()
            .filter(|c| c.capable)
            .map(|c| c.level)
            .max();

        let (data_quality_score, stale_data) = self.data_quality(equipment, extracted, as_of);

        debug!(
            equipment_id = %equipment.equipment_id,
            recommended = ?recommended_level,
            unmet = unmet.len(),
            data_quality = data_quality_score,
            stale = stale_data,
            "Capability assessed"
        );

        CapabilityAssessment {
            capabilities,
            recommended_level,
            data_quality_score,
            stale_data,
        }
    }

    /// Every unmet requirement, in predicate order.
    pub fn unmet_requirements(
        &self,
        equipment: &EquipmentData,
        extracted: &ExtractedRBIData,
    ) -> Vec<MissingRequirement> {
        REQUIREMENT_ORDER
            .iter()
            .filter_map(|&requirement| {
                self.check(requirement, equipment, extracted)
                    .map(|detail| MissingRequirement {
                        requirement,
                        detail,
                    })
            })
            .collect()
    }

    /// `None` when met, otherwise why not.
    fn check(
        &self,
        requirement: DataRequirement,
        equipment: &EquipmentData,
        extracted: &ExtractedRBIData,
    ) -> Option<String> {
        match requirement {
            DataRequirement::EquipmentType => equipment
                .equipment_type
                .is_none()
                .then(|| "equipment type not recorded".to_string()),
            DataRequirement::ServiceType => equipment
                .service_type
                .is_none()
                .then(|| "service type not recorded".to_string()),
            DataRequirement::ThicknessMeasurements => extracted
                .thickness_measurements
                .is_empty()
                .then(|| "no thickness measurements on record".to_string()),
            DataRequirement::CoatingCondition => extracted
                .coating_condition
                .is_none()
                .then(|| "coating condition not assessed".to_string()),
            DataRequirement::CorrosionRate => {
                if extracted.supplied_corrosion_rate().is_some()
                    || rate_derivable(&extracted.thickness_measurements)
                {
                    None
                } else if extracted.thickness_measurements.len() < 2 {
                    Some(format!(
                        "no corrosion rate supplied and {} thickness measurement(s), at least 2 needed to derive one",
                        extracted.thickness_measurements.len()
                    ))
                } else {
                    Some(
                        "no corrosion rate supplied and all thickness measurements share one date"
                            .to_string(),
                    )
                }
            }
            DataRequirement::DamageMechanisms => (extracted.identified_damage_mechanisms().count()
                == 0)
                .then(|| "no damage mechanisms identified".to_string()),
            DataRequirement::CriticalityLevel => equipment
                .criticality_level
                .is_none()
                .then(|| "criticality level not assigned".to_string()),
            DataRequirement::ServiceRiskCategory => match equipment.service_type {
                None => Some("service type unknown, consequence category unresolvable".to_string()),
                Some(service) if self.config.service_profile(service).is_none() => Some(format!(
                    "no service risk category configured for '{service}'"
                )),
                Some(_) => None,
            },
            DataRequirement::InspectionQuality => match extracted.inspection_quality {
                None => Some("inspection quality not rated".to_string()),
                Some(InspectionQuality::Good) => None,
                Some(q) => Some(format!("inspection quality rated {q}, Good required")),
            },
        }
    }

    /// Weighted fraction of fields present, discounted when data is stale.
    ///
    /// Returns `(score, stale)`.
    pub fn data_quality(
        &self,
        equipment: &EquipmentData,
        extracted: &ExtractedRBIData,
        as_of: NaiveDate,
    ) -> (f64, bool) {
        let w = &self.config.data_quality.weights;

        let design_fraction = match (equipment.design_pressure, equipment.design_temperature) {
            (Some(_), Some(_)) => 1.0,
            (Some(_), None) | (None, Some(_)) => 0.5,
            (None, None) => 0.0,
        };
        let present = |flag: bool| if flag { 1.0 } else { 0.0 };

        let earned = w.equipment_type * present(equipment.equipment_type.is_some())
            + w.service_type * present(equipment.service_type.is_some())
            + w.installation_date * present(equipment.installation_date.is_some())
            + w.design_data * design_fraction
            + w.material
                * present(equipment.material.as_deref().is_some_and(|m| !m.trim().is_empty()))
            + w.criticality_level * present(equipment.criticality_level.is_some())
            + w.thickness_measurements * present(!extracted.thickness_measurements.is_empty())
            + w.corrosion_rate
                * present(
                    extracted.supplied_corrosion_rate().is_some()
                        || rate_derivable(&extracted.thickness_measurements),
                )
            + w.coating_condition * present(extracted.coating_condition.is_some())
            + w.damage_mechanisms * present(extracted.identified_damage_mechanisms().count() > 0)
            + w.inspection_quality * present(extracted.inspection_quality.is_some())
            + w.last_inspection_date * present(extracted.last_inspection_date.is_some());

        let total = w.sum();
        let mut score = if total > 0.0 { earned / total } else { 0.0 };

        let reference = extracted
            .latest_measurement_date()
            .or(extracted.last_inspection_date);
        let stale = reference.is_some_and(|date| {
            (as_of - date).num_days() > i64::from(self.config.data_quality.staleness_threshold_days)
        });
        if stale {
            score *= self.config.data_quality.staleness_penalty;
        }

        (score.clamp(0.0, 1.0), stale)
    }
}
