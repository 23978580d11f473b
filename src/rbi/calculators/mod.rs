//! Level calculators
//!
//! One stateless strategy per RBI level, each a pure function of the
//! equipment record, the extracted inspection data and the config.
//!
//! ## Levels
//!
//! 1. **Level 1** - base interval × equipment-type multiplier, no consequence
//! 2. **Level 2** - weighted PoF over coating, damage mechanisms and age
//! 3. **Level 3** - PoF from remaining life at the governing location
//! 4. **Level 4** - Level 3 PoF × service/criticality consequence matrix
//!
//! Every level classifies `pof × max(cof)` through its own ordered
//! risk-category table; the matched band supplies the risk level and the
//! interval factor.

pub mod level1;
pub mod level2;
pub mod level3;
pub mod level4;

pub use level1::Level1Calculator;
pub use level2::Level2Calculator;
pub use level3::Level3Calculator;
pub use level4::Level4Calculator;

use chrono::NaiveDate;
use thiserror::Error;

use super::corrosion::{governing_remaining_life, resolve_corrosion_rate, CorrosionRate, RemainingLife};
use crate::config::defaults::{
    COF_MAX, COF_MIN, MONTHS_PER_YEAR, POF_MAX, POF_MIN, RISK_SCORE_MAX, RISK_SCORE_MIN,
};
use crate::config::{first_match, RBIConfig, RiskCategoryBand};
use crate::types::{
    CofScores, DataRequirement, EquipmentData, ExtractedRBIData, RBILevel, RiskLevel,
    ScoreBreakdown, ScoreComponent,
};

// ============================================================================
// Calculator Interface
// ============================================================================

/// Everything a calculator may read.
#[derive(Debug, Clone, Copy)]
pub struct CalculationInput<'a> {
    pub equipment: &'a EquipmentData,
    pub extracted: &'a ExtractedRBIData,
    pub config: &'a RBIConfig,
    /// Reference date for equipment age
    pub as_of: NaiveDate,
}

/// What one level computed, before fallback adjustment and clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelOutcome {
    pub level: RBILevel,
    pub pof_score: f64,
    pub cof_scores: CofScores,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub interval_months: f64,
    pub confidence_baseline: f64,
    /// Inputs the calculator had to estimate rather than read verbatim
    pub estimated_parameters: Vec<String>,
    pub breakdown: Option<ScoreBreakdown>,
    pub corrosion_rate: Option<CorrosionRate>,
    pub remaining_life: Option<RemainingLife>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LevelError {
    #[error("{level} cannot run: {requirement} unavailable")]
    MissingInput {
        level: RBILevel,
        requirement: DataRequirement,
    },

    #[error("{level} risk score {score} matched no risk category")]
    NoRiskCategory { level: RBILevel, score: f64 },
}

/// A scoring strategy for one RBI level.
pub trait LevelCalculator: Send + Sync {
    fn level(&self) -> RBILevel;

    fn calculate(&self, input: &CalculationInput<'_>) -> Result<LevelOutcome, LevelError>;
}

/// Calculator for a level.
pub fn calculator_for(level: RBILevel) -> &'static dyn LevelCalculator {
    match level {
        RBILevel::Level1 => &Level1Calculator,
        RBILevel::Level2 => &Level2Calculator,
        RBILevel::Level3 => &Level3Calculator,
        RBILevel::Level4 => &Level4Calculator,
    }
}

// ============================================================================
// Shared scoring helpers
// ============================================================================

/// Risk score and matched category band for a level.
pub(crate) fn classify<'c>(
    config: &'c RBIConfig,
    level: RBILevel,
    pof: f64,
    cof: &CofScores,
) -> Result<(f64, &'c RiskCategoryBand), LevelError> {
    let score = (pof * cof.max()).clamp(RISK_SCORE_MIN, RISK_SCORE_MAX);
    let band = first_match(config.risk_categories(level), score)
        .ok_or(LevelError::NoRiskCategory { level, score })?;
    Ok((score, band))
}

pub(crate) fn clamp_pof(value: f64) -> f64 {
    value.clamp(POF_MIN, POF_MAX)
}

pub(crate) fn clamp_cof(value: f64) -> f64 {
    value.clamp(COF_MIN, COF_MAX)
}

pub(crate) fn component(name: &str, value: f64, weight: f64) -> ScoreComponent {
    ScoreComponent {
        name: name.to_string(),
        value,
        weight,
    }
}

pub(crate) fn breakdown(
    pof_components: Vec<ScoreComponent>,
    cof_components: Vec<ScoreComponent>,
    risk_score: f64,
    band: &RiskCategoryBand,
) -> ScoreBreakdown {
    ScoreBreakdown {
        pof_components,
        cof_components,
        risk_score,
        risk_category: band.category.to_string(),
        interval_factor: band.interval_factor,
    }
}

/// Approximate consequence used by Levels 2 and 3.
///
/// Each dimension averages the service profile with the equipment-type
/// consequence. Unconfigured entries fall back to the scale midpoint and
/// are reported as estimated.
pub(crate) fn approximate_cof(
    input: &CalculationInput<'_>,
    estimated: &mut Vec<String>,
) -> (CofScores, Vec<ScoreComponent>) {
    let midpoint = (COF_MIN + COF_MAX) / 2.0;

    let equipment_consequence = match input
        .equipment
        .equipment_type
        .and_then(|ty| input.config.equipment_consequence_for(ty))
    {
        Some(c) => c,
        None => {
            estimated.push("equipment_consequence".to_string());
            midpoint
        }
    };

    let (safety, environmental, economic) = match input
        .equipment
        .service_type
        .and_then(|svc| input.config.service_profile(svc))
    {
        Some(p) => (p.safety, p.environmental, p.economic),
        None => {
            estimated.push("service_consequence".to_string());
            (midpoint, midpoint, midpoint)
        }
    };

    let cof = CofScores {
        safety: clamp_cof((safety + equipment_consequence) / 2.0),
        environmental: clamp_cof((environmental + equipment_consequence) / 2.0),
        economic: clamp_cof((economic + equipment_consequence) / 2.0),
    };
    let components = vec![
        component("service_safety", safety, 0.5),
        component("service_environmental", environmental, 0.5),
        component("service_economic", economic, 0.5),
        component("equipment_consequence", equipment_consequence, 0.5),
    ];
    (cof, components)
}

/// Corrosion rate, governing remaining life and the PoF it implies.
pub(crate) struct RemainingLifeAssessment {
    pub rate: CorrosionRate,
    pub life: RemainingLife,
    pub pof: f64,
}

/// Shared by Levels 3 and 4.
pub(crate) fn assess_remaining_life(
    input: &CalculationInput<'_>,
    level: RBILevel,
) -> Result<RemainingLifeAssessment, LevelError> {
    let min_rate = input.config.corrosion.min_corrosion_rate_mm_per_year;
    let mut rate = resolve_corrosion_rate(input.extracted, min_rate).ok_or(
        LevelError::MissingInput {
            level,
            requirement: DataRequirement::CorrosionRate,
        },
    )?;
    rate.value = rate.value.max(min_rate);

    let life = governing_remaining_life(&input.extracted.thickness_measurements, rate.value)
        .ok_or(LevelError::MissingInput {
            level,
            requirement: DataRequirement::ThicknessMeasurements,
        })?;

    let pof = first_match(&input.config.level3.remaining_life_bands, life.years)
        .map(|b| b.score)
        .unwrap_or(POF_MAX);

    Ok(RemainingLifeAssessment {
        rate,
        life,
        pof: clamp_pof(pof),
    })
}

/// Level interval capped by a fraction of remaining life.
pub(crate) fn remaining_life_interval(
    config: &RBIConfig,
    base_months: f64,
    band: &RiskCategoryBand,
    life: &RemainingLife,
) -> f64 {
    let risk_interval = base_months * band.interval_factor;
    let life_cap = life.years * MONTHS_PER_YEAR * config.level3.remaining_life_fraction;
    risk_interval.min(life_cap)
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::types::{
        CoatingCondition, CriticalityLevel, EquipmentData, EquipmentType, ExtractedRBIData,
        InspectionQuality, ServiceType, ThicknessMeasurement,
    };

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    pub fn reading(location: &str, thickness: f64, on: NaiveDate) -> ThicknessMeasurement {
        ThicknessMeasurement {
            location: location.to_string(),
            thickness_mm: thickness,
            measurement_date: on,
            minimum_required_thickness_mm: 6.0,
            measurement_method: "UT".to_string(),
            inspector: "QA".to_string(),
        }
    }

    /// Fully populated pressure vessel in amine service.
    pub fn full_equipment() -> EquipmentData {
        let mut eq = EquipmentData::new("V-101");
        eq.equipment_type = Some(EquipmentType::PressureVessel);
        eq.service_type = Some(ServiceType::Amine);
        eq.installation_date = Some(date(2009, 1, 1));
        eq.criticality_level = Some(CriticalityLevel::High);
        eq
    }

    /// 12 mm → 11 mm over four years at one location, 6 mm minimum.
    pub fn full_extracted() -> ExtractedRBIData {
        let mut ex = ExtractedRBIData::empty("V-101");
        ex.thickness_measurements = vec![
            reading("CML-1", 12.0, date(2019, 1, 1)),
            reading("CML-1", 11.0, date(2023, 1, 1)),
        ];
        ex.coating_condition = Some(CoatingCondition::Fair);
        ex.damage_mechanisms = vec!["general thinning".to_string()];
        ex.inspection_quality = Some(InspectionQuality::Good);
        ex.last_inspection_date = Some(date(2023, 1, 1));
        ex
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn calculator_for_returns_matching_level() {
        for level in RBILevel::ALL {
            assert_eq!(calculator_for(level).level(), level);
        }
    }

    #[test]
    fn risk_level_follows_band_lookup() {
        let config = RBIConfig::default();
        let (score, band) =
            classify(&config, RBILevel::Level4, 3.0, &CofScores::uniform(4.0)).expect("band");
        assert_eq!(score, 12.0);
        assert_eq!(band.category, RiskLevel::High);

        // Boundary value belongs to the first band containing it
        let (_, band) =
            classify(&config, RBILevel::Level4, 2.0, &CofScores::uniform(2.0)).expect("band");
        assert_eq!(band.category, RiskLevel::Low);
    }

    #[test]
    fn empty_risk_table_is_an_error() {
        let mut config = RBIConfig::default();
        config.level2.risk_categories.clear();
        let err = classify(&config, RBILevel::Level2, 2.0, &CofScores::uniform(2.0))
            .expect_err("no bands");
        assert!(matches!(err, LevelError::NoRiskCategory { .. }));
    }

    #[test]
    fn approximate_cof_blends_service_and_equipment() {
        let config = RBIConfig::default();
        let eq = full_equipment();
        let ex = full_extracted();
        let input = CalculationInput {
            equipment: &eq,
            extracted: &ex,
            config: &config,
            as_of: date(2024, 1, 1),
        };
        let mut estimated = Vec::new();
        let (cof, components) = approximate_cof(&input, &mut estimated);
        // amine 3/3/3, pressure vessel 3
        assert_eq!(cof, CofScores::uniform(3.0));
        assert_eq!(components.len(), 4);
        assert!(estimated.is_empty());
    }

    #[test]
    fn unconfigured_consequence_is_estimated() {
        let mut config = RBIConfig::default();
        config.equipment_consequence.clear();
        let eq = full_equipment();
        let ex = full_extracted();
        let input = CalculationInput {
            equipment: &eq,
            extracted: &ex,
            config: &config,
            as_of: date(2024, 1, 1),
        };
        let mut estimated = Vec::new();
        approximate_cof(&input, &mut estimated);
        assert_eq!(estimated, vec!["equipment_consequence".to_string()]);
    }

    #[test]
    fn remaining_life_caps_interval() {
        let config = RBIConfig::default();
        let eq = full_equipment();
        let ex = full_extracted();
        let input = CalculationInput {
            equipment: &eq,
            extracted: &ex,
            config: &config,
            as_of: date(2024, 1, 1),
        };
        let assessment = assess_remaining_life(&input, RBILevel::Level3).expect("life");
        // (11 - 6) mm at ~0.25 mm/yr ≈ 20 years
        assert!(assessment.life.years > 19.0 && assessment.life.years < 21.0);
        let band = RiskCategoryBand::new(0.0, 25.0, RiskLevel::Low, 1.0);
        let interval = remaining_life_interval(&config, 72.0, &band, &assessment.life);
        assert_eq!(interval, 72.0);

        let short = RemainingLife {
            years: 2.0,
            location: "CML-1".to_string(),
            thickness_mm: 7.0,
            minimum_required_mm: 6.0,
        };
        assert_eq!(remaining_life_interval(&config, 72.0, &band, &short), 12.0);
    }
}
