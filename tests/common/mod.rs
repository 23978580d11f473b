//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rbi_engine::{
    CoatingCondition, CriticalityLevel, EquipmentData, EquipmentType, ExtractedRBIData,
    InMemoryProvider, InspectionQuality, RBICalculationEngine, RBIConfig, ServiceType,
    ThicknessMeasurement,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Fixed calculation timestamp.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).single().expect("valid timestamp")
}

pub fn reading(location: &str, thickness: f64, on: NaiveDate) -> ThicknessMeasurement {
    ThicknessMeasurement {
        location: location.to_string(),
        thickness_mm: thickness,
        measurement_date: on,
        minimum_required_thickness_mm: 6.0,
        measurement_method: "UT".to_string(),
        inspector: "J. Inspector".to_string(),
    }
}

/// Identity and service only: exactly enough for Level 1.
pub fn level1_equipment(id: &str) -> EquipmentData {
    let mut eq = EquipmentData::new(id);
    eq.equipment_type = Some(EquipmentType::PressureVessel);
    eq.service_type = Some(ServiceType::SourHydrocarbon);
    eq
}

/// Equipment record sufficient for Level 4.
pub fn full_equipment(id: &str) -> EquipmentData {
    let mut eq = level1_equipment(id);
    eq.installation_date = Some(date(2008, 3, 15));
    eq.design_pressure = Some(18.5);
    eq.design_temperature = Some(150.0);
    eq.material = Some("SA-516-70".to_string());
    eq.criticality_level = Some(CriticalityLevel::High);
    eq
}

/// Extracted data sufficient for Level 4: two surveys at two locations.
pub fn full_extracted(id: &str) -> ExtractedRBIData {
    let mut ex = ExtractedRBIData::empty(id);
    ex.thickness_measurements = vec![
        reading("CML-1", 14.0, date(2018, 5, 1)),
        reading("CML-2", 13.8, date(2018, 5, 1)),
        reading("CML-1", 13.2, date(2022, 5, 1)),
        reading("CML-2", 13.4, date(2022, 5, 1)),
    ];
    ex.coating_condition = Some(CoatingCondition::Good);
    ex.damage_mechanisms = vec!["wet H2S cracking".to_string(), "general thinning".to_string()];
    ex.inspection_findings = vec!["minor pitting near nozzle N2".to_string()];
    ex.inspection_quality = Some(InspectionQuality::Good);
    ex.last_inspection_date = Some(date(2022, 5, 1));
    ex
}

pub fn engine(equipment: Vec<EquipmentData>, extracted: Vec<ExtractedRBIData>) -> RBICalculationEngine {
    engine_with_config(RBIConfig::default(), equipment, extracted)
}

pub fn engine_with_config(
    config: RBIConfig,
    equipment: Vec<EquipmentData>,
    extracted: Vec<ExtractedRBIData>,
) -> RBICalculationEngine {
    let mut provider = InMemoryProvider::new();
    for eq in equipment {
        provider.insert_equipment(eq);
    }
    for ex in extracted {
        provider.insert_extracted(ex);
    }
    let provider = Arc::new(provider);
    RBICalculationEngine::new(config, provider.clone(), provider).expect("valid engine")
}
