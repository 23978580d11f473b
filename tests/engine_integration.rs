//! Engine Integration Tests
//!
//! End-to-end calculations through the public API: level selection,
//! fallback bookkeeping, interval bounds, dating and batch behaviour.

mod common;

use common::*;
use rbi_engine::rbi::add_months;
use rbi_engine::{
    BatchEntry, CalculationError, CoatingCondition, CriticalityLevel, DataRequirement,
    EquipmentData, EquipmentType, ExtractedRBIData, InMemoryProvider, InspectionQuality,
    RBIConfig, RBILevel, ServiceType,
};

// ============================================================================
// Level selection and fallback
// ============================================================================

#[test]
fn level1_data_requested_at_level4_falls_back_three_levels() {
    let engine = engine(vec![level1_equipment("V-101")], Vec::new());
    let result = engine
        .calculate_next_inspection_date_at("V-101", RBILevel::Level4, now())
        .expect("level 1 result");

    assert_eq!(result.calculation_level, RBILevel::Level1);
    assert_eq!(result.requested_level, RBILevel::Level4);
    assert!(result.fallback_occurred);

    let reasons = &result.input_parameters.fallback_reasons;
    assert_eq!(reasons.len(), 3);
    let skipped: Vec<RBILevel> = reasons.iter().map(|r| r.skipped_level).collect();
    assert_eq!(skipped, vec![RBILevel::Level4, RBILevel::Level3, RBILevel::Level2]);
    assert_eq!(result.input_parameters.fallback_steps, 3);
    // Thickness readings are the first Level 4 predicate left unmet
    assert_eq!(reasons[0].requirement, DataRequirement::ThicknessMeasurements);
    assert!(reasons
        .iter()
        .all(|r| r.requirement == DataRequirement::ThicknessMeasurements));
}

#[test]
fn full_data_is_calculated_at_level4() {
    let engine = engine(vec![full_equipment("V-101")], vec![full_extracted("V-101")]);
    let result = engine
        .calculate_next_inspection_date_at("V-101", RBILevel::Level4, now())
        .expect("result");

    assert_eq!(result.calculation_level, RBILevel::Level4);
    assert!(!result.fallback_occurred);
    assert!(result.cof_scores.is_computed());
    assert!(result.input_parameters.score_breakdown.is_some());
    assert!(result.input_parameters.remaining_life_years.is_some());
    assert!(result.input_parameters.corrosion_rate_derived);
    assert!(result.estimated_parameters.contains(&"corrosion_rate".to_string()));
}

#[test]
fn calculation_level_never_exceeds_requested() {
    let engine = engine(vec![full_equipment("V-101")], vec![full_extracted("V-101")]);
    for level in RBILevel::ALL {
        let result = engine
            .calculate_next_inspection_date_at("V-101", level, now())
            .expect("result");
        assert!(result.calculation_level <= level);
        assert_eq!(result.calculation_level, level);
    }
}

#[test]
fn fallback_confidence_is_below_capable_confidence() {
    // Same equipment, once with Good inspection quality and once with Fair
    let capable = engine(vec![full_equipment("V-101")], vec![full_extracted("V-101")])
        .calculate_next_inspection_date_at("V-101", RBILevel::Level4, now())
        .expect("capable");

    let mut degraded_data = full_extracted("V-101");
    degraded_data.inspection_quality = Some(InspectionQuality::Fair);
    let degraded = engine(vec![full_equipment("V-101")], vec![degraded_data])
        .calculate_next_inspection_date_at("V-101", RBILevel::Level4, now())
        .expect("fallback");

    assert_eq!(degraded.calculation_level, RBILevel::Level3);
    assert!(degraded.fallback_occurred);
    assert!(degraded.confidence_score < capable.confidence_score);
    assert_eq!(
        degraded.input_parameters.fallback_reasons[0].requirement,
        DataRequirement::InspectionQuality
    );
}

#[test]
fn each_extra_step_lowers_confidence_further() {
    let engine = engine(vec![level1_equipment("V-101")], Vec::new());
    let confidences: Vec<f64> = RBILevel::ALL
        .iter()
        .map(|&level| {
            engine
                .calculate_next_inspection_date_at("V-101", level, now())
                .expect("result")
                .confidence_score
        })
        .collect();
    // Requested 1, 2, 3, 4 → 0, 1, 2, 3 steps
    assert!(confidences.windows(2).all(|w| w[1] < w[0]), "{confidences:?}");
}

// ============================================================================
// Interval bounds and dating
// ============================================================================

#[test]
fn interval_stays_within_bounds_for_every_level() {
    let fixtures = vec![
        (level1_equipment("A"), ExtractedRBIData::empty("A")),
        (full_equipment("B"), full_extracted("B")),
        {
            // Nearly consumed wall: remaining life close to zero
            let mut ex = full_extracted("C");
            ex.thickness_measurements.push(reading("CML-3", 6.05, date(2022, 5, 1)));
            ex.corrosion_rate = Some(3.0);
            (full_equipment("C"), ex)
        },
        {
            // Benign service with a long base interval
            let mut eq = full_equipment("D");
            eq.service_type = Some(ServiceType::Water);
            eq.criticality_level = Some(CriticalityLevel::Low);
            let mut ex = full_extracted("D");
            ex.corrosion_rate = Some(0.0);
            (eq, ex)
        },
    ];
    let config = RBIConfig::default();
    let (equipment, extracted): (Vec<_>, Vec<_>) = fixtures.into_iter().unzip();
    let engine = engine(equipment, extracted);

    for id in ["A", "B", "C", "D"] {
        for level in RBILevel::ALL {
            let result = engine
                .calculate_next_inspection_date_at(id, level, now())
                .expect("result");
            assert!(
                result.inspection_interval_months >= config.intervals.min_interval_months
                    && result.inspection_interval_months <= config.intervals.max_interval_months,
                "{id} at {level}: {}",
                result.inspection_interval_months
            );
        }
    }
}

#[test]
fn tight_bounds_clamp_intervals() {
    let mut config = RBIConfig::default();
    config.intervals.min_interval_months = 40.0;
    config.intervals.max_interval_months = 48.0;
    let engine = engine_with_config(config, vec![level1_equipment("V-101")], Vec::new());
    let result = engine
        .calculate_next_inspection_date_at("V-101", RBILevel::Level4, now())
        .expect("result");
    // 36 × 0.512 = 18.4 raised to the 40 month floor
    assert_eq!(result.inspection_interval_months, 40.0);
    assert!((result.input_parameters.unadjusted_interval_months - 36.0).abs() < 1e-9);
}

#[test]
fn next_date_counts_from_last_inspection() {
    let engine = engine(vec![full_equipment("V-101")], vec![full_extracted("V-101")]);
    let result = engine
        .calculate_next_inspection_date_at("V-101", RBILevel::Level4, now())
        .expect("result");
    assert_eq!(
        result.next_inspection_date,
        add_months(date(2022, 5, 1), result.inspection_interval_months)
    );
}

#[test]
fn next_date_counts_from_calculation_time_without_history() {
    let engine = engine(vec![level1_equipment("V-101")], Vec::new());
    let result = engine
        .calculate_next_inspection_date_at("V-101", RBILevel::Level1, now())
        .expect("result");
    assert_eq!(result.inspection_interval_months, 36.0);
    assert_eq!(result.next_inspection_date, date(2027, 6, 1));
    assert_eq!(result.calculated_at, now());
}

// ============================================================================
// Corrosion rate derivation
// ============================================================================

#[test]
fn two_readings_thirty_days_apart_derive_rate() {
    let mut eq = full_equipment("E-201");
    eq.equipment_type = Some(EquipmentType::HeatExchanger);
    let mut ex = ExtractedRBIData::empty("E-201");
    ex.thickness_measurements = vec![
        reading("CML-1", 10.0, date(2024, 1, 1)),
        reading("CML-1", 9.99, date(2024, 1, 31)),
    ];
    ex.coating_condition = Some(CoatingCondition::Fair);
    ex.damage_mechanisms = vec!["erosion".to_string()];

    let engine = engine(vec![eq], vec![ex]);
    let result = engine
        .calculate_next_inspection_date_at("E-201", RBILevel::Level3, now())
        .expect("result");

    assert_eq!(result.calculation_level, RBILevel::Level3);
    let rate = result.input_parameters.corrosion_rate.expect("rate");
    let expected = 0.01 / (30.0 / 365.25);
    assert!(rate >= 0.0);
    assert!((rate - expected).abs() < 1e-6, "rate {rate} != {expected}");
    assert!(result.input_parameters.corrosion_rate_derived);
}

// ============================================================================
// Missing data round trip
// ============================================================================

#[test]
fn supplying_missing_fields_removes_them_from_missing_data() {
    let mut eq = level1_equipment("V-101");
    let mut ex = ExtractedRBIData::empty("V-101");
    let engine_for = |eq: &EquipmentData, ex: &ExtractedRBIData| engine(vec![eq.clone()], vec![ex.clone()]);

    let first = engine_for(&eq, &ex)
        .calculate_next_inspection_date_at("V-101", RBILevel::Level4, now())
        .expect("first");
    assert!(first.missing_data.contains(&"thickness_measurements".to_string()));
    assert!(first.missing_data.contains(&"coating_condition".to_string()));

    // Supply the Level 2 inputs that were reported missing
    ex.thickness_measurements = vec![reading("CML-1", 12.0, date(2023, 1, 1))];
    ex.coating_condition = Some(CoatingCondition::Good);
    let second = engine_for(&eq, &ex)
        .calculate_next_inspection_date_at("V-101", RBILevel::Level4, now())
        .expect("second");
    assert_eq!(second.calculation_level, RBILevel::Level2);
    assert!(!second.missing_data.contains(&"thickness_measurements".to_string()));
    assert!(!second.missing_data.contains(&"coating_condition".to_string()));
    // Level 2 estimated the age; supply it and the estimate disappears
    assert!(second.estimated_parameters.contains(&"equipment_age".to_string()));

    eq.installation_date = Some(date(2015, 1, 1));
    let third = engine_for(&eq, &ex)
        .calculate_next_inspection_date_at("V-101", RBILevel::Level2, now())
        .expect("third");
    assert!(!third.estimated_parameters.contains(&"equipment_age".to_string()));
    assert!(!third.fallback_occurred);
}

// ============================================================================
// Batch
// ============================================================================

#[test]
fn batch_preserves_order_and_cardinality_with_fatal_item() {
    // V-102 has no identity fields: Level 1 is not computable
    let engine = engine(
        vec![level1_equipment("V-101"), EquipmentData::new("V-102")],
        Vec::new(),
    );
    let ids = vec!["V-101".to_string(), "V-102".to_string()];
    let entries = engine.calculate_batch_at(ids.as_slice(), RBILevel::Level2, now());

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].equipment_id(), "V-101");
    assert_eq!(entries[1].equipment_id(), "V-102");
    assert!(matches!(&entries[0], BatchEntry::Calculated(r) if r.calculation_level == RBILevel::Level1));
    match &entries[1] {
        BatchEntry::Failed { error, .. } => assert!(error.contains("Insufficient data")),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[test]
fn large_batch_keeps_input_order() {
    let ids: Vec<String> = (0..64).map(|i| format!("P-{i:03}")).collect();
    let equipment = ids.iter().map(|id| level1_equipment(id)).collect();
    let engine = engine(equipment, Vec::new());
    let entries = engine.calculate_batch_at(ids.as_slice(), RBILevel::Level1, now());
    let returned: Vec<&str> = entries.iter().map(BatchEntry::equipment_id).collect();
    let expected: Vec<&str> = ids.iter().map(String::as_str).collect();
    assert_eq!(returned, expected);
}

// ============================================================================
// Fatal errors and summary
// ============================================================================

#[test]
fn missing_service_type_is_fatal_not_fallback() {
    let mut eq = EquipmentData::new("V-103");
    eq.equipment_type = Some(EquipmentType::Piping);
    let engine = engine(vec![eq], vec![full_extracted("V-103")]);
    let err = engine
        .calculate_next_inspection_date_at("V-103", RBILevel::Level4, now())
        .expect_err("fatal");
    assert!(matches!(
        err,
        CalculationError::InsufficientData { ref missing, .. } if missing == &vec!["service_type".to_string()]
    ));
}

#[test]
fn summary_lists_every_level() {
    let engine = engine(vec![full_equipment("V-101")], vec![full_extracted("V-101")]);
    let summary = engine
        .get_calculation_summary_at("V-101", date(2024, 6, 1))
        .expect("summary");
    assert_eq!(summary.recommended_level, Some(RBILevel::Level4));
    assert_eq!(summary.capabilities.len(), 4);
    assert!(summary.capabilities.iter().all(|c| c.capable));
    assert_eq!(summary.thickness_measurement_count, 4);
    assert!(summary.data_quality_score > 0.9);
}

#[test]
fn results_serialize_to_json() {
    let engine = engine(vec![level1_equipment("V-101")], Vec::new());
    let result = engine
        .calculate_next_inspection_date_at("V-101", RBILevel::Level2, now())
        .expect("result");
    let json = serde_json::to_value(&result).expect("serialize");
    assert_eq!(json["calculation_level"], "level1");
    assert_eq!(json["risk_level"], "medium");
    assert_eq!(json["next_inspection_date"], "2026-10-25");
}

#[test]
fn sample_dataset_runs_as_batch() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("data/sample_equipment.json");
    let provider = std::sync::Arc::new(InMemoryProvider::load_json(&path).expect("sample dataset"));
    let engine = rbi_engine::RBICalculationEngine::new(
        RBIConfig::default(),
        provider.clone(),
        provider.clone(),
    )
    .expect("engine");

    let entries = engine.calculate_batch_at(provider.equipment_ids(), RBILevel::Level4, now());
    let levels: Vec<Option<RBILevel>> = entries
        .iter()
        .map(|e| e.result().map(|r| r.calculation_level))
        .collect();
    assert_eq!(
        levels,
        vec![
            Some(RBILevel::Level4),
            Some(RBILevel::Level3),
            Some(RBILevel::Level1),
            None,
        ]
    );
    assert!(entries[3].is_failed());
}
