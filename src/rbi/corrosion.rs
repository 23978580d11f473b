//! Corrosion rate derivation and remaining-life calculation
//!
//! Readings are grouped by monitoring location. A rate is derived per
//! location from its oldest and newest reading; the fastest location governs.
//! When no single location has two dated readings, the oldest and newest
//! readings overall are used instead.

use std::collections::BTreeMap;

use crate::config::defaults::DAYS_PER_YEAR;
use crate::types::{ExtractedRBIData, ThicknessMeasurement};

/// Corrosion rate used for a calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrosionRate {
    /// mm/year
    pub value: f64,
    /// Computed from thickness readings rather than supplied
    pub derived: bool,
    /// Location the derived rate came from (None for supplied or cross-location)
    pub location: Option<String>,
}

/// Remaining life at the governing location.
#[derive(Debug, Clone, PartialEq)]
pub struct RemainingLife {
    pub years: f64,
    pub location: String,
    pub thickness_mm: f64,
    pub minimum_required_mm: f64,
}

/// Supplied rate if valid, otherwise a rate derived from readings.
pub fn resolve_corrosion_rate(data: &ExtractedRBIData, min_rate: f64) -> Option<CorrosionRate> {
    if let Some(rate) = data.supplied_corrosion_rate() {
        return Some(CorrosionRate {
            value: rate,
            derived: false,
            location: None,
        });
    }
    derive_corrosion_rate(&data.thickness_measurements, min_rate)
}

/// Derive a rate from at least two readings with distinct dates.
///
/// Rate = thickness loss ÷ elapsed years, floored at `min_rate`.
pub fn derive_corrosion_rate(
    measurements: &[ThicknessMeasurement],
    min_rate: f64,
) -> Option<CorrosionRate> {
    let per_location = by_location(measurements)
        .into_iter()
        .filter_map(|(location, readings)| {
            rate_between_extremes(&readings, min_rate).map(|rate| (location, rate))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1));

    if let Some((location, value)) = per_location {
        return Some(CorrosionRate {
            value,
            derived: true,
            location: Some(location.to_string()),
        });
    }

    let all: Vec<&ThicknessMeasurement> = measurements.iter().collect();
    rate_between_extremes(&all, min_rate).map(|value| CorrosionRate {
        value,
        derived: true,
        location: None,
    })
}

/// Whether readings allow a rate to be derived at all.
pub fn rate_derivable(measurements: &[ThicknessMeasurement]) -> bool {
    let mut dates = measurements.iter().map(|m| m.measurement_date);
    match dates.next() {
        Some(first) => dates.any(|d| d != first),
        None => false,
    }
}

/// Shortest remaining life across locations, using each location's newest reading.
///
/// A reading at or below its minimum thickness has zero remaining life.
pub fn governing_remaining_life(
    measurements: &[ThicknessMeasurement],
    rate: f64,
) -> Option<RemainingLife> {
    if !(rate > 0.0) {
        return None;
    }
    by_location(measurements)
        .into_iter()
        .filter_map(|(location, readings)| {
            let newest = readings.iter().max_by_key(|m| m.measurement_date)?;
            let margin = (newest.thickness_mm - newest.minimum_required_thickness_mm).max(0.0);
            Some(RemainingLife {
                years: margin / rate,
                location: location.to_string(),
                thickness_mm: newest.thickness_mm,
                minimum_required_mm: newest.minimum_required_thickness_mm,
            })
        })
        .min_by(|a, b| a.years.total_cmp(&b.years))
}

fn by_location(measurements: &[ThicknessMeasurement]) -> BTreeMap<&str, Vec<&ThicknessMeasurement>> {
    let mut groups: BTreeMap<&str, Vec<&ThicknessMeasurement>> = BTreeMap::new();
    for m in measurements {
        groups.entry(m.location.as_str()).or_default().push(m);
    }
    groups
}

fn rate_between_extremes(readings: &[&ThicknessMeasurement], min_rate: f64) -> Option<f64> {
    let oldest = readings.iter().min_by_key(|m| m.measurement_date)?;
    let newest = readings.iter().max_by_key(|m| m.measurement_date)?;
    let elapsed_days = (newest.measurement_date - oldest.measurement_date).num_days();
    if elapsed_days <= 0 {
        return None;
    }
    let years = elapsed_days as f64 / DAYS_PER_YEAR;
    let loss = oldest.thickness_mm - newest.thickness_mm;
    Some((loss / years).max(min_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn reading(location: &str, thickness: f64, date: (i32, u32, u32)) -> ThicknessMeasurement {
        ThicknessMeasurement {
            location: location.to_string(),
            thickness_mm: thickness,
            measurement_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).expect("date"),
            minimum_required_thickness_mm: 6.0,
            measurement_method: "UT".to_string(),
            inspector: "QA".to_string(),
        }
    }

    #[test]
    fn rate_is_loss_over_elapsed_years() {
        let readings = vec![reading("A", 10.0, (2020, 1, 1)), reading("A", 9.0, (2022, 1, 1))];
        let rate = derive_corrosion_rate(&readings, 0.01).expect("derivable");
        let expected = 1.0 / (731.0 / DAYS_PER_YEAR);
        assert!((rate.value - expected).abs() < 1e-9);
        assert!(rate.derived);
        assert_eq!(rate.location.as_deref(), Some("A"));
    }

    #[test]
    fn fastest_location_governs() {
        let readings = vec![
            reading("A", 10.0, (2020, 1, 1)),
            reading("A", 9.9, (2021, 1, 1)),
            reading("B", 10.0, (2020, 1, 1)),
            reading("B", 9.0, (2021, 1, 1)),
        ];
        let rate = derive_corrosion_rate(&readings, 0.01).expect("derivable");
        assert_eq!(rate.location.as_deref(), Some("B"));
        assert!(rate.value > 0.9);
    }

    #[test]
    fn thickening_readings_floor_at_minimum_rate() {
        let readings = vec![reading("A", 9.0, (2020, 1, 1)), reading("A", 9.2, (2021, 1, 1))];
        let rate = derive_corrosion_rate(&readings, 0.01).expect("derivable");
        assert_eq!(rate.value, 0.01);
    }

    #[test]
    fn same_day_readings_are_not_derivable() {
        let readings = vec![reading("A", 10.0, (2020, 1, 1)), reading("B", 9.0, (2020, 1, 1))];
        assert!(!rate_derivable(&readings));
        assert!(derive_corrosion_rate(&readings, 0.01).is_none());
    }

    #[test]
    fn cross_location_fallback_when_no_location_has_history() {
        let readings = vec![reading("A", 10.0, (2020, 1, 1)), reading("B", 9.5, (2021, 1, 1))];
        assert!(rate_derivable(&readings));
        let rate = derive_corrosion_rate(&readings, 0.01).expect("derivable");
        assert!(rate.location.is_none());
        assert!(rate.value > 0.4);
    }

    #[test]
    fn supplied_rate_wins_over_derivation() {
        let mut data = ExtractedRBIData::empty("V-101");
        data.thickness_measurements =
            vec![reading("A", 10.0, (2020, 1, 1)), reading("A", 9.0, (2021, 1, 1))];
        data.corrosion_rate = Some(0.2);
        let rate = resolve_corrosion_rate(&data, 0.01).expect("rate");
        assert_eq!(rate.value, 0.2);
        assert!(!rate.derived);
    }

    #[test]
    fn remaining_life_uses_newest_reading_per_location() {
        let readings = vec![
            reading("A", 12.0, (2019, 1, 1)),
            reading("A", 10.0, (2023, 1, 1)),
            reading("B", 8.0, (2023, 1, 1)),
        ];
        let life = governing_remaining_life(&readings, 0.5).expect("life");
        assert_eq!(life.location, "B");
        assert!((life.years - 4.0).abs() < 1e-9);
    }

    #[test]
    fn below_minimum_thickness_has_zero_life() {
        let readings = vec![reading("A", 5.5, (2023, 1, 1))];
        let life = governing_remaining_life(&readings, 0.1).expect("life");
        assert_eq!(life.years, 0.0);
    }
}
