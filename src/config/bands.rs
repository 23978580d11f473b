//! Ordered inclusive-range tables evaluated first-match-wins.
//!
//! Risk categories, equipment-age scores and remaining-life scores are all
//! expressed as bands so deployments can retune them without code changes.

use serde::{Deserialize, Serialize};

use crate::types::RiskLevel;

/// Common view of an inclusive `[min, max]` band.
pub trait Band {
    fn min(&self) -> f64;
    fn max(&self) -> f64;

    fn contains(&self, value: f64) -> bool {
        value >= self.min() && value <= self.max()
    }
}

/// A named risk category with its interval factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCategoryBand {
    pub min: f64,
    pub max: f64,
    pub category: RiskLevel,
    /// Multiplier on the level's base interval
    pub interval_factor: f64,
}

impl RiskCategoryBand {
    pub fn new(min: f64, max: f64, category: RiskLevel, interval_factor: f64) -> Self {
        Self {
            min,
            max,
            category,
            interval_factor,
        }
    }
}

impl Band for RiskCategoryBand {
    fn min(&self) -> f64 {
        self.min
    }
    fn max(&self) -> f64 {
        self.max
    }
}

/// A band mapping an input range to a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBand {
    pub min: f64,
    pub max: f64,
    pub score: f64,
}

impl ScoreBand {
    pub fn new(min: f64, max: f64, score: f64) -> Self {
        Self { min, max, score }
    }
}

impl Band for ScoreBand {
    fn min(&self) -> f64 {
        self.min
    }
    fn max(&self) -> f64 {
        self.max
    }
}

/// First band containing `value`.
///
/// Values below the first band resolve to the first band and values above
/// the last band resolve to the last band, so a validated table is total.
/// Returns `None` only for an empty table or a NaN value.
pub fn first_match<B: Band>(bands: &[B], value: f64) -> Option<&B> {
    if value.is_nan() {
        return None;
    }
    if let Some(hit) = bands.iter().find(|b| b.contains(value)) {
        return Some(hit);
    }
    let first = bands.first()?;
    if value < first.min() {
        return Some(first);
    }
    bands.last().filter(|last| value > last.max())
}

/// Check that `bands` cover `[lo, hi]` unambiguously.
///
/// Rules:
/// - at least one band, every bound finite, `min <= max`
/// - ascending order: each band starts at or after the previous band's start
/// - no gaps: each band starts at or before the previous band's end
/// - no shadowing: each band must end after the previous band's end,
///   otherwise first-match-wins would never select it
/// - first band starts at or below `lo`, last band ends at or above `hi`
///
/// Touching or partially overlapping bounds are allowed; first match wins.
pub fn validate_bands<B: Band>(name: &str, bands: &[B], lo: f64, hi: f64, errors: &mut Vec<String>) {
    if bands.is_empty() {
        errors.push(format!("{name}: at least one band is required"));
        return;
    }

    for (i, band) in bands.iter().enumerate() {
        if !band.min().is_finite() || !band.max().is_finite() {
            errors.push(format!("{name}[{i}]: bounds must be finite"));
            return;
        }
        if band.min() > band.max() {
            errors.push(format!(
                "{name}[{i}]: min ({:.3}) must be <= max ({:.3})",
                band.min(),
                band.max()
            ));
        }
    }

    for (i, pair) in bands.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.min() < prev.min() {
            errors.push(format!(
                "{name}[{}]: bands must be ordered by ascending min ({:.3} < {:.3})",
                i + 1,
                next.min(),
                prev.min()
            ));
        }
        if next.min() > prev.max() {
            errors.push(format!(
                "{name}: gap between {:.3} and {:.3} (bands {i} and {})",
                prev.max(),
                next.min(),
                i + 1
            ));
        }
        if next.max() <= prev.max() {
            errors.push(format!(
                "{name}[{}]: band [{:.3}, {:.3}] is shadowed by the preceding band and can never match",
                i + 1,
                next.min(),
                next.max()
            ));
        }
    }

    if let Some(first) = bands.first() {
        if first.min() > lo {
            errors.push(format!(
                "{name}: first band starts at {:.3}, must cover {lo:.3}",
                first.min()
            ));
        }
    }
    if let Some(last) = bands.last() {
        if last.max() < hi {
            errors.push(format!(
                "{name}: last band ends at {:.3}, must cover {hi:.3}",
                last.max()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn risk_bands() -> Vec<RiskCategoryBand> {
        vec![
            RiskCategoryBand::new(0.0, 6.0, RiskLevel::Low, 1.0),
            RiskCategoryBand::new(6.0, 12.0, RiskLevel::Medium, 0.6),
            RiskCategoryBand::new(12.0, 25.0, RiskLevel::High, 0.3),
        ]
    }

    #[test]
    fn shared_boundary_goes_to_first_band() {
        let bands = risk_bands();
        assert_eq!(first_match(&bands, 6.0).map(|b| b.category), Some(RiskLevel::Low));
        assert_eq!(first_match(&bands, 6.01).map(|b| b.category), Some(RiskLevel::Medium));
        assert_eq!(first_match(&bands, 25.0).map(|b| b.category), Some(RiskLevel::High));
    }

    #[test]
    fn out_of_range_values_clamp_to_end_bands() {
        let bands = risk_bands();
        assert_eq!(first_match(&bands, -1.0).map(|b| b.category), Some(RiskLevel::Low));
        assert_eq!(first_match(&bands, 99.0).map(|b| b.category), Some(RiskLevel::High));
        assert!(first_match(&bands, f64::NAN).is_none());
        assert!(first_match::<ScoreBand>(&[], 1.0).is_none());
    }

    #[test]
    fn valid_table_has_no_errors() {
        let mut errors = Vec::new();
        validate_bands("risk", &risk_bands(), 0.0, 25.0, &mut errors);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn gap_is_rejected() {
        let bands = vec![ScoreBand::new(0.0, 5.0, 1.0), ScoreBand::new(6.0, 25.0, 2.0)];
        let mut errors = Vec::new();
        validate_bands("age", &bands, 0.0, 25.0, &mut errors);
        assert!(errors.iter().any(|e| e.contains("gap")), "{errors:?}");
    }

    #[test]
    fn shadowed_band_is_rejected() {
        let bands = vec![ScoreBand::new(0.0, 25.0, 1.0), ScoreBand::new(5.0, 10.0, 2.0)];
        let mut errors = Vec::new();
        validate_bands("age", &bands, 0.0, 25.0, &mut errors);
        assert!(errors.iter().any(|e| e.contains("shadowed")), "{errors:?}");
    }

    #[test]
    fn incomplete_coverage_is_rejected() {
        let bands = vec![ScoreBand::new(1.0, 20.0, 1.0)];
        let mut errors = Vec::new();
        validate_bands("risk", &bands, 0.0, 25.0, &mut errors);
        assert_eq!(errors.len(), 2, "{errors:?}");
    }

    #[test]
    fn inverted_and_unordered_bands_are_rejected() {
        let bands = vec![ScoreBand::new(10.0, 25.0, 1.0), ScoreBand::new(5.0, 2.0, 2.0)];
        let mut errors = Vec::new();
        validate_bands("x", &bands, 0.0, 25.0, &mut errors);
        assert!(errors.iter().any(|e| e.contains("min (5.000) must be <= max")));
        assert!(errors.iter().any(|e| e.contains("ascending")));
    }
}
