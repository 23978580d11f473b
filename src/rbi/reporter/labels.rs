//! Threshold labels used throughout the fallback report.

use crate::types::{ConservatismLevel, ImpactCategory, Severity, UncertaintyLevel};

/// Label a fractional change: `< 0.05` Minimal, `< 0.1` Low, `< 0.3` Medium, else High.
pub fn categorize_impact(fraction: f64) -> ImpactCategory {
    if fraction < 0.05 {
        ImpactCategory::Minimal
    } else if fraction < 0.1 {
        ImpactCategory::Low
    } else if fraction < 0.3 {
        ImpactCategory::Medium
    } else {
        ImpactCategory::High
    }
}

/// Label the interval multiplier actually applied by fallback.
pub fn conservatism_label(adjustment_factor: f64) -> ConservatismLevel {
    if adjustment_factor < 0.5 {
        ConservatismLevel::VeryConservative
    } else if adjustment_factor < 0.7 {
        ConservatismLevel::Conservative
    } else if adjustment_factor < 0.9 {
        ConservatismLevel::SlightlyConservative
    } else {
        ConservatismLevel::Standard
    }
}

/// Higher confidence, lower uncertainty.
pub fn uncertainty_label(confidence: f64) -> UncertaintyLevel {
    if confidence >= 0.85 {
        UncertaintyLevel::Low
    } else if confidence >= 0.6 {
        UncertaintyLevel::Medium
    } else if confidence >= 0.4 {
        UncertaintyLevel::High
    } else {
        UncertaintyLevel::VeryHigh
    }
}

/// Highest severity present; `Low` for an empty list.
pub fn roll_up_severity<I>(severities: I) -> Severity
where
    I: IntoIterator<Item = Severity>,
{
    severities.into_iter().max().unwrap_or(Severity::Low)
}
