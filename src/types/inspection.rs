//! Inspection data extracted from reports: thickness readings, coating, damage mechanisms

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single ultrasonic / radiographic wall-thickness reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThicknessMeasurement {
    /// Condition monitoring location label (e.g. "CML-03 shell north")
    pub location: String,
    /// Measured wall thickness (mm)
    pub thickness_mm: f64,
    pub measurement_date: NaiveDate,
    /// Minimum required thickness at this location (mm)
    pub minimum_required_thickness_mm: f64,
    #[serde(default)]
    pub measurement_method: String,
    #[serde(default)]
    pub inspector: String,
}

/// External coating condition from the last visual inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoatingCondition {
    Excellent,
    Good,
    Fair,
    Poor,
    Failed,
}

impl CoatingCondition {
    /// PoF contribution on the 1-5 scale (better coating → lower score).
    pub fn pof_factor(&self) -> f64 {
        match self {
            CoatingCondition::Excellent => 1.0,
            CoatingCondition::Good => 2.0,
            CoatingCondition::Fair => 3.0,
            CoatingCondition::Poor => 4.0,
            CoatingCondition::Failed => 5.0,
        }
    }
}

impl std::fmt::Display for CoatingCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoatingCondition::Excellent => write!(f, "Excellent"),
            CoatingCondition::Good => write!(f, "Good"),
            CoatingCondition::Fair => write!(f, "Fair"),
            CoatingCondition::Poor => write!(f, "Poor"),
            CoatingCondition::Failed => write!(f, "Failed"),
        }
    }
}

/// Quality rating of the most recent inspection campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectionQuality {
    Poor,
    Fair,
    Good,
}

impl std::fmt::Display for InspectionQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InspectionQuality::Poor => write!(f, "Poor"),
            InspectionQuality::Fair => write!(f, "Fair"),
            InspectionQuality::Good => write!(f, "Good"),
        }
    }
}

/// Inspection-derived data for one equipment item.
///
/// Frequently sparse. Absent fields are capability gaps that drive level
/// fallback, never errors.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractedRBIData {
    pub equipment_id: String,
    /// No ordering is assumed; consumers sort by date when it matters.
    #[serde(default)]
    pub thickness_measurements: Vec<ThicknessMeasurement>,
    /// Supplied corrosion rate (mm/year)
    #[serde(default)]
    pub corrosion_rate: Option<f64>,
    #[serde(default)]
    pub coating_condition: Option<CoatingCondition>,
    #[serde(default)]
    pub damage_mechanisms: Vec<String>,
    #[serde(default)]
    pub inspection_findings: Vec<String>,
    #[serde(default)]
    pub last_inspection_date: Option<NaiveDate>,
    #[serde(default)]
    pub inspection_quality: Option<InspectionQuality>,
}

impl ExtractedRBIData {
    /// Empty record for an equipment id (what a provider returns when it knows nothing).
    pub fn empty(equipment_id: impl Into<String>) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            ..Default::default()
        }
    }

    /// Date of the newest thickness reading, if any.
    pub fn latest_measurement_date(&self) -> Option<NaiveDate> {
        self.thickness_measurements
            .iter()
            .map(|m| m.measurement_date)
            .max()
    }

    /// Supplied corrosion rate, ignoring non-finite or negative values.
    pub fn supplied_corrosion_rate(&self) -> Option<f64> {
        self.corrosion_rate.filter(|r| r.is_finite() && *r >= 0.0)
    }

    /// Damage mechanism labels with blanks removed.
    pub fn identified_damage_mechanisms(&self) -> impl Iterator<Item = &str> {
        self.damage_mechanisms
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(location: &str, thickness: f64, date: (i32, u32, u32)) -> ThicknessMeasurement {
        ThicknessMeasurement {
            location: location.to_string(),
            thickness_mm: thickness,
            measurement_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).expect("date"),
            minimum_required_thickness_mm: 6.0,
            measurement_method: "UT".to_string(),
            inspector: "J. Doe".to_string(),
        }
    }

    #[test]
    fn latest_measurement_date_ignores_input_order() {
        let mut data = ExtractedRBIData::empty("V-101");
        data.thickness_measurements = vec![
            reading("A", 9.5, (2022, 3, 1)),
            reading("A", 9.0, (2024, 6, 1)),
            reading("A", 10.0, (2020, 1, 1)),
        ];
        assert_eq!(
            data.latest_measurement_date(),
            NaiveDate::from_ymd_opt(2024, 6, 1)
        );
    }

    #[test]
    fn negative_supplied_rate_is_ignored() {
        let mut data = ExtractedRBIData::empty("V-101");
        data.corrosion_rate = Some(-0.2);
        assert!(data.supplied_corrosion_rate().is_none());
        data.corrosion_rate = Some(f64::NAN);
        assert!(data.supplied_corrosion_rate().is_none());
        data.corrosion_rate = Some(0.15);
        assert_eq!(data.supplied_corrosion_rate(), Some(0.15));
    }

    #[test]
    fn blank_damage_mechanisms_do_not_count() {
        let mut data = ExtractedRBIData::empty("V-101");
        data.damage_mechanisms = vec!["  ".to_string(), "CUI".to_string()];
        assert_eq!(data.identified_damage_mechanisms().count(), 1);
    }

    #[test]
    fn sparse_json_deserializes() {
        let data: ExtractedRBIData =
            serde_json::from_str(r#"{"equipment_id": "V-102"}"#).expect("deserialize");
        assert!(data.thickness_measurements.is_empty());
        assert!(data.coating_condition.is_none());
    }
}
