//! Equipment identity and design attributes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Equipment class, used for Level 1 interval multipliers and economic consequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    PressureVessel,
    HeatExchanger,
    Piping,
    StorageTank,
    Column,
    Reactor,
    Pump,
    Compressor,
    ReliefValve,
    Other,
}

impl EquipmentType {
    pub const ALL: [EquipmentType; 10] = [
        EquipmentType::PressureVessel,
        EquipmentType::HeatExchanger,
        EquipmentType::Piping,
        EquipmentType::StorageTank,
        EquipmentType::Column,
        EquipmentType::Reactor,
        EquipmentType::Pump,
        EquipmentType::Compressor,
        EquipmentType::ReliefValve,
        EquipmentType::Other,
    ];

    /// Config / serde key for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentType::PressureVessel => "pressure_vessel",
            EquipmentType::HeatExchanger => "heat_exchanger",
            EquipmentType::Piping => "piping",
            EquipmentType::StorageTank => "storage_tank",
            EquipmentType::Column => "column",
            EquipmentType::Reactor => "reactor",
            EquipmentType::Pump => "pump",
            EquipmentType::Compressor => "compressor",
            EquipmentType::ReliefValve => "relief_valve",
            EquipmentType::Other => "other",
        }
    }
}

impl std::fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process service the equipment is exposed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    SweetHydrocarbon,
    SourHydrocarbon,
    Amine,
    Caustic,
    Condensate,
    Steam,
    Water,
    Chemical,
    Hydrogen,
    Other,
}

impl ServiceType {
    pub const ALL: [ServiceType; 10] = [
        ServiceType::SweetHydrocarbon,
        ServiceType::SourHydrocarbon,
        ServiceType::Amine,
        ServiceType::Caustic,
        ServiceType::Condensate,
        ServiceType::Steam,
        ServiceType::Water,
        ServiceType::Chemical,
        ServiceType::Hydrogen,
        ServiceType::Other,
    ];

    /// Config / serde key for this service.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::SweetHydrocarbon => "sweet_hydrocarbon",
            ServiceType::SourHydrocarbon => "sour_hydrocarbon",
            ServiceType::Amine => "amine",
            ServiceType::Caustic => "caustic",
            ServiceType::Condensate => "condensate",
            ServiceType::Steam => "steam",
            ServiceType::Water => "water",
            ServiceType::Chemical => "chemical",
            ServiceType::Hydrogen => "hydrogen",
            ServiceType::Other => "other",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-assigned criticality of the equipment item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriticalityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for CriticalityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CriticalityLevel::Low => write!(f, "LOW"),
            CriticalityLevel::Medium => write!(f, "MEDIUM"),
            CriticalityLevel::High => write!(f, "HIGH"),
            CriticalityLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

/// Identity and design attributes for one equipment item.
///
/// Supplied by an [`EquipmentDataProvider`](crate::providers::EquipmentDataProvider)
/// and never mutated by the engine. `equipment_type` and `service_type` are
/// optional only because upstream records can be incomplete; without them
/// not even a Level 1 calculation is possible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentData {
    pub equipment_id: String,
    #[serde(default)]
    pub equipment_type: Option<EquipmentType>,
    #[serde(default)]
    pub service_type: Option<ServiceType>,
    #[serde(default)]
    pub installation_date: Option<NaiveDate>,
    /// Design pressure (bar g)
    #[serde(default)]
    pub design_pressure: Option<f64>,
    /// Design temperature (°C)
    #[serde(default)]
    pub design_temperature: Option<f64>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default)]
    pub criticality_level: Option<CriticalityLevel>,
}

impl EquipmentData {
    /// Bare record carrying only the identifier.
    pub fn new(equipment_id: impl Into<String>) -> Self {
        Self {
            equipment_id: equipment_id.into(),
            equipment_type: None,
            service_type: None,
            installation_date: None,
            design_pressure: None,
            design_temperature: None,
            material: None,
            criticality_level: None,
        }
    }

    /// Age in years at `as_of`, if the installation date is known.
    pub fn age_years(&self, as_of: NaiveDate) -> Option<f64> {
        self.installation_date.map(|installed| {
            let days = (as_of - installed).num_days().max(0);
            days as f64 / crate::config::defaults::DAYS_PER_YEAR
        })
    }
}
