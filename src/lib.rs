//! RBI Engine: Risk-Based Inspection interval planning
//!
//! Decides how soon a piece of equipment must be re-inspected using a
//! four-level methodology, falling back to a lower level when the data a
//! higher level needs is missing.
//!
//! ## Architecture
//!
//! - **Providers**: supply equipment records and inspection-extracted data
//! - **Capability Assessor**: which levels the data supports, data quality
//! - **Level Calculators**: PoF / CoF / interval per level
//! - **Fallback Manager**: highest capable level, compounding conservatism
//! - **Engine**: single and batch calculation entry points
//! - **Fallback Reporter**: explains a downgrade and what to collect next

pub mod config;
pub mod providers;
pub mod rbi;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, RBIConfig};

// Re-export providers
pub use providers::{
    Dataset, EquipmentDataProvider, ExtractedDataProvider, InMemoryProvider, ProviderError,
};

// Re-export the calculation pipeline
pub use rbi::{
    CalculationError, FallbackReporter, LevelCapabilityAssessor, RBICalculationEngine,
};

// Re-export commonly used types
pub use types::{
    BatchEntry, CalculationSummary, CoatingCondition, CofScores, CriticalityLevel,
    DataRequirement, EquipmentData, EquipmentType, ExtractedRBIData, FallbackReport,
    InspectionQuality, RBICalculationResult, RBILevel, RiskLevel, ServiceType,
    ThicknessMeasurement,
};
