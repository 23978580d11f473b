//! Shared data structures for the RBI calculation pipeline
//!
//! - Inputs: `EquipmentData` (design attributes), `ExtractedRBIData`
//!   (thickness readings, coating, damage mechanisms)
//! - Output: `RBICalculationResult`, plus `BatchEntry` and `CalculationSummary`
//! - Post-hoc: `FallbackReport` explaining why a level was downgraded

mod equipment;
mod inspection;
mod report;
mod result;

pub use equipment::*;
pub use inspection::*;
pub use report::*;
pub use result::*;
