//! Risk-Based Inspection calculation pipeline
//!
//! ## Flow
//!
//! ```text
//! providers → LevelCapabilityAssessor → FallbackManager → LevelCalculator → result
//!                                                                        ↘ FallbackReporter
//! ```
//!
//! - **capability**: which of the four levels the data supports
//! - **corrosion**: corrosion rate derivation and remaining life
//! - **calculators**: one scoring strategy per level
//! - **fallback**: level selection and compounding conservatism
//! - **engine**: single, batch and summary entry points
//! - **reporter**: post-hoc explanation of a result

pub mod calculators;
pub mod capability;
pub mod corrosion;
pub mod engine;
pub mod fallback;
pub mod reporter;

pub use calculators::{calculator_for, CalculationInput, LevelCalculator, LevelError, LevelOutcome};
pub use capability::{CapabilityAssessment, LevelCapabilityAssessor};
pub use corrosion::{derive_corrosion_rate, CorrosionRate, RemainingLife};
pub use engine::{add_months, CalculationError, RBICalculationEngine};
pub use fallback::{FallbackDecision, FallbackError, FallbackManager};
pub use reporter::FallbackReporter;
