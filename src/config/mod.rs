//! RBI Configuration Module
//!
//! Per-deployment configuration loaded from TOML: interval bounds, per-level
//! base intervals and risk-category bands, fallback conservatism, and
//! data-quality weights. Nothing numeric in the calculators is hardcoded.
//!
//! ## Loading Order
//!
//! 1. `RBI_CONFIG` environment variable (path to TOML file)
//! 2. `rbi_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! ```ignore
//! let config = RBIConfig::load();
//! let engine = RBICalculationEngine::new(config, equipment_provider, extracted_provider)?;
//! ```
//!
//! The config is validated on file load and again when an engine is built,
//! so a malformed table never reaches a calculation.

mod rbi_config;
pub mod bands;
pub mod defaults;
pub mod validation;

pub use bands::{first_match, Band, RiskCategoryBand, ScoreBand};
pub use rbi_config::*;
