//! System-wide constants.
//!
//! Scale bounds and calendar constants shared by the calculators, the
//! config validator, and the reporter. Tunable values live in `RBIConfig`.

// ============================================================================
// Scoring Scales
// ============================================================================

/// Lowest probability-of-failure score.
pub const POF_MIN: f64 = 1.0;

/// Highest probability-of-failure score.
pub const POF_MAX: f64 = 5.0;

/// Lowest consequence score per dimension once computed.
pub const COF_MIN: f64 = 1.0;

/// Highest consequence score per dimension.
pub const COF_MAX: f64 = 5.0;

/// Lower bound of the risk score domain (`pof × max(cof)`).
///
/// Zero because Level 1 reports no consequence.
pub const RISK_SCORE_MIN: f64 = 0.0;

/// Upper bound of the risk score domain (`POF_MAX × COF_MAX`).
pub const RISK_SCORE_MAX: f64 = POF_MAX * COF_MAX;

// ============================================================================
// Calendar
// ============================================================================

/// Days per year used for corrosion rates and equipment age.
pub const DAYS_PER_YEAR: f64 = 365.25;

/// Average days per month, for fractional interval months.
pub const DAYS_PER_MONTH: f64 = DAYS_PER_YEAR / 12.0;

/// Months per year.
pub const MONTHS_PER_YEAR: f64 = 12.0;

// ============================================================================
// Config Loading
// ============================================================================

/// Environment variable naming a config file.
pub const CONFIG_ENV_VAR: &str = "RBI_CONFIG";

/// Config file looked up in the working directory when the env var is unset.
pub const LOCAL_CONFIG_FILE: &str = "rbi_config.toml";

/// Allowed deviation of a weight set from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.05;

// ============================================================================
// Reporter
// ============================================================================

/// Prefix for generated fallback report identifiers.
pub const REPORT_ID_PREFIX: &str = "FBR";
